//! Output formatter trait for CLI results.

use anyhow::Result;
use fsgate_core::DirEntry;
use fsgate_core::ExtractionReport;
use fsgate_core::UploadReport;
use fsgate_core::VirtualPath;
use serde::Serialize;
use std::path::Path;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format a resolved path
    fn format_resolved(&self, host: &Path, virtual_path: &VirtualPath) -> Result<()>;

    /// Format a folder listing
    fn format_listing(&self, dir: &str, entries: &[DirEntry], human_readable: bool) -> Result<()>;

    /// Format a completed mutation (mkdir, rename, rm, cp, mv)
    fn format_done(&self, operation: &str, path: &str) -> Result<()>;

    /// Format a completed download
    fn format_download(&self, name: &str, size: u64, output: &Path) -> Result<()>;

    /// Format a completed upload
    fn format_upload(&self, report: &UploadReport) -> Result<()>;

    /// Format a completed folder export
    fn format_pack(&self, filename: &str, size: u64, output: &Path) -> Result<()>;

    /// Format extraction result
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()>;

    /// Format error message
    fn format_error(&self, operation: &str, error: &anyhow::Error);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
