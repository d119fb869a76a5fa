//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use fsgate_core::DirEntry;
use fsgate_core::ExtractionReport;
use fsgate_core::UploadReport;
use fsgate_core::VirtualPath;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct EntryOutput<'a> {
    name: &'a str,
    path: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    size: Option<u64>,
    modified: f64,
}

impl<'a> From<&'a DirEntry> for EntryOutput<'a> {
    fn from(entry: &'a DirEntry) -> Self {
        Self {
            name: &entry.name,
            path: entry.path.as_str(),
            kind: entry.kind.as_str(),
            size: entry.size,
            modified: entry.modified,
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_resolved(&self, host: &Path, virtual_path: &VirtualPath) -> Result<()> {
        #[derive(Serialize)]
        struct ResolveOutput {
            path: String,
            host_path: String,
        }

        let data = ResolveOutput {
            path: virtual_path.to_string(),
            host_path: host.display().to_string(),
        };
        Self::output(&JsonOutput::success("resolve", data))
    }

    fn format_listing(&self, dir: &str, entries: &[DirEntry], _human_readable: bool) -> Result<()> {
        #[derive(Serialize)]
        struct ListOutput<'a> {
            path: &'a str,
            entries: Vec<EntryOutput<'a>>,
        }

        let data = ListOutput {
            path: dir,
            entries: entries.iter().map(EntryOutput::from).collect(),
        };
        Self::output(&JsonOutput::success("ls", data))
    }

    fn format_done(&self, operation: &str, path: &str) -> Result<()> {
        #[derive(Serialize)]
        struct DoneOutput<'a> {
            path: &'a str,
        }

        Self::output(&JsonOutput::success(operation, DoneOutput { path }))
    }

    fn format_download(&self, name: &str, size: u64, output: &Path) -> Result<()> {
        #[derive(Serialize)]
        struct DownloadOutput<'a> {
            name: &'a str,
            size: u64,
            output_path: String,
        }

        let data = DownloadOutput {
            name,
            size,
            output_path: output.display().to_string(),
        };
        Self::output(&JsonOutput::success("get", data))
    }

    fn format_upload(&self, report: &UploadReport) -> Result<()> {
        #[derive(Serialize)]
        struct UploadOutput<'a> {
            path: &'a str,
            size: u64,
        }

        let data = UploadOutput {
            path: report.path.as_str(),
            size: report.size,
        };
        Self::output(&JsonOutput::success("put", data))
    }

    fn format_pack(&self, filename: &str, size: u64, output: &Path) -> Result<()> {
        #[derive(Serialize)]
        struct PackOutput<'a> {
            filename: &'a str,
            size: u64,
            output_path: String,
        }

        let data = PackOutput {
            filename,
            size,
            output_path: output.display().to_string(),
        };
        Self::output(&JsonOutput::success("pack", data))
    }

    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        #[derive(Serialize)]
        struct ExtractionOutput<'a> {
            folder: &'a str,
            files_extracted: usize,
            directories_created: usize,
            bytes_written: u64,
            entries_skipped: usize,
            duration_ms: u128,
            warnings: &'a [String],
        }

        let data = ExtractionOutput {
            folder: report.folder.as_str(),
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            bytes_written: report.bytes_written,
            entries_skipped: report.entries_skipped,
            duration_ms: report.duration.as_millis(),
            warnings: &report.warnings,
        };
        Self::output(&JsonOutput::success("unpack", data))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error(operation, format!("{error:#}"));
        let _ = Self::output(&output);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fsgate_core::FileManager;
    use fsgate_core::RootRegistry;

    #[test]
    fn test_error_output_structure() {
        let output = JsonOutput::<()>::error("rm", "Not found: 'x'");
        let json: serde_json::Value = serde_json::to_value(&output).unwrap();
        assert_eq!(json["operation"], "rm");
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "Not found: 'x'");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_entry_output_uses_type_key() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("docs")).unwrap();
        std::fs::write(temp.path().join("docs/a.txt"), "abc").unwrap();
        let manager = FileManager::new(RootRegistry::from_paths([temp.path()]).unwrap());

        let entries = manager.list("docs").unwrap();
        let json = serde_json::to_value(EntryOutput::from(&entries[0])).unwrap();
        assert_eq!(json["type"], "file");
        assert_eq!(json["path"], "docs/a.txt");
        assert_eq!(json["size"], 3);
    }
}
