//! Root-confined file management with zip-slip safe archive handling.
//!
//! `fsgate-core` maps untrusted, caller-supplied path strings onto host paths
//! that are guaranteed to lie inside one of a set of administrator-approved
//! root directories, performs file operations on them, and packs or unpacks
//! ZIP archives without letting an entry escape its target folder.
//!
//! Callers only ever see root-relative [`VirtualPath`]s; absolute host paths
//! stay inside the crate.
//!
//! # Examples
//!
//! ```no_run
//! use fsgate_core::FileManager;
//! use fsgate_core::Root;
//! use fsgate_core::RootRegistry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = RootRegistry::new();
//! registry.register(Root::new("/srv/shared")?.with_description("Team share"));
//!
//! let manager = FileManager::new(registry);
//! manager.create_folder("incoming")?;
//! let report = manager.extract_archive("incoming", "photos.zip", &std::fs::read("photos.zip")?)?;
//! println!("extracted {} files into {}", report.files_extracted, report.folder);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod config;
pub mod copy;
pub mod error;
pub mod mapper;
pub mod ops;
pub mod report;
pub mod resolve;
pub mod roots;
pub mod security;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use archive::ArchiveChunks;
pub use archive::ArchiveStream;
pub use config::ArchiveLimits;
pub use config::ManagerConfig;
pub use error::ErrorKind;
pub use error::FsError;
pub use error::QuotaResource;
pub use error::Result;
pub use mapper::VirtualPathMapper;
pub use ops::DirEntry;
pub use ops::Download;
pub use ops::EntryKind;
pub use ops::FileManager;
pub use report::ExtractionReport;
pub use report::UploadReport;
pub use resolve::PathResolver;
pub use roots::Root;
pub use roots::RootRegistry;
pub use roots::RootSource;
pub use roots::RootUpdate;

pub use types::ResolvedPath;
pub use types::VirtualPath;
