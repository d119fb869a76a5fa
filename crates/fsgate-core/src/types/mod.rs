//! Type-safe path wrappers.
//!
//! Security types are validated upon construction and cannot be created from
//! raw strings or `PathBuf`s without going through validation.
//!
//! # Design Principles
//!
//! - Type-driven security: an unvalidated path cannot reach an operation
//! - No `From<RawType>` implementations for security types
//! - Host paths ([`ResolvedPath`]) and caller-facing paths ([`VirtualPath`])
//!   are distinct types

pub mod entry_path;
pub mod resolved_path;
pub mod virtual_path;

pub use entry_path::EntryPath;
pub use resolved_path::ResolvedPath;
pub use virtual_path::VirtualPath;
