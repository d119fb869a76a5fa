//! Validation of bare names supplied for rename, upload and extraction
//! targets.

use crate::FsError;
use crate::Result;

/// Checks that `name` is a single path component.
///
/// Rejects empty names, `.` and `..`, names containing `/` or `\`, and
/// names containing NUL bytes. A bare name joined onto a validated
/// directory can never leave that directory.
///
/// # Errors
///
/// Returns `PathInvalid` carrying `name` if any check fails.
///
/// # Examples
///
/// ```
/// use fsgate_core::security::validate_bare_name;
///
/// assert!(validate_bare_name("report.pdf").is_ok());
/// assert!(validate_bare_name("../report.pdf").is_err());
/// assert!(validate_bare_name("..").is_err());
/// ```
pub fn validate_bare_name(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(FsError::invalid(name, "name is empty"));
    }
    if name == "." || name == ".." {
        return Err(FsError::invalid(name, "name refers to a directory link"));
    }
    if name.contains(['/', '\\']) {
        return Err(FsError::invalid(name, "name contains a path separator"));
    }
    if name.contains('\0') {
        return Err(FsError::invalid(name, "name contains a NUL byte"));
    }
    Ok(name)
}
