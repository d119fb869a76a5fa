//! Security primitives shared by the resolver, file operations and the
//! archive codec.

pub mod containment;
pub mod names;
pub mod quota;

pub use containment::is_within;
pub use containment::normalize_lexical;
pub use containment::resolve_symlinks;
pub use names::validate_bare_name;
pub use quota::QuotaTracker;
