//! TOML configuration file for the `fsgate` binary.
//!
//! ```toml
//! [[roots]]
//! path = "/srv/shared"
//! description = "Team share"
//!
//! [[roots]]
//! path = "/srv/archive"
//! allowed = false
//!
//! [archive]
//! compression_level = 9
//! max_total_size = 268435456
//! spool_dir = "/var/tmp/fsgate"
//! ```

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use fsgate_core::ArchiveLimits;
use fsgate_core::ManagerConfig;
use fsgate_core::Root;
use fsgate_core::RootRegistry;
use serde::Deserialize;

/// Contents of a configuration file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Root directories, in priority order.
    pub roots: Vec<RootConfig>,

    /// Archive codec overrides.
    pub archive: ArchiveConfig,
}

/// One `[[roots]]` table.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RootConfig {
    pub path: PathBuf,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_allowed")]
    pub allowed: bool,
}

/// The `[archive]` table. Unset keys keep the library defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    pub chunk_size: Option<usize>,
    pub compression_level: Option<u8>,
    pub max_entries: Option<usize>,
    pub max_total_size: Option<u64>,
    pub max_entry_size: Option<u64>,
    pub spool_dir: Option<PathBuf>,
}

const fn default_allowed() -> bool {
    true
}

impl FileConfig {
    /// Loads a configuration file.
    ///
    /// Unlike a default config location, an explicitly named file must
    /// exist.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), roots = config.roots.len(), "loaded config file");
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Invalid TOML configuration: {}", format_toml_error(&e)))
    }

    /// Builds the manager configuration, applying `[archive]` overrides.
    pub fn manager_config(&self) -> ManagerConfig {
        let defaults = ArchiveLimits::default();
        let archive = &self.archive;
        let limits = ArchiveLimits {
            max_entries: archive.max_entries.unwrap_or(defaults.max_entries),
            max_total_size: archive.max_total_size.unwrap_or(defaults.max_total_size),
            max_entry_size: archive.max_entry_size.unwrap_or(defaults.max_entry_size),
        };

        let mut config = ManagerConfig::default().with_limits(limits);
        if let Some(size) = archive.chunk_size {
            config = config.with_chunk_size(size);
        }
        if let Some(level) = archive.compression_level {
            config = config.with_compression_level(Some(level));
        }
        if let Some(dir) = &archive.spool_dir {
            config = config.with_spool_dir(dir);
        }
        config
    }

    /// Registers the file's roots followed by `extra` roots from the
    /// command line.
    ///
    /// Relative command-line roots are made absolute against the current
    /// directory; roots in the file must already be absolute.
    pub fn registry(&self, extra: &[PathBuf]) -> Result<RootRegistry> {
        let mut registry = RootRegistry::new();

        for entry in &self.roots {
            let mut root = Root::new(&entry.path)
                .with_context(|| format!("Invalid root in config: {}", entry.path.display()))?
                .allowed(entry.allowed);
            if let Some(description) = &entry.description {
                root = root.with_description(description);
            }
            registry.register(root);
        }

        for path in extra {
            let absolute = std::path::absolute(path)
                .with_context(|| format!("Invalid root: {}", path.display()))?;
            let root = Root::new(absolute)
                .with_context(|| format!("Invalid root: {}", path.display()))?;
            registry.register(root);
        }

        if registry.is_empty() {
            bail!(
                "No root directories configured\n\
                 HINT: Pass --root <DIR> or a --config file with [[roots]] tables."
            );
        }
        Ok(registry)
    }
}

/// Format a TOML deserialization error for user-friendly display.
fn format_toml_error(error: &toml::de::Error) -> String {
    let mut msg = error.message().to_string();

    if let Some(span) = error.span() {
        msg.push_str(&format!(" (at position {}..{})", span.start, span.end));
    }

    msg
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use fsgate_core::RootSource;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_library_defaults() {
        let config = FileConfig::from_toml("").unwrap();
        assert!(config.roots.is_empty());
        assert_eq!(config.manager_config(), ManagerConfig::default());
    }

    #[test]
    fn test_archive_overrides() {
        let config = FileConfig::from_toml(
            "[archive]\ncompression_level = 0\nmax_entries = 5\nchunk_size = 4096\n\
             spool_dir = \"/var/tmp/fsgate\"\n",
        )
        .unwrap();
        let manager = config.manager_config();
        assert_eq!(manager.compression_level, Some(0));
        assert_eq!(manager.chunk_size, 4096);
        assert_eq!(manager.limits.max_entries, 5);
        assert_eq!(manager.spool_dir, Some(PathBuf::from("/var/tmp/fsgate")));
        assert_eq!(
            manager.limits.max_total_size,
            ArchiveLimits::default().max_total_size
        );
    }

    #[test]
    fn test_roots_from_file_and_flags() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        let c = temp.path().join("c");
        for dir in [&a, &b, &c] {
            fs::create_dir(dir).unwrap();
        }

        let toml = format!(
            "[[roots]]\npath = {a:?}\ndescription = \"first\"\n\n\
             [[roots]]\npath = {b:?}\nallowed = false\n",
        );
        let config = FileConfig::from_toml(&toml).unwrap();
        let registry = config.registry(&[c.clone()]).unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.all()[0].description(), Some("first"));
        assert!(!registry.all()[1].is_allowed());

        let allowed = registry.list_roots().unwrap();
        assert_eq!(allowed.len(), 2);
        assert_eq!(allowed[1].path(), c.canonicalize().unwrap());
    }

    #[test]
    fn test_no_roots_is_an_error() {
        let err = FileConfig::default().registry(&[]).unwrap_err();
        assert!(format!("{err:?}").contains("HINT"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = FileConfig::from_toml("[archive]\nmax_files = 3\n").unwrap_err();
        assert!(err.to_string().contains("Invalid TOML configuration"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(FileConfig::load(&temp.path().join("missing.toml")).is_err());
    }
}
