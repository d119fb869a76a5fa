//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fsgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Allowed root directory (can be repeated; first root is the default)
    #[arg(short, long = "root", value_name = "DIR", global = true)]
    pub roots: Vec<PathBuf>,

    /// TOML configuration file with roots and archive limits
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a path against the configured roots
    Resolve(PathArgs),
    /// List a folder
    Ls(ListArgs),
    /// Create a folder (and missing parents)
    Mkdir(PathArgs),
    /// Rename a file or folder in place
    Rename(RenameArgs),
    /// Delete a file or folder recursively
    Rm(PathArgs),
    /// Copy a file or folder into a folder
    Cp(TransferArgs),
    /// Move a file or folder into a folder
    Mv(TransferArgs),
    /// Download a file
    Get(GetArgs),
    /// Upload a local file into a folder
    Put(PutArgs),
    /// Export a folder as a ZIP archive
    Pack(PackArgs),
    /// Import a local ZIP archive into a folder
    Unpack(UnpackArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

impl Commands {
    /// Operation name used in JSON output.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Resolve(_) => "resolve",
            Self::Ls(_) => "ls",
            Self::Mkdir(_) => "mkdir",
            Self::Rename(_) => "rename",
            Self::Rm(_) => "rm",
            Self::Cp(_) => "cp",
            Self::Mv(_) => "mv",
            Self::Get(_) => "get",
            Self::Put(_) => "put",
            Self::Pack(_) => "pack",
            Self::Unpack(_) => "unpack",
            Self::Completion(_) => "completion",
        }
    }
}

#[derive(clap::Args)]
pub struct PathArgs {
    /// Root-relative or absolute path
    #[arg(value_name = "PATH")]
    pub path: String,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Folder to list (default: first root)
    #[arg(value_name = "PATH", default_value = "")]
    pub path: String,

    /// Show sizes in human-readable format
    #[arg(short = 'H', long)]
    pub human_readable: bool,
}

#[derive(clap::Args)]
pub struct RenameArgs {
    /// Item to rename
    #[arg(value_name = "PATH")]
    pub path: String,

    /// New name (a bare name, not a path)
    #[arg(value_name = "NEW_NAME")]
    pub new_name: String,
}

#[derive(clap::Args)]
pub struct TransferArgs {
    /// Item to copy or move
    #[arg(value_name = "SRC")]
    pub src: String,

    /// Destination folder
    #[arg(value_name = "DEST_DIR")]
    pub dest_dir: String,
}

#[derive(clap::Args)]
pub struct GetArgs {
    /// File to download
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Local output file, `-` for stdout (default: file name in current directory)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Overwrite the local output file if it exists
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct PutArgs {
    /// Local file to upload
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Destination folder (default: first root)
    #[arg(value_name = "DEST_DIR", default_value = "")]
    pub dest_dir: String,

    /// Name to store the file under (default: local file name)
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,
}

#[derive(clap::Args)]
pub struct PackArgs {
    /// Folder to export
    #[arg(value_name = "DIR")]
    pub dir: String,

    /// Local archive path, `-` for stdout (default: archive name in current directory)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Compression level (0 stores entries uncompressed)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(0..=9))]
    pub compression_level: Option<u8>,

    /// Overwrite the local archive if it exists
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct UnpackArgs {
    /// Local ZIP archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Destination folder (default: first root)
    #[arg(value_name = "DEST_DIR", default_value = "")]
    pub dest_dir: String,

    /// Maximum number of entries
    #[arg(long)]
    pub max_entries: Option<usize>,

    /// Maximum total uncompressed size in bytes
    #[arg(long, value_parser = parse_byte_size)]
    pub max_total_size: Option<u64>,

    /// Maximum single entry size in bytes
    #[arg(long, value_parser = parse_byte_size)]
    pub max_entry_size: Option<u64>,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Parse byte size with optional suffix (K, M, G, T)
#[allow(clippy::option_if_let_else)]
fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty byte size".to_string());
    }

    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('T') {
        (stripped, 1024_u64.pow(4))
    } else if let Some(stripped) = s.strip_suffix('G') {
        (stripped, 1024_u64.pow(3))
    } else if let Some(stripped) = s.strip_suffix('M') {
        (stripped, 1024_u64.pow(2))
    } else if let Some(stripped) = s.strip_suffix('K') {
        (stripped, 1024)
    } else {
        (s, 1)
    };

    num_str
        .parse::<u64>()
        .map_err(|_| format!("invalid byte size: {s}"))
        .and_then(|n| {
            n.checked_mul(multiplier)
                .ok_or_else(|| format!("byte size overflow: {s}"))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_roots_are_global_and_repeatable() {
        let cli = Cli::try_parse_from([
            "fsgate", "--root", "/srv/a", "ls", "docs", "-r", "/srv/b",
        ])
        .unwrap();
        assert_eq!(cli.roots, [PathBuf::from("/srv/a"), PathBuf::from("/srv/b")]);
        assert!(matches!(cli.command, Commands::Ls(ref a) if a.path == "docs"));
    }

    #[test]
    fn test_optional_folders_default_to_first_root() {
        let cli = Cli::try_parse_from(["fsgate", "ls"]).unwrap();
        assert!(matches!(cli.command, Commands::Ls(ref a) if a.path.is_empty()));

        let cli = Cli::try_parse_from(["fsgate", "unpack", "x.zip"]).unwrap();
        assert!(matches!(cli.command, Commands::Unpack(ref a) if a.dest_dir.is_empty()));
    }

    #[test]
    fn test_compression_level_range() {
        assert!(Cli::try_parse_from(["fsgate", "pack", "d", "-l", "0"]).is_ok());
        assert!(Cli::try_parse_from(["fsgate", "pack", "d", "-l", "10"]).is_err());
    }

    #[test]
    fn test_parse_byte_size() {
        assert_eq!(parse_byte_size("100").unwrap(), 100);
        assert_eq!(parse_byte_size("1K").unwrap(), 1024);
        assert_eq!(parse_byte_size("2M").unwrap(), 2 * 1024 * 1024);
        assert_eq!(parse_byte_size("3G").unwrap(), 3 * 1024 * 1024 * 1024);
        assert_eq!(parse_byte_size("1T").unwrap(), 1024_u64.pow(4));
        assert!(parse_byte_size("invalid").is_err());
        assert!(parse_byte_size("").is_err());
    }

    #[test]
    fn test_parse_byte_size_overflow() {
        assert!(parse_byte_size("18446744073709551615K").is_err());
        assert!(parse_byte_size("17592186044416G").is_err());
    }
}
