//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use fsgate_core::DirEntry;
use fsgate_core::ExtractionReport;
use fsgate_core::UploadReport;
use fsgate_core::VirtualPath;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (i, c) in s.chars().rev().enumerate() {
            if i > 0 && i % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }

        result.chars().rev().collect()
    }

    fn success_line(&self, message: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }

    fn display_path(path: &str) -> &str {
        if path.is_empty() { "/" } else { path }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_resolved(&self, host: &Path, virtual_path: &VirtualPath) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let _ = self.term.write_line(&host.display().to_string());
        if self.verbose {
            let _ = self.term.write_line(&format!(
                "  Virtual path: {}",
                Self::display_path(virtual_path.as_str())
            ));
        }
        Ok(())
    }

    fn format_listing(&self, dir: &str, entries: &[DirEntry], human_readable: bool) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut total_size = 0u64;
        for entry in entries {
            let type_char = if entry.is_folder() { "d" } else { "-" };
            let size_str = match entry.size {
                Some(size) if human_readable => Self::format_size(size),
                Some(size) => size.to_string(),
                None => "-".to_string(),
            };
            total_size += entry.size.unwrap_or(0);

            let name = if entry.is_folder() && self.use_colors {
                style(format!("{}/", entry.name)).blue().bold().to_string()
            } else if entry.is_folder() {
                format!("{}/", entry.name)
            } else {
                entry.name.clone()
            };

            let _ = self
                .term
                .write_line(&format!("{type_char} {size_str:>10}  {name}"));
        }

        if self.verbose {
            let folders = entries.iter().filter(|e| e.is_folder()).count();
            let _ = self.term.write_line("");
            let _ = self.term.write_line(&format!(
                "{}: {} folders, {} files, {}",
                Self::display_path(dir),
                Self::format_number(folders),
                Self::format_number(entries.len() - folders),
                Self::format_size(total_size)
            ));
        }

        Ok(())
    }

    fn format_done(&self, operation: &str, path: &str) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let verb = match operation {
            "mkdir" => "Created",
            "rename" => "Renamed to",
            "rm" => "Deleted",
            "cp" => "Copied to",
            "mv" => "Moved to",
            _ => "Done:",
        };
        self.success_line(&format!("{verb} {}", Self::display_path(path)));
        Ok(())
    }

    fn format_download(&self, name: &str, size: u64, output: &Path) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.success_line(&format!(
            "Downloaded {name} ({}) to {}",
            Self::format_size(size),
            output.display()
        ));
        Ok(())
    }

    fn format_upload(&self, report: &UploadReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.success_line(&format!(
            "Uploaded {} ({})",
            report.path,
            Self::format_size(report.size)
        ));
        Ok(())
    }

    fn format_pack(&self, filename: &str, size: u64, output: &Path) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.success_line(&format!("Archive created: {}", output.display()));
        if self.verbose {
            let _ = self.term.write_line(&format!("  Archive name: {filename}"));
        }
        let _ = self
            .term
            .write_line(&format!("  Size: {}", Self::format_size(size)));
        Ok(())
    }

    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.success_line(&format!("Extracted into {}", report.folder));

        let _ = self.term.write_line(&format!(
            "  Files extracted: {}",
            Self::format_number(report.files_extracted)
        ));
        let _ = self.term.write_line(&format!(
            "  Directories: {}",
            Self::format_number(report.directories_created)
        ));
        let _ = self.term.write_line(&format!(
            "  Total size: {}",
            Self::format_size(report.bytes_written)
        ));

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Skipped: {}", report.entries_skipped));
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        if report.has_warnings() {
            let _ = self.term.write_line("");
            if self.use_colors {
                let _ = self
                    .term
                    .write_line(&format!("{}", style("Warnings:").yellow().bold()));
            } else {
                let _ = self.term.write_line("Warnings:");
            }
            for warning in &report.warnings {
                let _ = self.term.write_line(&format!("  - {warning}"));
            }
        }

        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Always shown, even in quiet mode.
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error:#}", style("Error:").red().bold()));
        } else {
            let _ = term.write_line(&format!("Error: {error:#}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(HumanFormatter::format_size(0), "0 B");
        assert_eq!(HumanFormatter::format_size(1023), "1023 B");
        assert_eq!(HumanFormatter::format_size(1536), "1.5 KB");
        assert_eq!(HumanFormatter::format_size(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(HumanFormatter::format_size(1536 * 1024 * 1024), "1.5 GB");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(HumanFormatter::format_number(0), "0");
        assert_eq!(HumanFormatter::format_number(999), "999");
        assert_eq!(HumanFormatter::format_number(1000), "1,000");
        assert_eq!(HumanFormatter::format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_root_is_displayed_as_slash() {
        assert_eq!(HumanFormatter::display_path(""), "/");
        assert_eq!(HumanFormatter::display_path("docs/a"), "docs/a");
    }
}
