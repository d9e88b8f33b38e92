// Output formatting and styling

use std::path::PathBuf;

use colored::Colorize;
use crudforge_generation::{FileAction, GenerationReport, GenerationResult, PlannedFile};

/// Characters of content shown per file in a dry-run preview
pub const PREVIEW_CHARS: usize = 500;

/// Leading excerpt of a file a dry run would write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePreview {
    pub path: PathBuf,
    pub excerpt: String,
    pub truncated: bool,
}

impl FilePreview {
    /// Preview of a planned file, or `None` when nothing would be written to it
    pub fn from_planned(file: &PlannedFile) -> Option<Self> {
        if !matches!(file.action, FileAction::Created | FileAction::Overwritten) {
            return None;
        }
        let cut = file
            .content
            .char_indices()
            .nth(PREVIEW_CHARS)
            .map(|(index, _)| index);
        let excerpt = match cut {
            Some(index) => &file.content[..index],
            None => file.content.as_str(),
        };
        Some(Self {
            path: file.path.clone(),
            excerpt: excerpt.to_string(),
            truncated: cut.is_some(),
        })
    }
}

/// Output styling configuration
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl OutputStyle {
    /// Format success message
    pub fn success(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✓".green().bold(), msg)
        } else {
            format!("✓ {}", msg)
        }
    }

    /// Format error message
    pub fn error(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✗".red().bold(), msg)
        } else {
            format!("✗ {}", msg)
        }
    }

    /// Format warning message
    pub fn warning(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "⚠".yellow(), msg)
        } else {
            format!("⚠ {}", msg)
        }
    }

    /// Format info message
    pub fn info(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "ℹ".blue(), msg)
        } else {
            format!("ℹ {}", msg)
        }
    }

    /// Format an identifier or path
    pub fn code(&self, code: &str) -> String {
        if self.use_colors {
            code.cyan().to_string()
        } else {
            code.to_string()
        }
    }

    /// Format header
    pub fn header(&self, title: &str) -> String {
        if self.use_colors {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    }

    /// Format a section header
    pub fn section(&self, title: &str) -> String {
        if self.use_colors {
            format!(
                "\n{}\n{}",
                title.bold().underline(),
                "─".repeat(title.chars().count())
            )
        } else {
            format!("\n{}\n{}", title, "─".repeat(title.chars().count()))
        }
    }

    /// Format a key-value pair
    pub fn key_value(&self, key: &str, value: &str) -> String {
        if self.use_colors {
            format!("  {}: {}", key.bold(), value)
        } else {
            format!("  {}: {}", key, value)
        }
    }

    /// Format one file outcome
    pub fn file_result(&self, result: &GenerationResult) -> String {
        let label = format!("{:<14}", result.action.to_string());
        let label = if self.use_colors {
            match result.action {
                FileAction::Created => label.green().to_string(),
                FileAction::Overwritten => label.yellow().to_string(),
                FileAction::SkippedExists => label.dimmed().to_string(),
                FileAction::Failed => label.red().bold().to_string(),
            }
        } else {
            label
        };

        match &result.reason {
            Some(reason) if result.action != FileAction::SkippedExists || reason == "cancelled" => {
                format!("  {} {} ({})", label, result.path.display(), reason)
            }
            _ => format!("  {} {}", label, result.path.display()),
        }
    }

    /// Format a dry-run preview block
    pub fn preview(&self, preview: &FilePreview) -> String {
        let header = self.info(&format!(
            "Would generate: {}",
            self.code(&preview.path.display().to_string())
        ));
        let mut block = format!("{}\n{}", header, preview.excerpt.trim_end());
        if preview.truncated {
            block.push_str("\n...");
        }
        block
    }

    /// Format the summary line of a report
    pub fn report_summary(&self, report: &GenerationReport) -> String {
        let line = report.summary_line();
        if report.is_success() {
            self.success(&line)
        } else if report.error.is_some() {
            self.error(&line)
        } else {
            self.warning(&line)
        }
    }
}

/// Print formatted output
pub fn print_error(msg: &str) {
    let style = OutputStyle::default();
    eprintln!("{}", style.error(msg));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_style_without_colors() {
        let style = OutputStyle { use_colors: false };
        assert_eq!(style.success("test"), "✓ test");
        assert_eq!(style.error("test"), "✗ test");
        assert_eq!(style.warning("test"), "⚠ test");
        assert_eq!(style.info("test"), "ℹ test");
    }

    #[test]
    fn test_section_formatting() {
        let style = OutputStyle { use_colors: false };
        let result = style.section("Templates");
        assert_eq!(result, "\nTemplates\n─────────");
    }

    #[test]
    fn test_file_result_formatting() {
        let style = OutputStyle { use_colors: false };
        let created = GenerationResult::new("a/b.ts", FileAction::Created);
        assert_eq!(style.file_result(&created), "  created        a/b.ts");

        let skipped =
            GenerationResult::with_reason("a/b.ts", FileAction::SkippedExists, "file already exists");
        assert_eq!(style.file_result(&skipped), "  skipped-exists a/b.ts");

        let cancelled = GenerationResult::with_reason("a/b.ts", FileAction::SkippedExists, "cancelled");
        assert!(style.file_result(&cancelled).ends_with("(cancelled)"));

        let failed = GenerationResult::with_reason("a/b.ts", FileAction::Failed, "denied");
        assert!(style.file_result(&failed).ends_with("a/b.ts (denied)"));
    }

    #[test]
    fn test_key_value_formatting() {
        let style = OutputStyle { use_colors: false };
        assert_eq!(style.key_value("pascal", "DrugUnit"), "  pascal: DrugUnit");
    }

    fn planned(content: &str, action: FileAction) -> PlannedFile {
        PlannedFile {
            template_id: "page.dashboard".into(),
            path: PathBuf::from("apps/web/src/app/dashboard.page.ts"),
            content: content.into(),
            action,
            reason: None,
        }
    }

    #[test]
    fn test_preview_truncates_long_content() {
        let content = "é".repeat(PREVIEW_CHARS + 20);
        let preview = FilePreview::from_planned(&planned(&content, FileAction::Created)).unwrap();
        assert!(preview.truncated);
        assert_eq!(preview.excerpt.chars().count(), PREVIEW_CHARS);

        let style = OutputStyle { use_colors: false };
        let block = style.preview(&preview);
        assert!(block.starts_with("ℹ Would generate: apps/web/src/app/dashboard.page.ts\n"));
        assert!(block.ends_with("\n..."));
    }

    #[test]
    fn test_preview_keeps_short_content_whole() {
        let preview =
            FilePreview::from_planned(&planned("export {};\n", FileAction::Overwritten)).unwrap();
        assert!(!preview.truncated);
        assert_eq!(preview.excerpt, "export {};\n");
    }

    #[test]
    fn test_no_preview_for_files_left_alone() {
        assert!(FilePreview::from_planned(&planned("x", FileAction::SkippedExists)).is_none());
        assert!(FilePreview::from_planned(&planned("x", FileAction::Failed)).is_none());
    }
}
