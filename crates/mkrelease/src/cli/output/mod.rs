//! Output formatting utilities

use console::{style, Style};

use mkrelease_core::types::TagOutcome;
use mkrelease_core::workflow::{ReleaseEvent, ReleaseReporter, ReleaseStep};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// Create a styled header
pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Create a styled key-value line
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

/// Style for version numbers
pub fn version_style() -> Style {
    Style::new().green().bold()
}

/// Style for tags
pub fn tag_style() -> Style {
    Style::new().yellow()
}

/// Style for paths
pub fn path_style() -> Style {
    Style::new().cyan()
}

/// Prints pipeline progress to stdout
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    /// Reporter printing per-asset steps and byte counts when `verbose`
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ReleaseReporter for ConsoleReporter {
    fn report(&self, event: &ReleaseEvent) {
        match event {
            ReleaseEvent::StepStarted { step } => {
                let per_asset = matches!(step, ReleaseStep::OpenAsset | ReleaseStep::UploadAsset);
                if !per_asset || self.verbose {
                    info(step.label());
                }
            }
            ReleaseEvent::Checksum {
                file_name,
                checksum,
            } => {
                println!("{}", key_value(&format!("SHA256 ({})", file_name), checksum));
            }
            ReleaseEvent::Committed { commit } => {
                success(&format!(
                    "Committed formula update with SHA: {}",
                    style(commit).dim()
                ));
            }
            ReleaseEvent::Tagged { tag, outcome } => {
                let tag = tag_style().apply_to(tag);
                match outcome {
                    TagOutcome::Created => success(&format!("Created and pushed tag {}", tag)),
                    TagOutcome::AlreadyExists => {
                        success(&format!("Tag {} already exists, pushed it", tag))
                    }
                }
            }
            ReleaseEvent::ReleaseCreated { tag, id } => {
                success(&format!(
                    "Created release {} (id {})",
                    tag_style().apply_to(tag),
                    id
                ));
            }
            ReleaseEvent::AssetUploaded { file_name, bytes } => {
                if self.verbose {
                    success(&format!("Uploaded {} ({} bytes)", file_name, bytes));
                } else {
                    success(&format!("Uploaded {}", file_name));
                }
            }
            ReleaseEvent::Deployed { command } => {
                success(&format!("Deployed with `{}`", command));
            }
            // Reported by main on exit
            ReleaseEvent::Failed { .. } => {}
            ReleaseEvent::Completed { summary } => {
                println!();
                success(&format!(
                    "Successfully created release {} with all assets",
                    version_style().apply_to(&summary.tag)
                ));
                if self.verbose {
                    println!("{}", key_value("Commit", &summary.commit));
                    println!("{}", key_value("Release id", &summary.release_id.to_string()));
                }
            }
        }
    }
}
