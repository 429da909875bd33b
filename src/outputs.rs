//! Step outputs of a successful run.

use crate::cli::PublishOutcome;
use crate::error::Result;
use crate::ui::formatter::{format_summary_markdown, RunSummary};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Environment variable naming the file GitHub Actions reads outputs from
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Environment variable naming the markdown file shown as the job summary
pub const GITHUB_STEP_SUMMARY_ENV: &str = "GITHUB_STEP_SUMMARY";

const DELIMITER: &str = "APP_TAGGER_EOF";

/// Structured outputs: `tag_version` and `new_tag`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutputs {
    pub tag_version: String,
    pub new_tag: String,
}

impl From<&PublishOutcome> for ActionOutputs {
    fn from(outcome: &PublishOutcome) -> Self {
        ActionOutputs {
            tag_version: outcome.tag_version.clone(),
            new_tag: outcome.new_tag.clone(),
        }
    }
}

impl ActionOutputs {
    /// One `key=value` entry per output.
    ///
    /// Values spanning lines use the `key<<DELIMITER` form so they cannot
    /// start a second entry.
    pub fn to_lines(&self) -> String {
        let mut out = output_entry("tag_version", &self.tag_version);
        out.push_str(&output_entry("new_tag", &self.new_tag));
        out
    }

    /// Append the outputs to `path`, creating the file if needed
    pub fn append_to(&self, path: &Path) -> Result<()> {
        append_text(path, &self.to_lines())
    }

    /// Write to the file named by `GITHUB_OUTPUT`, or to stdout outside of CI
    pub fn emit(&self) -> Result<()> {
        match std::env::var_os(GITHUB_OUTPUT_ENV) {
            Some(path) if !path.is_empty() => self.append_to(Path::new(&path)),
            _ => {
                print!("{}", self.to_lines());
                Ok(())
            }
        }
    }
}

fn output_entry(key: &str, value: &str) -> String {
    if !value.contains(|c: char| c == '\n' || c == '\r') {
        return format!("{}={}\n", key, value);
    }

    let mut delimiter = DELIMITER.to_string();
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    format!("{}<<{}\n{}\n{}\n", key, delimiter, value, delimiter)
}

fn append_text(path: &Path, text: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(text.as_bytes())?;
    Ok(())
}

/// Append the run summary as markdown to `path`
pub fn append_step_summary_to(summary: &RunSummary, path: &Path) -> Result<()> {
    append_text(path, &format_summary_markdown(summary))
}

/// Append the run summary to the file named by `GITHUB_STEP_SUMMARY`.
///
/// Returns `false` without writing when the variable is unset.
pub fn append_step_summary(summary: &RunSummary) -> Result<bool> {
    match std::env::var_os(GITHUB_STEP_SUMMARY_ENV) {
        Some(path) if !path.is_empty() => {
            append_step_summary_to(summary, Path::new(&path))?;
            Ok(true)
        }
        _ => Ok(false),
    }
}
