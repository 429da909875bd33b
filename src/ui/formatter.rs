//! Pure formatting functions for UI output.
//!
//! Everything here builds strings; printing happens in [super::ConsoleReporter].

use console::style;
use std::io::Write;
use tabwriter::TabWriter;

use crate::error::Result;

/// Values shown in the end-of-run summary table
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub application: String,
    pub change_type: String,
    pub release_type: Option<String>,
    pub new_tag: String,
    pub tag_version: String,
}

impl RunSummary {
    fn rows(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Application", self.application.as_str()),
            ("Change Type", self.change_type.as_str()),
            (
                "Release Type",
                self.release_type.as_deref().unwrap_or("Production"),
            ),
            ("New Tag", self.new_tag.as_str()),
            ("Tag Version", self.tag_version.as_str()),
        ]
    }
}

/// Render the summary as two aligned columns.
pub fn format_summary(summary: &RunSummary) -> Result<String> {
    let mut tw = TabWriter::new(vec![]);

    writeln!(&mut tw, "Property\tValue")?;
    writeln!(&mut tw, "--------\t-----")?;
    for (key, value) in summary.rows() {
        writeln!(&mut tw, "{}\t{}", key, value)?;
    }

    let buffer = tw
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Render the summary as a GitHub-flavoured markdown table for the job summary.
pub fn format_summary_markdown(summary: &RunSummary) -> String {
    let mut out = String::from("## Version Update Summary\n\n");
    out.push_str("| Property | Value |\n| --- | --- |\n");
    for (key, value) in summary.rows() {
        out.push_str(&format!("| {} | {} |\n", key, value.replace('|', "\\|")));
    }
    out
}

pub fn format_error(message: &str) -> String {
    format!("{} {}", style("ERROR:").red(), message)
}

pub fn format_success(message: &str) -> String {
    format!("{} {}", style("✓").green(), message)
}

pub fn format_status(message: &str) -> String {
    format!("{} {}", style("→").yellow(), message)
}

pub fn format_warning(message: &str) -> String {
    format!("{} {}", style("⚠ WARNING:").yellow(), message)
}

pub fn format_heading(message: &str) -> String {
    style(message).bold().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(release_type: Option<&str>) -> RunSummary {
        RunSummary {
            application: "myapp".to_string(),
            change_type: "minor".to_string(),
            release_type: release_type.map(str::to_string),
            new_tag: "myapp/V1.2.0-beta".to_string(),
            tag_version: "V1.2.0-beta".to_string(),
        }
    }

    #[test]
    fn test_format_summary_rows() {
        let table = format_summary(&summary(Some("beta"))).unwrap();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("Property"));
        assert!(lines[2].starts_with("Application") && lines[2].ends_with("myapp"));
        assert!(lines[4].ends_with("beta"));
        assert!(lines[5].ends_with("myapp/V1.2.0-beta"));
    }

    #[test]
    fn test_format_summary_production_label() {
        let table = format_summary(&summary(None)).unwrap();
        assert!(table.contains("Production"));
    }

    #[test]
    fn test_format_summary_values_share_a_column() {
        let table = format_summary(&summary(Some("beta"))).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        let column = lines[0].find("Value").unwrap();

        for (line, (key, value)) in lines[2..].iter().zip(summary(Some("beta")).rows()) {
            assert!(line.starts_with(key), "{}", line);
            assert_eq!(&line[column..], value, "{}", line);
        }
    }

    #[test]
    fn test_format_summary_markdown() {
        let markdown = format_summary_markdown(&summary(None));
        let lines: Vec<&str> = markdown.lines().collect();

        assert_eq!(lines[0], "## Version Update Summary");
        assert_eq!(lines[2], "| Property | Value |");
        assert_eq!(lines[3], "| --- | --- |");
        assert_eq!(lines[4], "| Application | myapp |");
        assert_eq!(lines[6], "| Release Type | Production |");
        assert_eq!(lines[8], "| Tag Version | V1.2.0-beta |");
    }

    #[test]
    fn test_format_messages_keep_text() {
        assert!(format_error("boom").contains("boom"));
        assert!(format_success("done").contains("done"));
        assert!(format_status("working").contains("working"));
        assert!(format_warning("careful").contains("careful"));
    }
}
