use crate::errors::Result;
use crate::target::SearchReport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Defines the possible output formats for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// A simple, human-readable text format.
    Text,
    /// JSON format, suitable for machine processing.
    Json,
    /// Comma-Separated Values format.
    Csv,
}

/// Handles the formatting of search results into various output formats.
pub struct OutputFormatter {
    format: OutputFormat,
    tool_name: String,
    tool_version: String,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Writes the formatted report to a given writer.
    pub fn write_output<W: Write>(&self, writer: &mut W, report: &SearchReport) -> Result<()> {
        let output = match self.format {
            OutputFormat::Text => self.format_text(report),
            OutputFormat::Json => self.format_json(report)?,
            OutputFormat::Csv => self.format_csv(report)?,
        };
        writer.write_all(output.as_bytes())?;
        Ok(())
    }

    /// One line per item with matches, then the total.
    fn format_text(&self, report: &SearchReport) -> String {
        let mut output = String::new();
        for item in report.items.iter().filter(|i| i.count > 0) {
            output.push_str(&format!("{}: {} match(es)\n", item.label, item.count));
        }
        output.push_str(&format!(
            "Total matches: {} in {} item(s)\n",
            report.total,
            report.items.len()
        ));
        output
    }

    fn format_json(&self, report: &SearchReport) -> Result<String> {
        #[derive(Serialize)]
        struct JsonOutput<'a> {
            tool: ToolInfo<'a>,
            search_time: DateTime<Utc>,
            pattern: &'a str,
            total_matches: usize,
            items: Vec<JsonItem<'a>>,
        }

        #[derive(Serialize)]
        struct ToolInfo<'a> {
            name: &'a str,
            version: &'a str,
        }

        #[derive(Serialize)]
        struct JsonItem<'a> {
            target: &'a str,
            matches: usize,
        }

        let output = JsonOutput {
            tool: ToolInfo {
                name: &self.tool_name,
                version: &self.tool_version,
            },
            search_time: Utc::now(),
            pattern: &report.pattern,
            total_matches: report.total,
            items: report
                .items
                .iter()
                .map(|i| JsonItem {
                    target: &i.label,
                    matches: i.count,
                })
                .collect(),
        };

        let mut json = serde_json::to_string_pretty(&output)?;
        json.push('\n');
        Ok(json)
    }

    fn format_csv(&self, report: &SearchReport) -> Result<String> {
        use csv::Writer;

        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_record(["Target", "Matches"])?;
        for item in &report.items {
            wtr.write_record([item.label.clone(), item.count.to_string()])?;
        }

        let data = wtr
            .into_inner()
            .map_err(|e| format!("CSV writer error: {}", e))?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::ItemMatches;

    fn create_test_report() -> SearchReport {
        SearchReport {
            pattern: "TODO".to_string(),
            total: 3,
            items: vec![
                ItemMatches {
                    label: "docs/a.md".to_string(),
                    count: 3,
                },
                ItemMatches {
                    label: "docs/b, c.md".to_string(),
                    count: 0,
                },
            ],
            previews: Vec::new(),
        }
    }

    #[test]
    fn test_text_format_lists_matching_items() {
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let output = formatter.format_text(&create_test_report());
        assert_eq!(output, "docs/a.md: 3 match(es)\nTotal matches: 3 in 2 item(s)\n");
    }

    #[test]
    fn test_json_format() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_json(&create_test_report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["total_matches"], 3);
        assert_eq!(parsed["pattern"], "TODO");
        assert_eq!(parsed["items"][1]["target"], "docs/b, c.md");
        assert_eq!(parsed["tool"]["name"], "mdtedit");
    }

    #[test]
    fn test_csv_format() {
        let formatter = OutputFormatter::new(OutputFormat::Csv);
        let output = formatter.format_csv(&create_test_report()).unwrap();

        let mut rdr = csv::Reader::from_reader(output.as_bytes());
        assert_eq!(rdr.headers().unwrap().get(0), Some("Target"));
        let records: Vec<_> = rdr
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get(0), Some("docs/b, c.md"));
    }

    #[test]
    fn test_write_output_to_buffer() {
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let mut buffer = Vec::new();
        formatter
            .write_output(&mut buffer, &create_test_report())
            .unwrap();
        assert!(String::from_utf8(buffer).unwrap().ends_with("Total matches: 3 in 2 item(s)\n"));
    }
}
