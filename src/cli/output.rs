//! Output formatting utilities

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat, is_list: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto => {
            if is_list {
                OutputFormat::Tsv
            } else {
                OutputFormat::Yaml
            }
        }
        other => other,
    }
}

/// Print a serializable value as JSON or YAML
pub fn print_document<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
        }
        _ => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

/// Rows of plain text cells with a header
pub struct Rows {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Rows {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Print as tsv, table or csv
    pub fn print(&self, format: OutputFormat) -> Result<()> {
        print!("{}", self.render(format)?);
        Ok(())
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(self.headers.clone());
                for row in &self.rows {
                    builder.push_record(row.clone());
                }
                let mut table = builder.build();
                table.with(Style::rounded());
                Ok(format!("{}\n", table))
            }
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(Vec::new());
                writer.write_record(&self.headers).into_diagnostic()?;
                for row in &self.rows {
                    writer.write_record(row).into_diagnostic()?;
                }
                let bytes = writer
                    .into_inner()
                    .map_err(|e| miette::miette!("{}", e))?;
                String::from_utf8(bytes).into_diagnostic()
            }
            _ => {
                let mut out = self.headers.join("\t").to_uppercase();
                out.push('\n');
                for row in &self.rows {
                    let cells: Vec<String> = row.iter().map(|c| c.replace(['\t', '\n'], " ")).collect();
                    out.push_str(&cells.join("\t"));
                    out.push('\n');
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Rows {
        let mut rows = Rows::new(&["id", "customer"]);
        rows.push(vec!["REP@1".into(), "Doe, John".into()]);
        rows
    }

    #[test]
    fn test_effective_format() {
        assert_eq!(effective_format(OutputFormat::Auto, true), OutputFormat::Tsv);
        assert_eq!(effective_format(OutputFormat::Auto, false), OutputFormat::Yaml);
        assert_eq!(effective_format(OutputFormat::Csv, true), OutputFormat::Csv);
    }

    #[test]
    fn test_tsv_render() {
        assert_eq!(
            sample().render(OutputFormat::Tsv).unwrap(),
            "ID\tCUSTOMER\nREP@1\tDoe, John\n"
        );
    }

    #[test]
    fn test_csv_quotes_commas() {
        let csv = sample().render(OutputFormat::Csv).unwrap();
        assert_eq!(csv, "id,customer\nREP@1,\"Doe, John\"\n");
    }

    #[test]
    fn test_table_contains_cells() {
        let table = sample().render(OutputFormat::Table).unwrap();
        assert!(table.contains("REP@1"));
        assert!(table.contains("Doe, John"));
    }
}
