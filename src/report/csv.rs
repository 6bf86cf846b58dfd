//! Delimited-text rendering and the file-backed [`ReportWriter`].

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::report::Table;
use crate::traits::{ReportError, ReportWriter};

pub const DEFAULT_DELIMITER: char = ',';

fn escape(field: &str, delimiter: char) -> String {
    if field.contains(delimiter) || field.contains(['"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_line(out: &mut String, cells: &[String], delimiter: char) {
    let line: Vec<String> = cells.iter().map(|c| escape(c, delimiter)).collect();
    out.push_str(&line.join(&delimiter.to_string()));
}

/// Renders a table. Lines are joined with `\n`, no trailing newline.
pub fn render(table: &Table, delimiter: char) -> String {
    if table.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    write_line(&mut out, &table.header, delimiter);
    for row in &table.rows {
        out.push('\n');
        write_line(&mut out, row, delimiter);
    }
    out
}

/// Writes rendered tables to a single file, replacing previous contents.
#[derive(Debug, Clone)]
pub struct CsvFileWriter {
    path: PathBuf,
    delimiter: char,
}

impl CsvFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: DEFAULT_DELIMITER,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

#[async_trait]
impl ReportWriter for CsvFileWriter {
    async fn write(&self, table: &Table) -> Result<PathBuf, ReportError> {
        let contents = render(table, self.delimiter);
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|source| ReportError::Write {
                path: self.path.clone(),
                source,
            })?;
        info!(
            path = %self.path.display(),
            rows = table.rows.len(),
            "Report written"
        );
        Ok(self.path.clone())
    }
}
