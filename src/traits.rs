use crate::report::Table;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait ReportWriter: Send + Sync {
    /// Persists a rendered table and returns where it went.
    async fn write(&self, table: &Table) -> Result<PathBuf, ReportError>;
}
