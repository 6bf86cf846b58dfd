pub mod activity;
pub mod aggregate;
pub mod config;
pub mod executor;
pub mod github;
pub mod harvest;
pub mod model;
pub mod report;
pub mod runner;
pub mod statistics;
pub mod traits;

// Re-export common types for convenience
pub use config::{BatchingConfig, BatchingOverrides, ConfigError, RunConfig};
pub use executor::*;
pub use model::*;
pub use runner::{ReportRunner, RunError, RunSummary};
pub use traits::*;
