//! Harvest module - paginated, rate-limited, retrying fetch engine.
//!
//! This module provides the core of the repository harvester:
//! - **Traits**: [`PageSource`], [`MemberSource`], [`Delay`] seams for data access and waiting
//! - **Errors**: the [`FetchError`] taxonomy shared by every attempt
//! - **Fetcher**: single-page retries via [`fetcher::PageFetcher`]
//! - **Pipeline**: the cursor walk via [`pipeline::PaginationDriver`]

pub mod fetcher;
pub mod pipeline;
pub mod traits;

// Re-export commonly used types
pub use traits::{Delay, FailureKind, FetchError, MemberSource, PageSource, TokioDelay};

pub use fetcher::PageFetcher;
pub use pipeline::{HarvestError, HarvestResult, HarvestStats, PaginationDriver, PaginationState};
