//! Outdoor job scraper for the Tampa Bay area.
//!
//! Fetches a fixed list of job sources one after another, extracts listings
//! with descriptor-driven selectors, snapshots them to JSON and hands the
//! result to the `mailer` crate for the email digest.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod logging;
pub mod pipeline;
pub mod sources;

pub use aggregator::Aggregator;
pub use config::{Cli, Config, ConfigError};
pub use error::{ExtractError, FetchError};
pub use extractor::{Extractor, FieldRule, LinkRule, SourceDescriptor};
pub use fetcher::{Fetcher, RetryPolicy};
pub use logging::LogContext;
