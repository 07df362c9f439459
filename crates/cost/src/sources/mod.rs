//! Cost source trait and implementations.
//!
//! A cost source is the opaque collaborator that knows how to price the
//! account. This crate never computes costs itself.

mod command;
mod file;

pub use command::CommandSource;
pub use file::JsonFileSource;

use async_trait::async_trait;
use thiserror::Error;

use crate::report::CostReport;

/// Errors that can occur while fetching cost figures.
#[derive(Error, Debug)]
pub enum CostSourceError {
    /// Reading the source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source output was not valid JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A cost field had an unusable value.
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// External pricing command failed.
    #[error("Command '{program}' failed: {message}")]
    Command { program: String, message: String },
}

/// Trait for cost sources.
#[async_trait]
pub trait CostSource: Send + Sync {
    /// Get the source name (e.g., "file", "command").
    fn name(&self) -> &'static str;

    /// Fetch the cost figures for the current billing period.
    ///
    /// # Errors
    ///
    /// Returns an error if the figures cannot be obtained or parsed.
    async fn get_total_cost(&self) -> Result<CostReport, CostSourceError>;
}
