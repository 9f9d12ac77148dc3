//! Stage errors

use std::time::Duration;

use thiserror::Error;

use crate::provider::ProviderError;
use crate::repository::StoreError;

/// Why a stage run failed
///
/// Every variant ends with the job marked failed; the message is what the
/// job displays.
#[derive(Debug, Error)]
pub enum StageError {
    /// The job lacks the output of the stage before it
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
