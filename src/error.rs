use thiserror::Error;

use crate::usage::UsageError;

/// Startup failures that abort the program
#[derive(Debug, Error)]
pub enum NudgeError {
    #[error("Usage counters unavailable: {0}")]
    Usage(#[from] UsageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
