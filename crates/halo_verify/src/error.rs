//! Status check errors

use thiserror::Error;

/// Why a single status check did not produce a report.
///
/// Every variant is recoverable: the poller retries on the next tick.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("status request failed: {0}")]
    Transport(String),

    #[error("status endpoint returned HTTP {0}")]
    Status(u16),

    #[error("malformed status response: {0}")]
    Decode(String),
}
