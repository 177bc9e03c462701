use thiserror::Error;

/// Message shown when the read endpoint answers with a non-success status.
pub const FETCH_STATUS_MESSAGE: &str = "Could not read the sheet. Check the published CSV URL.";

/// Message shown when a submission misses its name or item.
pub const VALIDATION_MESSAGE: &str = "Name and item are required.";

/// Fallback when the write endpoint fails without saying why.
pub const WRITE_FALLBACK_MESSAGE: &str = "Could not add the entry.";

/// Failures surfaced by the sync pipeline.
///
/// The `Display` text of each variant is exactly what ends up in the
/// controller's error slot, so it is written for the person using the list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Network error or non-success status on the read endpoint.
    #[error("{0}")]
    Fetch(String),

    /// Required submission fields are missing. No request was made.
    #[error("{0}")]
    Validation(String),

    /// The write endpoint did not acknowledge the row.
    #[error("{0}")]
    Write(String),

    /// Endpoints or timings are unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    pub fn validation() -> Self {
        SyncError::Validation(VALIDATION_MESSAGE.to_string())
    }

    /// Builds a write failure from the raw response body.
    pub fn write_rejected(body: &str) -> Self {
        if body.is_empty() {
            SyncError::Write(WRITE_FALLBACK_MESSAGE.to_string())
        } else {
            SyncError::Write(body.to_string())
        }
    }
}
