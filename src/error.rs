use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unknown data key `{0}`")]
    UnknownDataKey(String),

    #[error("failed to retrieve `{key}` data: {reason}")]
    FetchFailed { key: String, reason: String },

    /// Persistent storage cannot be opened or written (disabled storage,
    /// read-only location, private browsing profiles and similar).
    #[error("persistent store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("unsupported store schema version {found} (supported up to {supported})")]
    SchemaMismatch { found: u32, supported: u32 },

    #[error("unknown request purpose `{0}`")]
    UnknownPurpose(String),

    #[error("cache worker channel closed")]
    WorkerClosed,
}

impl ChartError {
    /// Returns `true` for failures that make a data key unusable for the rest
    /// of the session.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. } | Self::StoreUnavailable(_) | Self::SchemaMismatch { .. }
        )
    }
}
