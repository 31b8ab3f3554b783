use thiserror::Error;

/// Error taxonomy for the panel workspace.
///
/// Propagation policy:
/// - credential and primary data-fetch failures bubble to the caller
///   unmasked (no retry, no placeholder data)
/// - directory-lookup failures are handled inside the directory cache
///   (stale entries / numeric fallback names) and normally never surface
///   as this type
/// - unparseable row dates are NOT an error: the aggregator skips the row
///   and records a diagnostic instead
#[derive(Debug, Error)]
pub enum PanelError {
    /// Required configuration is missing (typically the access key).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The token endpoint answered without a usable token.
    #[error("auth error: {0}")]
    Auth(String),

    /// Transport failure or timeout. Single attempt; never retried here.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A tabular envelope cell did not match the expected positional shape.
    #[error("decode error at row {row}: {reason}")]
    Decode { row: usize, reason: String },

    /// A requested entity is absent from the directory or the row set.
    #[error("not found: {0}")]
    NotFound(String),
}

impl PanelError {
    /// Shorthand for positional-shape failures in the decoder.
    pub fn decode(row: usize, reason: impl Into<String>) -> Self {
        PanelError::Decode {
            row,
            reason: reason.into(),
        }
    }
}
