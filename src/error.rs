use thiserror::Error;

/// Why a fetch produced no items. The `Display` text is the failure reason
/// shown to the user.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid endpoint URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("server responded with {code}: {body}")]
    Status { code: u16, body: String },

    #[error("failed to read response body: {0}")]
    Body(#[from] std::io::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}
