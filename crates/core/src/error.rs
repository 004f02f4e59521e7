use thiserror::Error;

/// Catalog could not be loaded. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("missing required catalog key: {0}")]
    MissingKey(String),

    #[error("intent `{0}` has an empty response text")]
    EmptyText(String),

    #[error("fallback_responses must not be empty")]
    EmptyFallback,

    #[error("fallback response #{0} is empty")]
    EmptyFallbackEntry(usize),

    #[error("classification rule for `{0}` has no keywords")]
    EmptyKeywords(String),

    #[error("classification rule for `{0}` contains an empty keyword")]
    BlankKeyword(String),

    #[error(transparent)]
    UnknownIntent(#[from] UnknownIntentError),
}

/// An intent key was looked up that the catalog does not define.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("intent `{0}` is not defined in the catalog")]
pub struct UnknownIntentError(pub String);
