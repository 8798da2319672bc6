// ── Core error types ──
//
// Two layers: `ExpanderError` is what a single expander (or the default
// content provider) reports, `ExpandError` is what one expansion request
// reports to the caller. Neither ever tears the process down; the UI shows
// the message and keeps the previous page.

use thiserror::Error;

/// Failure reported by one expander invocation.
#[derive(Debug, Error)]
pub enum ExpanderError {
    /// The ARM request behind the expander failed.
    #[error(transparent)]
    Api(#[from] azbrowse_api::Error),

    /// The node lacks state this expander depends on.
    #[error("node {id} is missing '{key}' metadata")]
    MissingMetadata { id: String, key: &'static str },

    /// The invocation's context was cancelled before it finished.
    #[error("expansion cancelled")]
    Cancelled,

    /// The task running the expander ended without reporting a result.
    #[error("expander task ended without a result")]
    Aborted,
}

/// Failure of a whole expansion request.
#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("expander '{expander}' could not check the node: {source}")]
    PredicateFailed {
        expander: String,
        #[source]
        source: ExpanderError,
    },

    #[error(
        "expansion timed out after {elapsed_secs}s: {completed} of {total} expanders completed"
    )]
    Timeout {
        completed: usize,
        total: usize,
        elapsed_secs: u64,
    },

    #[error("expander '{expander}' failed: {source}")]
    ProduceFailed {
        expander: String,
        #[source]
        source: ExpanderError,
    },

    #[error("failed to load content: {source}")]
    DefaultContentFailed {
        #[source]
        source: ExpanderError,
    },
}

/// Errors outside a single expansion (startup listing).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Failed to load subscriptions: {0}")]
    Subscriptions(#[from] azbrowse_api::Error),

    #[error("Failed to load provider api versions: {0}")]
    Providers(#[source] azbrowse_api::Error),
}
