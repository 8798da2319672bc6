// ── Expanders ──
//
// An expander is one capability for resolving a node's children. The
// coordinator asks every registered expander whether it applies, runs the
// ones that do concurrently, and merges what they return.

mod actions;
mod default;
mod deployments;
mod registry;
mod resource_groups;
mod resources;

use std::future::Future;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::ExpanderError;
use crate::fetch::ResourceFetcher;
use crate::model::ResourceNode;

pub(crate) use default::pretty_json;

pub use actions::{ActionsExpander, META_DESCRIPTION};
pub use default::DefaultContent;
pub use deployments::DeploymentsExpander;
pub use registry::ExpanderRegistry;
pub use resource_groups::ResourceGroupsExpander;
pub use resources::ResourcesExpander;

/// Metadata key holding a resource's provider-qualified type.
pub const META_RESOURCE_TYPE: &str = "resourceType";
/// Metadata key holding a resource's location.
pub const META_LOCATION: &str = "location";

/// Capability that may contribute children for a node.
///
/// Implementations are registered once at startup and shared read-only
/// across concurrent expansions.
#[async_trait]
pub trait Expander: Send + Sync {
    /// Stable name, used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Whether this expander applies to `node`. Must not block.
    fn matches(&self, node: &ResourceNode) -> Result<bool, ExpanderError>;

    /// Produce this expander's contribution for `node`.
    async fn expand(
        &self,
        ctx: &ExpandContext,
        node: &ResourceNode,
    ) -> Result<ExpansionResult, ExpanderError>;
}

/// What one expander contributed to an expansion.
#[derive(Debug, Clone, Default)]
pub struct ExpansionResult {
    /// Name of the expander that produced this result.
    pub source: String,
    pub nodes: Option<Vec<ResourceNode>>,
    /// Raw display text, used by content providers.
    pub response: Option<String>,
}

impl ExpansionResult {
    pub fn with_nodes(source: &str, nodes: Vec<ResourceNode>) -> Self {
        Self {
            source: source.to_owned(),
            nodes: Some(nodes),
            response: None,
        }
    }

    pub fn with_response(source: &str, response: String) -> Self {
        Self {
            source: source.to_owned(),
            nodes: None,
            response: Some(response),
        }
    }

    pub fn empty(source: &str) -> Self {
        Self {
            source: source.to_owned(),
            ..Self::default()
        }
    }
}

// ── Request context ─────────────────────────────────────────────────

/// Per-request context handed to every expander invocation.
#[derive(Debug, Clone)]
pub struct ExpandContext {
    request_id: u64,
    cancel: CancellationToken,
}

impl ExpandContext {
    pub fn new(request_id: u64, cancel: CancellationToken) -> Self {
        Self { request_id, cancel }
    }

    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Context for one expander: same request, cancelled with its parent.
    pub fn child(&self) -> Self {
        Self {
            request_id: self.request_id,
            cancel: self.cancel.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run `fut` unless the context is cancelled first.
    pub async fn guard<F, T>(&self, fut: F) -> Result<T, ExpanderError>
    where
        F: Future<Output = Result<T, ExpanderError>>,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(ExpanderError::Cancelled),
            res = fut => res,
        }
    }
}

/// `GET` a path, abandoning the request if the context is cancelled.
pub(crate) async fn fetch_guarded(
    ctx: &ExpandContext,
    fetcher: &dyn ResourceFetcher,
    path: &str,
) -> Result<String, ExpanderError> {
    ctx.guard(async { fetcher.fetch_json(path).await.map_err(ExpanderError::from) })
        .await
}

/// Decode a list body into `T`, mapping failures to an API error.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ExpanderError> {
    Ok(azbrowse_api::decode(body)?)
}
