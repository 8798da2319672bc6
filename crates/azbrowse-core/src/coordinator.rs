// ── Expansion coordinator ──
//
// One request runs in four phases:
//
//   predicates  → synchronous, registration order, first error aborts
//   fan-out     → one task per matching expander, each in its own span
//   fan-in      → one result per fired expander under a single deadline
//   content     → the default provider renders the node itself
//
// Nodes are merged in the order results arrive. Nothing here touches
// navigation state; the navigator commits or discards the outcome.
//
// A failure or an elapsed deadline abandons the request without cancelling
// the expanders still running: they finish on their own and their late
// sends hit a closed channel. Only the caller's token (supersede, shutdown)
// cancels them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};
use tracing::{Instrument, debug, debug_span, info, info_span, warn};

use crate::api_versions::ApiVersions;
use crate::config::EngineConfig;
use crate::error::{ExpandError, ExpanderError};
use crate::expander::{
    DefaultContent, ExpandContext, Expander, ExpanderRegistry, ExpansionResult,
};
use crate::fetch::ResourceFetcher;
use crate::model::ResourceNode;

/// Merged outcome of a successful expansion.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    /// Children from every fired expander, in receive order.
    pub nodes: Vec<ResourceNode>,
    /// Display text from the default content provider.
    pub content: String,
    /// Names of the expanders whose predicate matched.
    pub fired: Vec<&'static str>,
}

type Delivery = (&'static str, Result<ExpansionResult, ExpanderError>);

pub struct ExpansionCoordinator {
    registry: ExpanderRegistry,
    default_content: Arc<dyn Expander>,
    deadline: Duration,
}

impl ExpansionCoordinator {
    pub fn new(
        registry: ExpanderRegistry,
        default_content: Arc<dyn Expander>,
        deadline: Duration,
    ) -> Self {
        Self {
            registry,
            default_content,
            deadline,
        }
    }

    /// Coordinator over the built-in expanders, all sharing one fetcher
    /// and one api-version table.
    pub fn builtin(
        fetcher: Arc<dyn ResourceFetcher>,
        config: &EngineConfig,
        api_versions: &Arc<ApiVersions>,
    ) -> Self {
        Self::new(
            ExpanderRegistry::builtin(Arc::clone(&fetcher), api_versions),
            Arc::new(DefaultContent::new(fetcher)),
            config.expand_timeout,
        )
    }

    pub fn registry(&self) -> &ExpanderRegistry {
        &self.registry
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Resolve `node`'s children and display content.
    pub async fn expand(
        &self,
        ctx: &ExpandContext,
        node: &ResourceNode,
    ) -> Result<Expansion, ExpandError> {
        let span = info_span!(
            "expand",
            request = ctx.request_id(),
            node = %node.id,
            item_type = %node.item_type,
        );
        self.run(ctx, node).instrument(span).await
    }

    async fn run(&self, ctx: &ExpandContext, node: &ResourceNode) -> Result<Expansion, ExpandError> {
        // ── Predicates ──
        let mut matched: Vec<Arc<dyn Expander>> = Vec::new();
        for expander in self.registry.iter() {
            match expander.matches(node) {
                Ok(true) => matched.push(Arc::clone(expander)),
                Ok(false) => {}
                Err(source) => {
                    warn!(expander = expander.name(), error = %source, "predicate failed");
                    return Err(ExpandError::PredicateFailed {
                        expander: expander.name().to_owned(),
                        source,
                    });
                }
            }
        }
        let fired: Vec<&'static str> = matched.iter().map(|e| e.name()).collect();
        let total = fired.len();
        debug!(?fired, "expanders matched");

        // ── Fan-out ──
        let (tx, mut rx) = mpsc::channel::<Delivery>(total.max(1));
        for expander in matched {
            let tx = tx.clone();
            let child = ctx.child();
            let target = node.clone();
            let span = debug_span!("subexpand", expander = expander.name());
            tokio::spawn(
                async move {
                    let result = expander.expand(&child, &target).await;
                    // The receiver is gone once the request has been given up on.
                    let _ = tx.send((expander.name(), result)).await;
                }
                .instrument(span),
            );
        }
        drop(tx);

        // ── Fan-in ──
        let deadline = Instant::now() + self.deadline;
        let mut pending = fired.clone();
        let mut nodes = Vec::new();
        while !pending.is_empty() {
            match timeout_at(deadline, rx.recv()).await {
                Ok(Some((name, Ok(result)))) => {
                    if let Some(pos) = pending.iter().position(|p| *p == name) {
                        pending.remove(pos);
                    }
                    let found = result.nodes.unwrap_or_default();
                    debug!(expander = name, count = found.len(), "expander finished");
                    nodes.extend(found);
                }
                Ok(Some((name, Err(source)))) => {
                    warn!(expander = name, error = %source, "expander failed");
                    return Err(ExpandError::ProduceFailed {
                        expander: name.to_owned(),
                        source,
                    });
                }
                Ok(None) => {
                    return Err(ExpandError::ProduceFailed {
                        expander: pending.join(", "),
                        source: ExpanderError::Aborted,
                    });
                }
                Err(_) => {
                    let completed = total - pending.len();
                    warn!(completed, total, ?pending, "expansion deadline elapsed");
                    return Err(ExpandError::Timeout {
                        completed,
                        total,
                        elapsed_secs: self.deadline.as_secs(),
                    });
                }
            }
        }

        // ── Default content ──
        let content = self
            .default_content
            .expand(ctx, node)
            .await
            .map_err(|source| ExpandError::DefaultContentFailed { source })?
            .response
            .unwrap_or_default();

        info!(children = nodes.len(), "expansion complete");
        Ok(Expansion {
            nodes,
            content,
            fired,
        })
    }
}

impl std::fmt::Debug for ExpansionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpansionCoordinator")
            .field("registry", &self.registry)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, Ordering};

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::model::{ExpandReturnType, ItemType};
    use crate::testing::{FakeFetcher, Outcome, ScriptedExpander, node};

    const NODE_URL: &str = "/s/1?api-version=1";

    fn target() -> ResourceNode {
        node("/s/1", ItemType::Subscription).with_expand(NODE_URL, ExpandReturnType::ResourceGroup)
    }

    fn coordinator(registry: ExpanderRegistry) -> ExpansionCoordinator {
        let fetcher = FakeFetcher::new().get(NODE_URL, r#"{"id":"/s/1"}"#).shared();
        ExpansionCoordinator::new(
            registry,
            Arc::new(DefaultContent::new(fetcher)),
            Duration::from_secs(45),
        )
    }

    fn ctx() -> ExpandContext {
        ExpandContext::new(1, CancellationToken::new())
    }

    fn ids(nodes: &[ResourceNode]) -> BTreeSet<String> {
        nodes.iter().map(|n| n.id.clone()).collect()
    }

    #[tokio::test]
    async fn empty_registry_expands_to_content_only() {
        let c = coordinator(ExpanderRegistry::empty());
        let expansion = c.expand(&ctx(), &target()).await.unwrap();
        assert!(expansion.nodes.is_empty());
        assert!(expansion.fired.is_empty());
        assert!(expansion.content.contains("/s/1"));
    }

    #[tokio::test(start_paused = true)]
    async fn merge_is_independent_of_completion_order() {
        let a = vec![node("/s/1/a1", ItemType::Other), node("/s/1/a2", ItemType::Other)];
        let b = vec![node("/s/1/b1", ItemType::Other)];
        let c = vec![node("/s/1/c1", ItemType::Other)];

        let delays = [[1, 2, 3], [3, 2, 1], [2, 3, 1]];
        let mut merged = Vec::new();
        for [da, db, dc] in delays {
            let registry = ExpanderRegistry::empty()
                .with(
                    ScriptedExpander::new("a", Outcome::Nodes(a.clone()))
                        .delayed(Duration::from_millis(da)),
                )
                .with(
                    ScriptedExpander::new("b", Outcome::Nodes(b.clone()))
                        .delayed(Duration::from_millis(db)),
                )
                .with(
                    ScriptedExpander::new("c", Outcome::Nodes(c.clone()))
                        .delayed(Duration::from_millis(dc)),
                );
            let expansion = coordinator(registry).expand(&ctx(), &target()).await.unwrap();
            assert_eq!(expansion.nodes.len(), 4);
            merged.push(ids(&expansion.nodes));
        }

        assert!(merged.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn nodes_arrive_in_receive_order() {
        let registry = ExpanderRegistry::empty()
            .with(
                ScriptedExpander::new("slow", Outcome::Nodes(vec![node("/slow", ItemType::Other)]))
                    .delayed(Duration::from_secs(2)),
            )
            .with(
                ScriptedExpander::new("fast", Outcome::Nodes(vec![node("/fast", ItemType::Other)]))
                    .delayed(Duration::from_secs(1)),
            );

        let expansion = coordinator(registry).expand(&ctx(), &target()).await.unwrap();

        let order: Vec<&str> = expansion.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec!["/fast", "/slow"]);
        assert_eq!(expansion.fired, vec!["slow", "fast"]);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_reports_completed_count() {
        let registry = ExpanderRegistry::empty()
            .with(ScriptedExpander::new("one", Outcome::Nothing).delayed(Duration::from_secs(1)))
            .with(ScriptedExpander::new("two", Outcome::Nothing).delayed(Duration::from_secs(2)))
            .with(ScriptedExpander::new("hung", Outcome::Nothing).delayed(Duration::from_secs(600)));

        let err = coordinator(registry).expand(&ctx(), &target()).await.unwrap_err();

        assert!(matches!(
            err,
            ExpandError::Timeout {
                completed: 2,
                total: 3,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "expansion timed out after 45s: 2 of 3 expanders completed"
        );
    }

    #[tokio::test]
    async fn predicate_failure_stops_before_fan_out() {
        let registry = ExpanderRegistry::empty()
            .with(ScriptedExpander::new("fine", Outcome::Nothing))
            .with(ScriptedExpander::new("broken", Outcome::Nothing).broken_predicate());

        let err = coordinator(registry).expand(&ctx(), &target()).await.unwrap_err();

        assert!(matches!(err, ExpandError::PredicateFailed { ref expander, .. } if expander == "broken"));
    }

    #[tokio::test]
    async fn produce_failure_names_the_expander() {
        let registry = ExpanderRegistry::empty()
            .with(ScriptedExpander::new("flaky", Outcome::Fail));

        let err = coordinator(registry).expand(&ctx(), &target()).await.unwrap_err();

        assert!(matches!(err, ExpandError::ProduceFailed { ref expander, .. } if expander == "flaky"));
    }

    #[tokio::test]
    async fn non_matching_expanders_do_not_fire() {
        let registry = ExpanderRegistry::empty()
            .with(ScriptedExpander::new("groups", Outcome::Fail).only(ItemType::ResourceGroup))
            .with(
                ScriptedExpander::new("subs", Outcome::Nodes(vec![node("/x", ItemType::Other)]))
                    .only(ItemType::Subscription),
            );

        let expansion = coordinator(registry).expand(&ctx(), &target()).await.unwrap();

        assert_eq!(expansion.fired, vec!["subs"]);
        assert_eq!(expansion.nodes.len(), 1);
    }

    #[tokio::test]
    async fn content_failure_is_typed() {
        let c = ExpansionCoordinator::new(
            ExpanderRegistry::empty(),
            Arc::new(DefaultContent::new(FakeFetcher::new().shared())),
            Duration::from_secs(45),
        );

        let err = c.expand(&ctx(), &target()).await.unwrap_err();

        assert!(matches!(err, ExpandError::DefaultContentFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_expanders_run_to_completion() {
        let finished = Arc::new(AtomicBool::new(false));
        let registry = ExpanderRegistry::empty().with(
            ScriptedExpander::new("slow", Outcome::Nothing)
                .delayed(Duration::from_secs(60))
                .on_finish(Arc::clone(&finished)),
        );

        let err = coordinator(registry).expand(&ctx(), &target()).await.unwrap_err();
        assert!(matches!(err, ExpandError::Timeout { completed: 0, total: 1, .. }));
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_secs(120)).await;

        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_leaves_siblings_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let registry = ExpanderRegistry::empty()
            .with(ScriptedExpander::new("flaky", Outcome::Fail))
            .with(
                ScriptedExpander::new("sibling", Outcome::Nothing)
                    .delayed(Duration::from_secs(5))
                    .on_finish(Arc::clone(&finished)),
            );

        let err = coordinator(registry).expand(&ctx(), &target()).await.unwrap_err();
        assert!(matches!(err, ExpandError::ProduceFailed { ref expander, .. } if expander == "flaky"));

        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn caller_cancel_still_stops_expanders() {
        let finished = Arc::new(AtomicBool::new(false));
        let registry = ExpanderRegistry::empty().with(
            ScriptedExpander::new("slow", Outcome::Nothing)
                .delayed(Duration::from_secs(60))
                .on_finish(Arc::clone(&finished)),
        );
        let token = CancellationToken::new();
        let ctx = ExpandContext::new(1, token.clone());
        let c = coordinator(registry);

        let target = target();
        let expansion = c.expand(&ctx, &target);
        tokio::pin!(expansion);
        tokio::select! {
            _ = &mut expansion => panic!("expansion finished before cancel"),
            () = tokio::time::sleep(Duration::from_secs(1)) => token.cancel(),
        }
        let err = expansion.await.unwrap_err();
        assert!(matches!(err, ExpandError::ProduceFailed { .. }));

        tokio::time::sleep(Duration::from_secs(120)).await;

        assert!(!finished.load(Ordering::SeqCst));
    }
}
