// ── Navigator ──
//
// Owns everything the UI draws: the displayed list, its selection, the
// content text, the breadcrumb title and the page history. Only the task
// that owns the navigator mutates it. Expansions are split into three
// steps so that task never waits on the network:
//
//   begin_expansion   → allocates a request id, returns a PendingExpansion
//   run_expansion     → 'static future, spawn it anywhere
//   finish_expansion  → commits the outcome if its id is still current
//
// A newer request (or going back) supersedes the in-flight one; its
// outcome is discarded on arrival.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bus::{EventBus, LIST_NAVIGATED};
use crate::coordinator::{Expansion, ExpansionCoordinator};
use crate::error::ExpandError;
use crate::expander::ExpandContext;
use crate::model::{NavigationEvent, Page, ResourceNode};
use crate::stack::NavStack;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionKind {
    /// Drill into the selected node.
    Expand,
    /// Re-run the currently expanded node in place.
    Refresh,
}

/// An expansion that has been started but not yet committed.
#[derive(Debug, Clone)]
pub struct PendingExpansion {
    pub request_id: u64,
    pub node: ResourceNode,
    pub kind: ExpansionKind,
    ctx: ExpandContext,
}

/// A finished expansion, ready to hand back to [`Navigator::finish_expansion`].
#[derive(Debug)]
pub struct ExpansionOutcome {
    pub pending: PendingExpansion,
    pub result: Result<Expansion, ExpandError>,
}

/// What committing an outcome did to the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The list was replaced with this many children.
    Navigated { children: usize },
    /// No children were found; content and history moved, the list stayed.
    Unchanged,
    /// Leaf node: only the content changed.
    ContentOnly,
    /// Superseded by a later request or a back-navigation.
    Stale,
    /// There was nothing to expand.
    NoSelection,
}

pub struct Navigator {
    coordinator: Arc<ExpansionCoordinator>,
    bus: Arc<EventBus<NavigationEvent>>,
    nodes: Arc<Vec<ResourceNode>>,
    content: String,
    title: String,
    selected: usize,
    expanded: Option<ResourceNode>,
    stack: NavStack,
    next_request: u64,
    in_flight: Option<ExpandContext>,
    cancel: CancellationToken,
}

impl Navigator {
    pub fn new(
        coordinator: Arc<ExpansionCoordinator>,
        bus: Arc<EventBus<NavigationEvent>>,
    ) -> Self {
        Self {
            coordinator,
            bus,
            nodes: Arc::new(Vec::new()),
            content: String::new(),
            title: String::new(),
            selected: 0,
            expanded: None,
            stack: NavStack::new(),
            next_request: 0,
            in_flight: None,
            cancel: CancellationToken::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_node(&self) -> Option<&ResourceNode> {
        self.nodes.get(self.selected)
    }

    pub fn expanded(&self) -> Option<&ResourceNode> {
        self.expanded.as_ref()
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Whether an expansion has been started and not yet committed.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn bus(&self) -> &Arc<EventBus<NavigationEvent>> {
        &self.bus
    }

    pub fn coordinator(&self) -> &Arc<ExpansionCoordinator> {
        &self.coordinator
    }

    /// Snapshot of what is currently displayed.
    pub fn view(&self) -> Page {
        Page {
            nodes: Arc::clone(&self.nodes),
            content: self.content.clone(),
            title: self.title.clone(),
            selected: self.selected,
            expanded: self.expanded.clone(),
        }
    }

    // ── Root ─────────────────────────────────────────────────────────

    /// Replace everything with a fresh root list and announce it.
    pub async fn set_root(&mut self, nodes: Vec<ResourceNode>, content: String, title: String) {
        self.supersede();
        self.stack.clear();
        self.nodes = Arc::new(nodes);
        self.content = content;
        self.title = title;
        self.selected = 0;
        self.expanded = None;
        self.publish().await;
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Select `index`; out-of-range indices are ignored.
    pub fn change_selection(&mut self, index: usize) {
        if index < self.nodes.len() {
            self.selected = index;
        }
    }

    /// Move the selection by `delta`, clamped to the list.
    pub fn move_selection(&mut self, delta: isize) {
        if self.nodes.is_empty() {
            return;
        }
        let last = self.nodes.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    /// Select the node with `node_id`, preferring the one at `index`.
    pub fn select_by_id(&mut self, index: usize, node_id: &str) -> bool {
        if self.nodes.get(index).is_some_and(|n| n.id == node_id) {
            self.selected = index;
            return true;
        }
        match self.nodes.iter().position(|n| n.id == node_id) {
            Some(pos) => {
                self.selected = pos;
                true
            }
            None => false,
        }
    }

    // ── Expansion ────────────────────────────────────────────────────

    /// Start expanding the selected node.
    pub fn begin_expansion(&mut self) -> Option<PendingExpansion> {
        let node = self.selected_node()?.clone();
        Some(self.begin(node, ExpansionKind::Expand))
    }

    /// Start re-expanding the current node; `None` at the root.
    pub fn begin_refresh(&mut self) -> Option<PendingExpansion> {
        let node = self.expanded.clone()?;
        Some(self.begin(node, ExpansionKind::Refresh))
    }

    fn begin(&mut self, node: ResourceNode, kind: ExpansionKind) -> PendingExpansion {
        self.supersede();
        self.next_request += 1;
        let ctx = ExpandContext::new(self.next_request, self.cancel.child_token());
        self.in_flight = Some(ctx.clone());
        debug!(request = self.next_request, node = %node.id, ?kind, "expansion started");
        PendingExpansion {
            request_id: self.next_request,
            node,
            kind,
            ctx,
        }
    }

    fn supersede(&mut self) {
        if let Some(prev) = self.in_flight.take() {
            debug!(request = prev.request_id(), "superseding in-flight expansion");
            prev.cancel();
        }
    }

    /// Run the coordinator for `pending`. The future owns everything it
    /// needs, so it can be spawned while the navigator keeps serving the UI.
    pub fn run_expansion(
        &self,
        pending: PendingExpansion,
    ) -> impl Future<Output = ExpansionOutcome> + Send + 'static {
        let coordinator = Arc::clone(&self.coordinator);
        async move {
            let result = coordinator.expand(&pending.ctx, &pending.node).await;
            ExpansionOutcome { pending, result }
        }
    }

    /// Commit a finished expansion.
    ///
    /// Outcomes of superseded requests are dropped as `Applied::Stale`.
    /// Errors leave the navigator exactly as it was.
    pub async fn finish_expansion(
        &mut self,
        outcome: ExpansionOutcome,
    ) -> Result<Applied, ExpandError> {
        let ExpansionOutcome { pending, result } = outcome;
        let current = self.in_flight.as_ref().map(ExpandContext::request_id);
        if current != Some(pending.request_id) {
            debug!(request = pending.request_id, ?current, "discarding stale expansion");
            return Ok(Applied::Stale);
        }
        self.in_flight = None;

        let expansion = result.inspect_err(|e| {
            warn!(request = pending.request_id, node = %pending.node.id, error = %e, "expansion failed");
        })?;

        if pending.node.is_leaf() {
            self.content = expansion.content;
            return Ok(Applied::ContentOnly);
        }

        if pending.kind == ExpansionKind::Expand {
            self.stack.push(self.view());
            self.title = format!("{}>{}", self.title, pending.node.name);
        }
        self.content = expansion.content;
        self.expanded = Some(pending.node);

        let children = expansion.nodes.len();
        if children == 0 {
            return Ok(Applied::Unchanged);
        }
        self.nodes = Arc::new(expansion.nodes);
        self.selected = 0;
        info!(children, depth = self.stack.depth(), "list navigated");
        self.publish().await;
        Ok(Applied::Navigated { children })
    }

    /// Begin, run and commit an expansion of the selected node in one go.
    pub async fn expand_current_selection(&mut self) -> Result<Applied, ExpandError> {
        let Some(pending) = self.begin_expansion() else {
            return Ok(Applied::NoSelection);
        };
        let outcome = self.run_expansion(pending).await;
        self.finish_expansion(outcome).await
    }

    /// Restore the previous page. `false` (and no change) at the root.
    pub fn go_back(&mut self) -> bool {
        let Some(page) = self.stack.pop() else {
            return false;
        };
        self.supersede();
        self.nodes = page.nodes;
        self.content = page.content;
        self.title = page.title;
        self.selected = page.selected;
        self.expanded = page.expanded;
        true
    }

    /// Cancel any in-flight expansion work.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    async fn publish(&self) {
        let event = NavigationEvent {
            nodes: Arc::clone(&self.nodes),
            expanded: self.expanded.clone(),
        };
        self.bus.publish(LIST_NAVIGATED, event).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::expander::{DefaultContent, ExpanderRegistry};
    use crate::model::{ExpandReturnType, ItemType};
    use crate::testing::{FakeFetcher, Outcome, ScriptedExpander, node};

    fn navigator(registry: ExpanderRegistry) -> Navigator {
        let fetcher = FakeFetcher::new()
            .get("/a?x", r#"{"id":"/a"}"#)
            .get("/b?x", r#"{"id":"/b"}"#)
            .get("/leaf?x", r#"{"id":"/leaf"}"#)
            .shared();
        let coordinator = ExpansionCoordinator::new(
            registry,
            Arc::new(DefaultContent::new(fetcher)),
            Duration::from_secs(45),
        );
        Navigator::new(Arc::new(coordinator), Arc::new(EventBus::new(8)))
    }

    fn branch(id: &str) -> ResourceNode {
        node(id, ItemType::Subscription)
            .with_expand(format!("{id}?x"), ExpandReturnType::ResourceGroup)
    }

    fn children() -> ExpanderRegistry {
        ExpanderRegistry::empty().with(ScriptedExpander::new(
            "kids",
            Outcome::Nodes(vec![node("/a/1", ItemType::Other), node("/a/2", ItemType::Other)]),
        ))
    }

    #[tokio::test]
    async fn expand_pushes_and_extends_title() {
        let mut nav = navigator(children());
        nav.set_root(vec![branch("/a"), branch("/b")], "root".into(), "Subs".into())
            .await;

        let applied = nav.expand_current_selection().await.unwrap();

        assert_eq!(applied, Applied::Navigated { children: 2 });
        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.title(), "Subs>a");
        assert_eq!(nav.selected(), 0);
        assert_eq!(nav.nodes()[0].id, "/a/1");
        assert!(nav.content().contains("\"/a\""));
        assert_eq!(nav.expanded().unwrap().id, "/a");
    }

    #[tokio::test]
    async fn go_back_restores_previous_page() {
        let mut nav = navigator(children());
        nav.set_root(vec![branch("/a"), branch("/b")], "root".into(), "Subs".into())
            .await;
        nav.change_selection(1);
        nav.expand_current_selection().await.unwrap();

        assert!(nav.go_back());
        assert_eq!(nav.depth(), 0);
        assert_eq!(nav.title(), "Subs");
        assert_eq!(nav.content(), "root");
        assert_eq!(nav.selected(), 1);
        assert!(nav.expanded().is_none());

        assert!(!nav.go_back());
        assert_eq!(nav.content(), "root");
    }

    #[tokio::test]
    async fn stale_outcome_is_discarded() {
        let mut nav = navigator(children());
        nav.set_root(vec![branch("/a"), branch("/b")], "root".into(), "Subs".into())
            .await;

        let first = nav.begin_expansion().unwrap();
        nav.change_selection(1);
        let second = nav.begin_expansion().unwrap();
        assert!(second.request_id > first.request_id);

        let late = nav.run_expansion(first).await;
        assert_eq!(nav.finish_expansion(late).await.unwrap(), Applied::Stale);
        assert_eq!(nav.depth(), 0);

        let current = nav.run_expansion(second).await;
        nav.finish_expansion(current).await.unwrap();
        assert_eq!(nav.title(), "Subs>b");
    }

    #[tokio::test]
    async fn leaf_updates_content_only() {
        let mut nav = navigator(children());
        let leaf = node("/leaf", ItemType::Deployment).with_expand("/leaf?x", ExpandReturnType::None);
        nav.set_root(vec![branch("/a"), leaf], "root".into(), "Subs".into())
            .await;
        nav.change_selection(1);

        let applied = nav.expand_current_selection().await.unwrap();

        assert_eq!(applied, Applied::ContentOnly);
        assert_eq!(nav.depth(), 0);
        assert_eq!(nav.title(), "Subs");
        assert_eq!(nav.selected(), 1);
        assert!(nav.content().contains("/leaf"));
    }

    #[tokio::test]
    async fn refresh_does_not_push() {
        let mut nav = navigator(children());
        nav.set_root(vec![branch("/a")], "root".into(), "Subs".into()).await;
        assert!(nav.begin_refresh().is_none());

        nav.expand_current_selection().await.unwrap();
        let pending = nav.begin_refresh().unwrap();
        assert_eq!(pending.kind, ExpansionKind::Refresh);
        let outcome = nav.run_expansion(pending).await;
        nav.finish_expansion(outcome).await.unwrap();

        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.title(), "Subs>a");
    }

    #[tokio::test]
    async fn publishes_on_list_change_only() {
        let mut nav = navigator(ExpanderRegistry::empty());
        let mut sub = nav.bus().subscribe(LIST_NAVIGATED);

        nav.set_root(vec![branch("/a")], "root".into(), "Subs".into()).await;
        let root_event = sub.try_recv().unwrap();
        assert!(root_event.expanded.is_none());
        assert_eq!(root_event.nodes.len(), 1);

        let applied = nav.expand_current_selection().await.unwrap();
        assert_eq!(applied, Applied::Unchanged);
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn selection_is_bounded() {
        let mut nav = navigator(ExpanderRegistry::empty());
        nav.nodes = Arc::new(vec![branch("/a"), branch("/b")]);

        nav.change_selection(5);
        assert_eq!(nav.selected(), 0);
        nav.move_selection(10);
        assert_eq!(nav.selected(), 1);
        nav.move_selection(-10);
        assert_eq!(nav.selected(), 0);
        assert!(nav.select_by_id(0, "/b"));
        assert_eq!(nav.selected(), 1);
        assert!(!nav.select_by_id(0, "/zzz"));
    }
}
