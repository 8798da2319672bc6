// ── Auto-navigation ──
//
// Walks the tree towards a target id given at startup. Each time the
// displayed list changes, the automaton picks the first node whose id is a
// path prefix of the target and asks the UI to select and expand it. It
// stops for good when nothing matches, when the target has been reached,
// or when the expanded node is not the one it asked for (the user took
// over).

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::bus::Subscription;
use crate::model::NavigationEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoNavState {
    Active,
    Stopped,
}

/// Request sent to the UI task, which owns all navigation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationCommand {
    SelectAndExpand { index: usize, node_id: String },
}

/// Whether `candidate` is `target` or one of its ancestors.
///
/// `/a/b` is a prefix of `/a/b/c` but `/a/b` is not a prefix of `/a/bc`.
/// Comparison is case-sensitive.
pub fn is_path_prefix(target: &str, candidate: &str) -> bool {
    if candidate.is_empty() {
        return false;
    }
    target
        .strip_prefix(candidate)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[derive(Debug)]
pub struct AutoNavigator {
    target: String,
    state: AutoNavState,
    last_matched: Option<String>,
}

impl AutoNavigator {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            state: AutoNavState::Active,
            last_matched: None,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn state(&self) -> AutoNavState {
        self.state
    }

    pub fn last_matched(&self) -> Option<&str> {
        self.last_matched.as_deref()
    }

    fn stop(&mut self, reason: &str) {
        info!(target_id = %self.target, reason, "auto-navigation stopped");
        self.state = AutoNavState::Stopped;
    }

    /// Advance on one navigation event.
    pub fn on_navigated(&mut self, event: &NavigationEvent) -> Option<NavigationCommand> {
        if self.state == AutoNavState::Stopped {
            return None;
        }

        if let Some(last) = &self.last_matched {
            let expanded = event.expanded.as_ref().map(|n| n.id.as_str());
            if expanded != Some(last.as_str()) {
                self.stop("navigation diverged");
                return None;
            }
        }

        let hit = event
            .nodes
            .iter()
            .enumerate()
            .find(|(_, node)| is_path_prefix(&self.target, &node.id));

        match hit {
            Some((index, node)) => {
                debug!(index, node = %node.id, "auto-navigation step");
                self.last_matched = Some(node.id.clone());
                Some(NavigationCommand::SelectAndExpand {
                    index,
                    node_id: node.id.clone(),
                })
            }
            None => {
                self.stop("no matching node");
                None
            }
        }
    }

    /// Drive the automaton from `subscription` until it stops, the bus goes
    /// away, or the command receiver is dropped.
    pub async fn run(
        mut self,
        mut subscription: Subscription<NavigationEvent>,
        commands: mpsc::UnboundedSender<NavigationCommand>,
    ) -> AutoNavState {
        while let Some(event) = subscription.recv().await {
            if let Some(cmd) = self.on_navigated(&event) {
                if commands.send(cmd).is_err() {
                    break;
                }
            }
            if self.state == AutoNavState::Stopped {
                break;
            }
        }
        self.state
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bus::{EventBus, LIST_NAVIGATED};
    use crate::model::ItemType;
    use crate::testing::node;

    const TARGET: &str = "/subscriptions/1/resourceGroups/web/providers/Microsoft.Web/sites/app";

    fn event(ids: &[&str], expanded: Option<&str>) -> NavigationEvent {
        NavigationEvent {
            nodes: Arc::new(ids.iter().map(|id| node(id, ItemType::Other)).collect()),
            expanded: expanded.map(|id| node(id, ItemType::Other)),
        }
    }

    #[test]
    fn prefix_requires_segment_boundary() {
        assert!(is_path_prefix("/foo/bar", "/foo"));
        assert!(is_path_prefix("/foo/bar", "/foo/bar"));
        assert!(!is_path_prefix("/foo/ba", "/foo/bar"));
        assert!(!is_path_prefix("/foo/bar", "/foo/ba"));
        assert!(!is_path_prefix("/foo/bar", ""));
        assert!(!is_path_prefix("/Foo/bar", "/foo"));
    }

    #[test]
    fn walks_towards_target() {
        let mut nav = AutoNavigator::new(TARGET);

        let cmd = nav.on_navigated(&event(&["/subscriptions/0", "/subscriptions/1"], None));
        assert_eq!(
            cmd,
            Some(NavigationCommand::SelectAndExpand {
                index: 1,
                node_id: "/subscriptions/1".into()
            })
        );

        let cmd = nav.on_navigated(&event(
            &["/subscriptions/1/resourceGroups/api", "/subscriptions/1/resourceGroups/web"],
            Some("/subscriptions/1"),
        ));
        assert!(matches!(cmd, Some(NavigationCommand::SelectAndExpand { index: 1, .. })));
        assert_eq!(nav.last_matched(), Some("/subscriptions/1/resourceGroups/web"));
        assert_eq!(nav.state(), AutoNavState::Active);
    }

    #[test]
    fn no_match_stops() {
        let mut nav = AutoNavigator::new(TARGET);
        assert!(nav.on_navigated(&event(&["/subscriptions/2"], None)).is_none());
        assert_eq!(nav.state(), AutoNavState::Stopped);
        assert!(nav.on_navigated(&event(&["/subscriptions/1"], None)).is_none());
    }

    #[test]
    fn divergence_stops_permanently() {
        let mut nav = AutoNavigator::new(TARGET);
        nav.on_navigated(&event(&["/subscriptions/1"], None)).unwrap();

        // The user expanded something else before our command landed.
        let diverged = event(&["/subscriptions/1/resourceGroups/web"], Some("/subscriptions/9"));
        assert!(nav.on_navigated(&diverged).is_none());
        assert_eq!(nav.state(), AutoNavState::Stopped);

        let would_match = event(&["/subscriptions/1/resourceGroups/web"], Some("/subscriptions/1"));
        assert!(nav.on_navigated(&would_match).is_none());
    }

    #[test]
    fn stops_after_reaching_target() {
        let mut nav = AutoNavigator::new("/subscriptions/1");
        nav.on_navigated(&event(&["/subscriptions/1"], None)).unwrap();
        let children = event(&["/subscriptions/1/resourceGroups/web"], Some("/subscriptions/1"));
        assert!(nav.on_navigated(&children).is_none());
        assert_eq!(nav.state(), AutoNavState::Stopped);
    }

    #[tokio::test]
    async fn run_forwards_commands_and_exits_when_stopped() {
        let bus = EventBus::<NavigationEvent>::new(4);
        let sub = bus.subscribe(LIST_NAVIGATED);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(AutoNavigator::new(TARGET).run(sub, tx));

        bus.publish(LIST_NAVIGATED, event(&["/subscriptions/1"], None)).await;
        let cmd = rx.recv().await.unwrap();
        assert_eq!(
            cmd,
            NavigationCommand::SelectAndExpand {
                index: 0,
                node_id: "/subscriptions/1".into()
            }
        );

        bus.publish(LIST_NAVIGATED, event(&["/other"], Some("/subscriptions/1"))).await;
        assert_eq!(handle.await.unwrap(), AutoNavState::Stopped);
        assert!(rx.recv().await.is_none());
    }
}
