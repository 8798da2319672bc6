// In-memory fakes shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExpanderError;
use crate::expander::{ExpandContext, Expander, ExpansionResult};
use crate::fetch::ResourceFetcher;
use crate::model::{ItemType, ResourceNode};

// ── Fetcher ─────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct FakeFetcher {
    gets: HashMap<String, String>,
    posts: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(mut self, path: &str, body: &str) -> Self {
        self.gets.insert(path.to_owned(), body.to_owned());
        self
    }

    pub(crate) fn post(mut self, path: &str, body: &str) -> Self {
        self.posts.insert(path.to_owned(), body.to_owned());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl ResourceFetcher for FakeFetcher {
    async fn fetch_json(&self, path: &str) -> Result<String, azbrowse_api::Error> {
        self.calls.lock().unwrap().push(format!("GET {path}"));
        self.gets
            .get(path)
            .cloned()
            .ok_or_else(|| azbrowse_api::Error::NotFound {
                path: path.to_owned(),
            })
    }

    async fn post_json(&self, path: &str) -> Result<String, azbrowse_api::Error> {
        self.calls.lock().unwrap().push(format!("POST {path}"));
        self.posts
            .get(path)
            .cloned()
            .ok_or_else(|| azbrowse_api::Error::NotFound {
                path: path.to_owned(),
            })
    }
}

// ── Expander ────────────────────────────────────────────────────────

#[derive(Clone)]
pub(crate) enum Outcome {
    Nodes(Vec<ResourceNode>),
    Nothing,
    Fail,
}

/// Expander with scripted behaviour and an optional delay.
#[derive(Clone)]
pub(crate) struct ScriptedExpander {
    pub name: &'static str,
    pub applies_to: Option<ItemType>,
    pub predicate_fails: bool,
    pub delay: Duration,
    pub outcome: Outcome,
    /// Set once the scripted body has run to its end.
    pub finished: Option<Arc<AtomicBool>>,
}

impl ScriptedExpander {
    pub(crate) fn new(name: &'static str, outcome: Outcome) -> Self {
        Self {
            name,
            applies_to: None,
            predicate_fails: false,
            delay: Duration::ZERO,
            outcome,
            finished: None,
        }
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn only(mut self, item_type: ItemType) -> Self {
        self.applies_to = Some(item_type);
        self
    }

    pub(crate) fn on_finish(mut self, flag: Arc<AtomicBool>) -> Self {
        self.finished = Some(flag);
        self
    }

    pub(crate) fn broken_predicate(mut self) -> Self {
        self.predicate_fails = true;
        self
    }
}

#[async_trait]
impl Expander for ScriptedExpander {
    fn name(&self) -> &'static str {
        self.name
    }

    fn matches(&self, node: &ResourceNode) -> Result<bool, ExpanderError> {
        if self.predicate_fails {
            return Err(ExpanderError::MissingMetadata {
                id: node.id.clone(),
                key: "scripted",
            });
        }
        Ok(self.applies_to.is_none_or(|t| t == node.item_type))
    }

    async fn expand(
        &self,
        ctx: &ExpandContext,
        _node: &ResourceNode,
    ) -> Result<ExpansionResult, ExpanderError> {
        ctx.guard(async {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if let Some(flag) = &self.finished {
                flag.store(true, Ordering::SeqCst);
            }
            match &self.outcome {
                Outcome::Nodes(nodes) => Ok(ExpansionResult::with_nodes(self.name, nodes.clone())),
                Outcome::Nothing => Ok(ExpansionResult::empty(self.name)),
                Outcome::Fail => Err(ExpanderError::Api(azbrowse_api::Error::NotFound {
                    path: format!("/{}", self.name),
                })),
            }
        })
        .await
    }
}

pub(crate) fn node(id: &str, item_type: ItemType) -> ResourceNode {
    let name = id.rsplit('/').next().unwrap_or(id);
    ResourceNode::new(id, name, item_type)
}
