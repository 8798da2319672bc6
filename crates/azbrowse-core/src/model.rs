// ── Tree model ──
//
// Nodes are immutable once created. Pages and events hold clones, never
// references into the navigator's live state.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Kind of cloud entity a node represents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ItemType {
    Subscription,
    ResourceGroup,
    Resource,
    Deployment,
    Action,
    #[default]
    Other,
}

/// What expanding a node yields.
///
/// `None` and `Action` are leaves: expanding them refreshes the content
/// panel but never replaces the displayed list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExpandReturnType {
    #[default]
    None,
    Action,
    ResourceGroup,
    Resource,
    SubResource,
}

impl ExpandReturnType {
    pub fn is_leaf(self) -> bool {
        matches!(self, Self::None | Self::Action)
    }
}

/// One entry in the browsable tree.
///
/// Identity is the hierarchical `id` path: two nodes are equal when their
/// ids are equal, whatever their other fields say.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Hierarchical path, e.g. `/subscriptions/1/resourceGroups/rg`.
    pub id: String,
    pub name: String,
    pub display: String,
    pub item_type: ItemType,
    /// Path (with query) used to fetch this node and its children.
    pub expand_url: String,
    pub expand_return_type: ExpandReturnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    /// Expander-specific state, e.g. the resource type for action lookup.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl PartialEq for ResourceNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ResourceNode {}

impl ResourceNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, item_type: ItemType) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            display: name.clone(),
            name,
            item_type,
            ..Self::default()
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    pub fn with_expand(mut self, url: impl Into<String>, returns: ExpandReturnType) -> Self {
        self.expand_url = url.into();
        self.expand_return_type = returns;
        self
    }

    pub fn with_subscription(mut self, subscription_id: Option<String>) -> Self {
        self.subscription_id = subscription_id;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn is_leaf(&self) -> bool {
        self.expand_return_type.is_leaf()
    }
}

/// Snapshot of the navigator taken just before a committed expansion.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub nodes: Arc<Vec<ResourceNode>>,
    pub content: String,
    pub title: String,
    pub selected: usize,
    /// Node whose expansion produced `nodes`; `None` at the root.
    pub expanded: Option<ResourceNode>,
}

/// Payload published on [`crate::LIST_NAVIGATED`].
#[derive(Debug, Clone)]
pub struct NavigationEvent {
    /// The newly displayed list, in display order.
    pub nodes: Arc<Vec<ResourceNode>>,
    /// The node whose expansion produced `nodes`; `None` for the root list.
    pub expanded: Option<ResourceNode>,
}
