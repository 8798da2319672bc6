use std::sync::Arc;

use async_trait::async_trait;
use azbrowse_api::{ListResponse, Operation};
use tracing::debug;

use super::{
    ExpandContext, Expander, ExpansionResult, META_RESOURCE_TYPE, decode_body, fetch_guarded,
};
use crate::api_versions::ApiVersions;
use crate::error::ExpanderError;
use crate::fetch::ResourceFetcher;
use crate::model::{ExpandReturnType, ItemType, ResourceNode};

const OPERATIONS_API_VERSION: &str = "2018-01-01";

/// Metadata key holding an action's provider description.
pub const META_DESCRIPTION: &str = "description";

/// Lists the POST actions a resource's provider exposes for its type.
///
/// Expanding one of the produced nodes invokes the action.
pub struct ActionsExpander {
    fetcher: Arc<dyn ResourceFetcher>,
    api_versions: Arc<ApiVersions>,
}

impl ActionsExpander {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, api_versions: Arc<ApiVersions>) -> Self {
        Self {
            fetcher,
            api_versions,
        }
    }
}

/// Extract `restart` from `Microsoft.Web/sites/restart/action` for
/// resource type `Microsoft.Web/sites`. Nested actions are skipped.
fn action_name<'a>(operation: &'a str, resource_type: &str) -> Option<&'a str> {
    let head = operation.get(..resource_type.len())?;
    if !head.eq_ignore_ascii_case(resource_type) {
        return None;
    }
    let action = operation[resource_type.len()..]
        .strip_prefix('/')?
        .strip_suffix("/action")?;
    (!action.is_empty() && !action.contains('/')).then_some(action)
}

fn resource_type(node: &ResourceNode) -> Result<&str, ExpanderError> {
    node.meta(META_RESOURCE_TYPE)
        .ok_or_else(|| ExpanderError::MissingMetadata {
            id: node.id.clone(),
            key: META_RESOURCE_TYPE,
        })
}

#[async_trait]
impl Expander for ActionsExpander {
    fn name(&self) -> &'static str {
        "actions"
    }

    fn matches(&self, node: &ResourceNode) -> Result<bool, ExpanderError> {
        if node.item_type != ItemType::Resource {
            return Ok(false);
        }
        resource_type(node).map(|_| true)
    }

    async fn expand(
        &self,
        ctx: &ExpandContext,
        node: &ResourceNode,
    ) -> Result<ExpansionResult, ExpanderError> {
        let rtype = resource_type(node)?;
        let namespace = rtype.split_once('/').map_or(rtype, |(ns, _)| ns);
        let path = format!("/providers/{namespace}/operations?api-version={OPERATIONS_API_VERSION}");

        let body = fetch_guarded(ctx, self.fetcher.as_ref(), &path).await?;
        let list: ListResponse<Operation> = decode_body(&body)?;
        let api_version = self.api_versions.resolve(rtype);

        let nodes: Vec<ResourceNode> = list
            .value
            .iter()
            .filter_map(|op| {
                let action = action_name(&op.name, rtype)?;
                let display = op.display.as_ref();
                let label = display
                    .and_then(|d| d.operation.clone())
                    .unwrap_or_else(|| action.to_owned());
                let mut child = ResourceNode::new(
                    format!("{}/{action}", node.id),
                    action,
                    ItemType::Action,
                )
                .with_display(label)
                .with_expand(
                    format!("{}/{action}?api-version={api_version}", node.id),
                    ExpandReturnType::Action,
                )
                .with_subscription(node.subscription_id.clone());
                if let Some(desc) = display.and_then(|d| d.description.clone()) {
                    child = child.with_metadata(META_DESCRIPTION, desc);
                }
                Some(child)
            })
            .collect();

        debug!(resource = %node.id, count = nodes.len(), "actions listed");
        Ok(ExpansionResult::with_nodes(self.name(), nodes))
    }
}
