use std::sync::Arc;

use async_trait::async_trait;
use azbrowse_api::{ListResponse, ResourceGroup};
use tracing::debug;

use super::{
    ExpandContext, Expander, ExpansionResult, META_LOCATION, decode_body, fetch_guarded,
};
use crate::error::ExpanderError;
use crate::fetch::ResourceFetcher;
use crate::model::{ExpandReturnType, ItemType, ResourceNode};

const RESOURCES_API_VERSION: &str = "2017-05-10";

/// Lists the resource groups of a subscription.
pub struct ResourceGroupsExpander {
    fetcher: Arc<dyn ResourceFetcher>,
}

impl ResourceGroupsExpander {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Expander for ResourceGroupsExpander {
    fn name(&self) -> &'static str {
        "resource-groups"
    }

    fn matches(&self, node: &ResourceNode) -> Result<bool, ExpanderError> {
        Ok(node.item_type == ItemType::Subscription)
    }

    async fn expand(
        &self,
        ctx: &ExpandContext,
        node: &ResourceNode,
    ) -> Result<ExpansionResult, ExpanderError> {
        let body = fetch_guarded(ctx, self.fetcher.as_ref(), &node.expand_url).await?;
        let list: ListResponse<ResourceGroup> = decode_body(&body)?;
        debug!(subscription = %node.id, count = list.value.len(), "resource groups listed");

        let nodes = list
            .value
            .into_iter()
            .map(|rg| {
                let expand_url = format!("{}/resources?api-version={RESOURCES_API_VERSION}", rg.id);
                let mut child = ResourceNode::new(rg.id, rg.name, ItemType::ResourceGroup)
                    .with_expand(expand_url, ExpandReturnType::Resource)
                    .with_subscription(node.subscription_id.clone());
                if let Some(location) = rg.location {
                    child = child.with_metadata(META_LOCATION, location);
                }
                child
            })
            .collect();

        Ok(ExpansionResult::with_nodes(self.name(), nodes))
    }
}
