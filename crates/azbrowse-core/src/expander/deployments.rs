use std::sync::Arc;

use async_trait::async_trait;
use azbrowse_api::{Deployment, ListResponse};

use super::{ExpandContext, Expander, ExpansionResult, decode_body, fetch_guarded};
use crate::error::ExpanderError;
use crate::fetch::ResourceFetcher;
use crate::model::{ExpandReturnType, ItemType, ResourceNode};

const DEPLOYMENTS_API_VERSION: &str = "2017-05-10";

/// Lists the template deployments of a resource group.
///
/// Runs alongside [`super::ResourcesExpander`]; the two contributions are
/// disjoint, so the merged list holds both.
pub struct DeploymentsExpander {
    fetcher: Arc<dyn ResourceFetcher>,
}

impl DeploymentsExpander {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self { fetcher }
    }
}

fn deployments_path(group_id: &str) -> String {
    format!(
        "{group_id}/providers/Microsoft.Resources/deployments?api-version={DEPLOYMENTS_API_VERSION}"
    )
}

#[async_trait]
impl Expander for DeploymentsExpander {
    fn name(&self) -> &'static str {
        "deployments"
    }

    fn matches(&self, node: &ResourceNode) -> Result<bool, ExpanderError> {
        Ok(node.item_type == ItemType::ResourceGroup)
    }

    async fn expand(
        &self,
        ctx: &ExpandContext,
        node: &ResourceNode,
    ) -> Result<ExpansionResult, ExpanderError> {
        let path = deployments_path(&node.id);
        let body = fetch_guarded(ctx, self.fetcher.as_ref(), &path).await?;
        let list: ListResponse<Deployment> = decode_body(&body)?;

        let nodes = list
            .value
            .into_iter()
            .map(|d| {
                let state = d
                    .properties
                    .as_ref()
                    .and_then(|p| p.provisioning_state.clone());
                let display = match &state {
                    Some(state) => format!("{} (deployment, {state})", d.name),
                    None => format!("{} (deployment)", d.name),
                };
                let expand_url = format!("{}?api-version={DEPLOYMENTS_API_VERSION}", d.id);
                ResourceNode::new(d.id, d.name, ItemType::Deployment)
                    .with_display(display)
                    .with_expand(expand_url, ExpandReturnType::None)
                    .with_subscription(node.subscription_id.clone())
            })
            .collect();

        Ok(ExpansionResult::with_nodes(self.name(), nodes))
    }
}
