use std::sync::Arc;

use async_trait::async_trait;
use azbrowse_api::{GenericResource, ListResponse};
use tracing::debug;

use super::{
    ExpandContext, Expander, ExpansionResult, META_LOCATION, META_RESOURCE_TYPE, decode_body,
    fetch_guarded,
};
use crate::api_versions::ApiVersions;
use crate::error::ExpanderError;
use crate::fetch::ResourceFetcher;
use crate::model::{ExpandReturnType, ItemType, ResourceNode};

/// Lists the resources inside a resource group.
pub struct ResourcesExpander {
    fetcher: Arc<dyn ResourceFetcher>,
    api_versions: Arc<ApiVersions>,
}

impl ResourcesExpander {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, api_versions: Arc<ApiVersions>) -> Self {
        Self {
            fetcher,
            api_versions,
        }
    }

    fn to_node(&self, res: GenericResource, parent: &ResourceNode) -> ResourceNode {
        let display = format!("{} ({})", res.name, res.resource_type);
        let expand_url = format!(
            "{}?api-version={}",
            res.id,
            self.api_versions.resolve(&res.resource_type)
        );
        let mut node = ResourceNode::new(res.id, res.name, ItemType::Resource)
            .with_display(display)
            .with_expand(expand_url, ExpandReturnType::SubResource)
            .with_subscription(parent.subscription_id.clone())
            .with_metadata(META_RESOURCE_TYPE, res.resource_type);
        if let Some(location) = res.location {
            node = node.with_metadata(META_LOCATION, location);
        }
        node
    }
}

#[async_trait]
impl Expander for ResourcesExpander {
    fn name(&self) -> &'static str {
        "resources"
    }

    fn matches(&self, node: &ResourceNode) -> Result<bool, ExpanderError> {
        Ok(node.item_type == ItemType::ResourceGroup)
    }

    async fn expand(
        &self,
        ctx: &ExpandContext,
        node: &ResourceNode,
    ) -> Result<ExpansionResult, ExpanderError> {
        let body = fetch_guarded(ctx, self.fetcher.as_ref(), &node.expand_url).await?;
        let list: ListResponse<GenericResource> = decode_body(&body)?;
        debug!(group = %node.id, count = list.value.len(), "resources listed");

        let nodes = list
            .value
            .into_iter()
            .map(|res| self.to_node(res, node))
            .collect();
        Ok(ExpansionResult::with_nodes(self.name(), nodes))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::testing::FakeFetcher;

    #[tokio::test]
    async fn resources_carry_type_and_display() {
        let group = ResourceNode::new("/s/1/resourceGroups/web", "web", ItemType::ResourceGroup)
            .with_expand(
                "/s/1/resourceGroups/web/resources?api-version=2017-05-10",
                ExpandReturnType::Resource,
            );
        let fetcher = FakeFetcher::new()
            .get(
                "/s/1/resourceGroups/web/resources?api-version=2017-05-10",
                r#"{"value":[{"id":"/s/1/resourceGroups/web/providers/Microsoft.Web/sites/app","name":"app","type":"Microsoft.Web/sites"}]}"#,
            )
            .shared();
        let expander = ResourcesExpander::new(fetcher, Arc::new(ApiVersions::new("2017-05-10")));
        let ctx = ExpandContext::new(1, CancellationToken::new());

        let nodes = expander.expand(&ctx, &group).await.unwrap().nodes.unwrap();

        assert_eq!(nodes[0].display, "app (Microsoft.Web/sites)");
        assert_eq!(nodes[0].expand_return_type, ExpandReturnType::SubResource);
        assert_eq!(
            nodes[0].expand_url,
            "/s/1/resourceGroups/web/providers/Microsoft.Web/sites/app?api-version=2017-05-10"
        );
        assert_eq!(nodes[0].meta(META_RESOURCE_TYPE), Some("Microsoft.Web/sites"));
    }

    #[tokio::test]
    async fn fetch_failure_is_reported() {
        let group = ResourceNode::new("/s/1/resourceGroups/x", "x", ItemType::ResourceGroup)
            .with_expand("/missing", ExpandReturnType::Resource);
        let expander = ResourcesExpander::new(
            FakeFetcher::new().shared(),
            Arc::new(ApiVersions::new("2017-05-10")),
        );
        let ctx = ExpandContext::new(1, CancellationToken::new());

        let err = expander.expand(&ctx, &group).await.unwrap_err();
        assert!(matches!(err, ExpanderError::Api(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn known_types_get_their_own_version() {
        let group = ResourceNode::new("/s/1/resourceGroups/web", "web", ItemType::ResourceGroup)
            .with_expand("/s/1/resourceGroups/web/resources", ExpandReturnType::Resource);
        let fetcher = FakeFetcher::new()
            .get(
                "/s/1/resourceGroups/web/resources",
                r#"{"value":[
                    {"id":"/s/1/resourceGroups/web/providers/Microsoft.Web/sites/app","name":"app","type":"Microsoft.Web/sites"},
                    {"id":"/s/1/resourceGroups/web/providers/Contoso.Thing/widgets/w","name":"w","type":"Contoso.Thing/widgets"}
                ]}"#,
            )
            .shared();
        let versions = Arc::new(ApiVersions::new("2017-05-10"));
        versions.insert("microsoft.web/sites", "2022-03-01");
        let expander = ResourcesExpander::new(fetcher, versions);
        let ctx = ExpandContext::new(1, CancellationToken::new());

        let nodes = expander.expand(&ctx, &group).await.unwrap().nodes.unwrap();

        assert!(nodes[0].expand_url.ends_with("/sites/app?api-version=2022-03-01"));
        assert!(nodes[1].expand_url.ends_with("/widgets/w?api-version=2017-05-10"));
    }
}
