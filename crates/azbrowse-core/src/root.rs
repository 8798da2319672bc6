use azbrowse_api::{ListResponse, SUBSCRIPTIONS_PATH, Subscription};
use tracing::{info, warn};

use crate::api_versions::{ApiVersions, load_api_versions};
use crate::error::CoreError;
use crate::expander::pretty_json;
use crate::fetch::ResourceFetcher;
use crate::model::{ExpandReturnType, ItemType, ResourceNode};

pub const ROOT_TITLE: &str = "Subscriptions";

const RESOURCE_GROUPS_API_VERSION: &str = "2018-05-01";

/// The subscription list shown at startup.
#[derive(Debug, Clone)]
pub struct RootListing {
    pub nodes: Vec<ResourceNode>,
    pub content: String,
    pub title: String,
}

/// Fetch every subscription visible to the token as root nodes.
pub async fn load_subscriptions(fetcher: &dyn ResourceFetcher) -> Result<RootListing, CoreError> {
    let body = fetcher.fetch_json(SUBSCRIPTIONS_PATH).await?;
    let list: ListResponse<Subscription> = azbrowse_api::decode(&body)?;

    let nodes: Vec<ResourceNode> = list
        .value
        .into_iter()
        .map(|sub| {
            let expand_url = format!(
                "{}/resourceGroups?api-version={RESOURCE_GROUPS_API_VERSION}",
                sub.id
            );
            let mut node = ResourceNode::new(sub.id, sub.display_name, ItemType::Subscription)
                .with_expand(expand_url, ExpandReturnType::ResourceGroup)
                .with_subscription(Some(sub.subscription_id));
            if let Some(state) = sub.state {
                node = node.with_metadata("state", state);
            }
            node
        })
        .collect();
    info!(count = nodes.len(), "subscriptions loaded");

    Ok(RootListing {
        nodes,
        content: pretty_json(&body),
        title: ROOT_TITLE.to_owned(),
    })
}

/// [`load_subscriptions`], then fill `versions` from the first
/// subscription's providers if that has not happened yet. A failed provider
/// load is logged and leaves the configured default in place.
pub async fn load_root(
    fetcher: &dyn ResourceFetcher,
    versions: &ApiVersions,
) -> Result<RootListing, CoreError> {
    let listing = load_subscriptions(fetcher).await?;
    if versions.is_empty() {
        if let Some(first) = listing.nodes.first() {
            if let Err(e) = load_api_versions(fetcher, &first.id, versions).await {
                warn!(error = %e, fallback = versions.fallback(), "using default api version");
            }
        }
    }
    Ok(listing)
}
