use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{ExpandContext, Expander, ExpansionResult, fetch_guarded};
use crate::error::ExpanderError;
use crate::fetch::ResourceFetcher;
use crate::model::{ItemType, ResourceNode};

/// Produces the content panel text for any node.
///
/// Ordinary nodes show their `expand_url` response, pretty-printed when it
/// is JSON. Action nodes are invoked with a `POST` and show the action's
/// response instead. Not part of the registry: the coordinator runs it
/// after every fan-in.
pub struct DefaultContent {
    fetcher: Arc<dyn ResourceFetcher>,
}

impl DefaultContent {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self { fetcher }
    }
}

/// Re-indent a JSON body; anything else is returned as-is.
pub(crate) fn pretty_json(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| body.to_owned())
}

#[async_trait]
impl Expander for DefaultContent {
    fn name(&self) -> &'static str {
        "default"
    }

    fn matches(&self, _node: &ResourceNode) -> Result<bool, ExpanderError> {
        Ok(true)
    }

    async fn expand(
        &self,
        ctx: &ExpandContext,
        node: &ResourceNode,
    ) -> Result<ExpansionResult, ExpanderError> {
        if node.expand_url.is_empty() {
            let text = serde_json::to_string_pretty(node).unwrap_or_else(|_| node.id.clone());
            return Ok(ExpansionResult::with_response(self.name(), text));
        }

        let body = if node.item_type == ItemType::Action {
            info!(action = %node.id, "invoking action");
            ctx.guard(async {
                self.fetcher
                    .post_json(&node.expand_url)
                    .await
                    .map_err(ExpanderError::from)
            })
            .await?
        } else {
            fetch_guarded(ctx, self.fetcher.as_ref(), &node.expand_url).await?
        };
        debug!(node = %node.id, bytes = body.len(), "content loaded");

        let text = if body.trim().is_empty() && node.item_type == ItemType::Action {
            format!("{} accepted (empty response)", node.display)
        } else {
            pretty_json(&body)
        };
        Ok(ExpansionResult::with_response(self.name(), text))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::model::ExpandReturnType;
    use crate::testing::FakeFetcher;

    fn ctx() -> ExpandContext {
        ExpandContext::new(1, CancellationToken::new())
    }

    #[test]
    fn pretty_json_falls_back_to_raw_text() {
        assert_eq!(pretty_json(r#"{"a":1}"#), "{\n  \"a\": 1\n}");
        assert_eq!(pretty_json("plain text"), "plain text");
    }

    #[tokio::test]
    async fn gets_and_pretty_prints() {
        let fetcher = FakeFetcher::new().get("/s/1?api-version=1", r#"{"id":"/s/1"}"#).shared();
        let provider = DefaultContent::new(fetcher.clone());
        let node = ResourceNode::new("/s/1", "1", ItemType::Subscription)
            .with_expand("/s/1?api-version=1", ExpandReturnType::ResourceGroup);

        let res = provider.expand(&ctx(), &node).await.unwrap();

        assert_eq!(res.response.as_deref(), Some("{\n  \"id\": \"/s/1\"\n}"));
        assert_eq!(fetcher.calls(), vec!["GET /s/1?api-version=1".to_owned()]);
    }

    #[tokio::test]
    async fn posts_for_actions() {
        let fetcher = FakeFetcher::new().post("/site/restart?api-version=1", "").shared();
        let provider = DefaultContent::new(fetcher.clone());
        let node = ResourceNode::new("/site/restart", "restart", ItemType::Action)
            .with_expand("/site/restart?api-version=1", ExpandReturnType::Action);

        let res = provider.expand(&ctx(), &node).await.unwrap();

        assert_eq!(res.response.as_deref(), Some("restart accepted (empty response)"));
        assert_eq!(fetcher.calls(), vec!["POST /site/restart?api-version=1".to_owned()]);
    }

    #[tokio::test]
    async fn nodes_without_url_show_themselves() {
        let provider = DefaultContent::new(FakeFetcher::new().shared());
        let node = ResourceNode::new("/local", "local", ItemType::Other);

        let res = provider.expand(&ctx(), &node).await.unwrap();

        assert!(res.response.unwrap().contains("\"id\": \"/local\""));
    }
}
