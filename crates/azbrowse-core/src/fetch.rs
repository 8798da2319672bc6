// ── Fetch capability ──
//
// Everything in the engine that touches the network goes through this
// trait, so expanders can be exercised against in-memory fakes.

use async_trait::async_trait;
use azbrowse_api::ArmClient;

/// Returns JSON text for a relative path.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// `GET` the path.
    async fn fetch_json(&self, path: &str) -> Result<String, azbrowse_api::Error>;

    /// `POST` an empty body to the path (resource actions).
    async fn post_json(&self, path: &str) -> Result<String, azbrowse_api::Error>;
}

#[async_trait]
impl ResourceFetcher for ArmClient {
    async fn fetch_json(&self, path: &str) -> Result<String, azbrowse_api::Error> {
        self.get_text(path).await
    }

    async fn post_json(&self, path: &str) -> Result<String, azbrowse_api::Error> {
        self.post_text(path).await
    }
}
