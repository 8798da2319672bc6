// ── Provider api-version lookup ──
//
// ARM rejects resource requests whose `api-version` the provider does not
// support, and every resource type has its own list. The table is filled
// once from `{subscription}/providers` after the subscriptions load and is
// read by the expanders that build resource and action URLs. Until then,
// and for types it does not know, the configured default is used.

use azbrowse_api::{ListResponse, Provider};
use dashmap::DashMap;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::fetch::ResourceFetcher;

const PROVIDERS_API_VERSION: &str = "2017-05-10";

/// Latest api-version per `namespace/resourceType`, case-insensitive.
#[derive(Debug)]
pub struct ApiVersions {
    fallback: String,
    versions: DashMap<String, String>,
}

impl ApiVersions {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
            versions: DashMap::new(),
        }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Version to use for `resource_type` (e.g. `Microsoft.Web/sites`).
    pub fn resolve(&self, resource_type: &str) -> String {
        self.versions
            .get(&resource_type.to_ascii_lowercase())
            .map_or_else(|| self.fallback.clone(), |v| v.value().clone())
    }

    pub fn insert(&self, resource_type: &str, version: impl Into<String>) {
        self.versions
            .insert(resource_type.to_ascii_lowercase(), version.into());
    }

    /// Record the newest version of every type in `providers`.
    /// Returns the number of types learned.
    pub fn extend_from(&self, providers: &[Provider]) -> usize {
        let mut learned = 0;
        for provider in providers {
            for rt in &provider.resource_types {
                if let Some(version) = rt.latest_api_version() {
                    self.insert(&format!("{}/{}", provider.namespace, rt.resource_type), version);
                    learned += 1;
                }
            }
        }
        learned
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Fill `versions` from the providers registered for `subscription`
/// (a full path such as `/subscriptions/{id}`).
pub async fn load_api_versions(
    fetcher: &dyn ResourceFetcher,
    subscription: &str,
    versions: &ApiVersions,
) -> Result<usize, CoreError> {
    let path = format!("{subscription}/providers?api-version={PROVIDERS_API_VERSION}");
    let body = fetcher
        .fetch_json(&path)
        .await
        .map_err(CoreError::Providers)?;
    let list: ListResponse<Provider> =
        azbrowse_api::decode(&body).map_err(CoreError::Providers)?;

    debug!(providers = list.value.len(), "provider list fetched");
    let learned = versions.extend_from(&list.value);
    info!(types = learned, "provider api versions loaded");
    Ok(learned)
}
