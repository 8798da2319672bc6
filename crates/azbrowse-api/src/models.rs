// ARM response types
//
// Models for the Resource Manager list endpoints. Every list endpoint wraps
// its payload in `ListResponse<T>`. Fields use `#[serde(default)]` liberally
// because resource providers are inconsistent about which fields they return.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard ARM list envelope.
///
/// ```json
/// { "value": [...], "nextLink": "https://..." }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default, rename = "nextLink")]
    pub next_link: Option<String>,
}

/// ARM error envelope, returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ── Subscription ─────────────────────────────────────────────────────

/// Entry from `GET /subscriptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Full path, e.g. `/subscriptions/00000000-...`.
    pub id: String,
    pub subscription_id: String,
    pub display_name: String,
    #[serde(default)]
    pub state: Option<String>,
}

// ── Resource group ───────────────────────────────────────────────────

/// Entry from `GET {subscription}/resourceGroups`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub properties: Option<ResourceGroupProperties>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
}

// ── Resource ─────────────────────────────────────────────────────────

/// Entry from `GET {resourceGroup}/resources`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericResource {
    pub id: String,
    pub name: String,
    /// Provider-qualified type, e.g. `Microsoft.Web/sites`.
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
}

impl GenericResource {
    /// Provider namespace (`Microsoft.Web` for `Microsoft.Web/sites`).
    pub fn namespace(&self) -> &str {
        self.resource_type
            .split_once('/')
            .map_or(self.resource_type.as_str(), |(ns, _)| ns)
    }
}

// ── Deployment ───────────────────────────────────────────────────────

/// Entry from `GET {resourceGroup}/providers/Microsoft.Resources/deployments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub properties: Option<DeploymentProperties>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

// ── Provider operation ───────────────────────────────────────────────

/// Entry from `GET /providers/{namespace}/operations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// e.g. `Microsoft.Web/sites/restart/action`.
    pub name: String,
    #[serde(default)]
    pub display: Option<OperationDisplay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationDisplay {
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// ── Provider ─────────────────────────────────────────────────────────

/// Entry from `GET {subscription}/providers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    /// e.g. `Microsoft.Web`.
    pub namespace: String,
    #[serde(default)]
    pub resource_types: Vec<ProviderResourceType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResourceType {
    /// Type relative to the namespace, e.g. `sites` or `sites/slots`.
    pub resource_type: String,
    #[serde(default)]
    pub api_versions: Vec<String>,
}

impl ProviderResourceType {
    /// Newest supported version, preferring stable over `-preview` releases.
    pub fn latest_api_version(&self) -> Option<&str> {
        self.api_versions
            .iter()
            .max_by_key(|v| (!v.contains("preview"), v.as_str()))
            .map(String::as_str)
    }
}
