use std::sync::Arc;

use super::{
    ActionsExpander, DeploymentsExpander, Expander, ResourceGroupsExpander, ResourcesExpander,
};
use crate::api_versions::ApiVersions;
use crate::fetch::ResourceFetcher;

/// Ordered set of expanders consulted for every expansion.
///
/// Registration order is the predicate order. Built once at startup and
/// shared read-only; an empty registry is legal and expands to nothing.
#[derive(Clone, Default)]
pub struct ExpanderRegistry {
    expanders: Vec<Arc<dyn Expander>>,
}

impl ExpanderRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The expanders shipped with the browser, in their fixed order.
    /// Resource and action URLs take their version from `api_versions`.
    pub fn builtin(fetcher: Arc<dyn ResourceFetcher>, api_versions: &Arc<ApiVersions>) -> Self {
        Self::empty()
            .with(ResourceGroupsExpander::new(Arc::clone(&fetcher)))
            .with(ResourcesExpander::new(
                Arc::clone(&fetcher),
                Arc::clone(api_versions),
            ))
            .with(DeploymentsExpander::new(Arc::clone(&fetcher)))
            .with(ActionsExpander::new(fetcher, Arc::clone(api_versions)))
    }

    pub fn with(mut self, expander: impl Expander + 'static) -> Self {
        self.register(Arc::new(expander));
        self
    }

    pub fn register(&mut self, expander: Arc<dyn Expander>) {
        self.expanders.push(expander);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Expander>> {
        self.expanders.iter()
    }

    pub fn len(&self) -> usize {
        self.expanders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanders.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.expanders.iter().map(|e| e.name()).collect()
    }
}

impl std::fmt::Debug for ExpanderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpanderRegistry")
            .field("expanders", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFetcher;

    #[test]
    fn builtin_order_is_fixed() {
        let registry = ExpanderRegistry::builtin(
            FakeFetcher::new().shared(),
            &Arc::new(ApiVersions::new("2017-05-10")),
        );
        assert_eq!(
            registry.names(),
            vec!["resource-groups", "resources", "deployments", "actions"]
        );
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn empty_registry_is_legal() {
        let registry = ExpanderRegistry::empty();
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }
}
