//! Model selection logic for choosing the best catalog entry
//!
//! Deterministic, order-sensitive scan over the provider catalog: blacklist
//! keywords disqualify, priority keywords rank. All matching is
//! case-insensitive literal substring matching - intentionally not regex,
//! behavior parity with provider model naming depends on these exact
//! semantics.

use crate::config::SelectionConfig;
use crate::provider::ModelId;

/// Static keyword policy driving model selection
///
/// Both keyword lists are lowercased once at construction and immutable
/// afterwards. `priority` order matters: the first keyword that matches any
/// catalog id wins.
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    priority: Vec<String>,
    blacklist: Vec<String>,
}

impl SelectionPolicy {
    /// Create a policy, normalizing all keywords to lowercase
    pub fn new(priority: Vec<String>, blacklist: Vec<String>) -> Self {
        Self {
            priority: priority.into_iter().map(|k| k.to_lowercase()).collect(),
            blacklist: blacklist.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Build the policy from the `[selection]` config section
    pub fn from_config(config: &SelectionConfig) -> Self {
        Self::new(config.priority.clone(), config.blacklist.clone())
    }

    fn is_blacklisted(&self, id_lower: &str) -> bool {
        self.blacklist.iter().any(|b| id_lower.contains(b))
    }
}

/// Selects the best model id from a catalog snapshot
pub struct ModelSelector {
    policy: SelectionPolicy,
}

impl ModelSelector {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }

    /// Pick the best model from `catalog`, or `None` if the catalog is empty.
    ///
    /// 1. Drop every id containing a blacklist keyword. If that drops
    ///    everything, fall back to the unfiltered catalog - the blacklist is
    ///    advisory, never fatal.
    /// 2. For each priority keyword in declared order, return the first id
    ///    (in catalog order) containing it.
    /// 3. Otherwise return the first remaining id.
    ///
    /// Repeated calls with identical inputs return identical output.
    pub fn select(&self, catalog: &[ModelId]) -> Option<ModelId> {
        let filtered: Vec<&ModelId> = catalog
            .iter()
            .filter(|id| !self.policy.is_blacklisted(&id.to_lowercase()))
            .collect();

        let candidates: Vec<&ModelId> = if filtered.is_empty() {
            tracing::debug!(
                catalog_size = catalog.len(),
                "blacklist removed every model, falling back to unfiltered catalog"
            );
            catalog.iter().collect()
        } else {
            filtered
        };

        for keyword in &self.policy.priority {
            for id in &candidates {
                if id.to_lowercase().contains(keyword) {
                    tracing::debug!(
                        model = %id,
                        keyword = %keyword,
                        "selected model via priority keyword"
                    );
                    return Some((*id).clone());
                }
            }
        }

        let fallback = candidates.first().map(|id| (*id).clone());
        if let Some(model) = &fallback {
            tracing::debug!(model = %model, "no priority keyword matched, using first candidate");
        }
        fallback
    }
}
