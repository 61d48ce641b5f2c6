//! Permission resolution against the cache and the remote store.

use std::sync::Arc;

use balcao_core::Identity;

use crate::cache::{AuthorizationCache, Resolution};
use crate::module::ModuleKey;
use crate::permission::{Capability, PermissionSet};
use crate::providers::{GroupLookup, PermissionSource};

/// Produces capability answers for module keys, fetching each identity's
/// permission set from the remote store at most once per login.
///
/// Failure semantics: a missing group assignment or any remote error
/// collapses to the empty set. Callers never observe a distinct error state,
/// only "no access" — partial authorization data must never read as granted.
pub struct PermissionResolver {
    cache: Arc<AuthorizationCache>,
    groups: Arc<dyn GroupLookup>,
    source: Arc<dyn PermissionSource>,
}

impl PermissionResolver {
    pub fn new(
        cache: Arc<AuthorizationCache>,
        groups: Arc<dyn GroupLookup>,
        source: Arc<dyn PermissionSource>,
    ) -> Self {
        Self {
            cache,
            groups,
            source,
        }
    }

    /// The cache this resolver publishes into.
    pub fn cache(&self) -> &Arc<AuthorizationCache> {
        &self.cache
    }

    /// Resolve the permission set for `identity`, fetching remotely only when
    /// no valid cached set and no in-flight resolution exists.
    ///
    /// Infallible by contract: every failure path yields the empty set. There
    /// is no automatic retry; a fresh fetch only happens on a later call once
    /// the cache holds no valid set.
    pub async fn resolve(&self, identity: &Identity) -> PermissionSet {
        if let Some(cached) = self.cache.get(identity) {
            return cached;
        }

        match AuthorizationCache::begin_resolution(&self.cache, identity) {
            Resolution::Cached(set) => set,
            Resolution::Joined(waiter) => waiter.wait().await,
            Resolution::Lead(flight) => {
                let permissions = self.fetch(identity).await;
                flight.complete(permissions.clone());
                permissions
            }
        }
    }

    /// Two-step remote fetch: identity → group, group → permission rows.
    async fn fetch(&self, identity: &Identity) -> PermissionSet {
        let group = match self.groups.group_of(identity).await {
            Ok(Some(group)) => group,
            Ok(None) => {
                tracing::warn!(identity = %identity, "no permission group assigned; denying all modules");
                return PermissionSet::empty();
            }
            Err(err) => {
                tracing::warn!(identity = %identity, error = %err, "group lookup failed; denying all modules");
                return PermissionSet::empty();
            }
        };

        match self.source.permissions_of(&group).await {
            Ok(rows) => {
                let permissions = PermissionSet::from_rows(rows);
                tracing::debug!(
                    identity = %identity,
                    group = %group,
                    modules = permissions.len(),
                    "permission set resolved"
                );
                permissions
            }
            Err(err) => {
                tracing::warn!(identity = %identity, group = %group, error = %err, "permission fetch failed; denying all modules");
                PermissionSet::empty()
            }
        }
    }

    /// Capability check for a caller-supplied (raw) module key.
    pub async fn allows(&self, identity: &Identity, module: &str, capability: Capability) -> bool {
        let module = ModuleKey::normalize(module);
        self.resolve(identity).await.allows(&module, capability)
    }

    pub async fn can_view(&self, identity: &Identity, module: &str) -> bool {
        self.allows(identity, module, Capability::View).await
    }

    pub async fn can_edit(&self, identity: &Identity, module: &str) -> bool {
        self.allows(identity, module, Capability::Edit).await
    }

    pub async fn can_delete(&self, identity: &Identity, module: &str) -> bool {
        self.allows(identity, module, Capability::Delete).await
    }
}
