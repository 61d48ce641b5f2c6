//! In-memory collaborator implementations.
//!
//! Used for development wiring (running the back office without the hosted
//! platform) and as observable doubles in tests: both stores count their
//! remote round trips so single-flight behavior stays verifiable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use balcao_authz::{FetchError, GroupLookup, IdentityProvider, PermissionRow, PermissionSource};
use balcao_core::{GroupId, Identity};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Identity provider with a settable current principal.
#[derive(Debug, Default)]
pub struct FixedIdentityProvider {
    current: Mutex<Option<Identity>>,
}

impl FixedIdentityProvider {
    /// No principal signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(identity: Identity) -> Self {
        Self {
            current: Mutex::new(Some(identity)),
        }
    }

    pub fn sign_in(&self, identity: Identity) {
        *lock(&self.current) = Some(identity);
    }

    pub fn sign_out(&self) {
        *lock(&self.current) = None;
    }
}

#[async_trait]
impl IdentityProvider for FixedIdentityProvider {
    async fn current_identity(&self) -> Option<Identity> {
        lock(&self.current).clone()
    }
}

/// In-memory group/permission directory with fetch counters.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    groups: Mutex<HashMap<Identity, GroupId>>,
    permissions: Mutex<HashMap<GroupId, Vec<PermissionRow>>>,
    group_lookups: AtomicUsize,
    permission_fetches: AtomicUsize,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign_group(&self, identity: Identity, group: GroupId) {
        lock(&self.groups).insert(identity, group);
    }

    pub fn grant(&self, group: GroupId, row: PermissionRow) {
        lock(&self.permissions).entry(group).or_default().push(row);
    }

    /// Remote round trips observed so far.
    pub fn group_lookups(&self) -> usize {
        self.group_lookups.load(Ordering::SeqCst)
    }

    pub fn permission_fetches(&self) -> usize {
        self.permission_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GroupLookup for InMemoryDirectory {
    async fn group_of(&self, identity: &Identity) -> Result<Option<GroupId>, FetchError> {
        self.group_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.groups).get(identity).cloned())
    }
}

#[async_trait]
impl PermissionSource for InMemoryDirectory {
    async fn permissions_of(&self, group: &GroupId) -> Result<Vec<PermissionRow>, FetchError> {
        self.permission_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.permissions).get(group).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use balcao_authz::{AuthorizationCache, PermissionResolver, Session};

    use super::*;

    fn wired_session() -> (Arc<FixedIdentityProvider>, Arc<InMemoryDirectory>, Session) {
        let directory = Arc::new(InMemoryDirectory::new());
        directory.assign_group(Identity::new("u1"), GroupId::new("g1"));
        directory.grant(GroupId::new("g1"), PermissionRow::new("pdv", true, false, false));

        let provider = Arc::new(FixedIdentityProvider::signed_in(Identity::new("u1")));
        let resolver = Arc::new(PermissionResolver::new(
            Arc::new(AuthorizationCache::new()),
            directory.clone(),
            directory.clone(),
        ));
        let session = Session::new(provider.clone(), resolver);
        (provider, directory, session)
    }

    #[tokio::test]
    async fn full_wiring_answers_capability_queries() {
        let (_provider, directory, session) = wired_session();

        assert!(session.can_view("pdv").await);
        assert!(!session.can_edit("pdv").await);
        assert!(!session.can_view("contas-pagar").await);
        assert_eq!(directory.permission_fetches(), 1);
    }

    #[tokio::test]
    async fn sign_out_denies_without_touching_the_store() {
        let (provider, directory, session) = wired_session();

        provider.sign_out();
        assert!(!session.can_view("pdv").await);
        assert_eq!(directory.group_lookups(), 0);
    }
}
