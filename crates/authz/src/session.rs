//! UI-facing session surface.
//!
//! The back office mounts many components at once and each asks "can I show
//! this button?" independently. `Session` gives them plain boolean answers
//! keyed by raw route slugs, plus the `loading` flag reactive callers show
//! until the first resolution lands. It is also the session-lifecycle seam:
//! `end()` must run on logout before another identity resolves, or a new
//! tenant sharing the process could be served stale permissions.

use std::sync::Arc;

use balcao_core::SessionId;

use crate::permission::Capability;
use crate::providers::IdentityProvider;
use crate::resolver::PermissionResolver;

/// One login session's view of the permission layer.
pub struct Session {
    id: SessionId,
    identity: Arc<dyn IdentityProvider>,
    resolver: Arc<PermissionResolver>,
}

impl Session {
    pub fn new(identity: Arc<dyn IdentityProvider>, resolver: Arc<PermissionResolver>) -> Self {
        let id = SessionId::new();
        tracing::debug!(session = %id, "session opened");
        Self {
            id,
            identity,
            resolver,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    async fn allows(&self, module: &str, capability: Capability) -> bool {
        match self.identity.current_identity().await {
            Some(identity) => self.resolver.allows(&identity, module, capability).await,
            // Unauthenticated: denied immediately, never "loading forever".
            None => false,
        }
    }

    pub async fn can_view(&self, module: &str) -> bool {
        self.allows(module, Capability::View).await
    }

    pub async fn can_edit(&self, module: &str) -> bool {
        self.allows(module, Capability::Edit).await
    }

    pub async fn can_delete(&self, module: &str) -> bool {
        self.allows(module, Capability::Delete).await
    }

    /// True until the first resolution for the current identity completes.
    ///
    /// With no authenticated identity there is nothing to load.
    pub async fn is_loading(&self) -> bool {
        match self.identity.current_identity().await {
            Some(identity) => !self.resolver.cache().is_resolved(&identity),
            None => false,
        }
    }

    /// End the session: permissions cached for this login must not leak into
    /// the next one.
    pub fn end(&self) {
        tracing::info!(session = %self.id, "session ended; invalidating authorization cache");
        self.resolver.cache().invalidate();
    }
}
