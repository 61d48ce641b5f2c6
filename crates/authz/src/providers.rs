//! Collaborator contracts the resolver depends on.
//!
//! These are the narrow seams to the hosted platform: who is logged in, which
//! permission group they belong to, and what that group grants. All of them
//! are consumed as `Arc<dyn _>` so tests can swap in counting doubles.

use async_trait::async_trait;
use thiserror::Error;

use balcao_core::{GroupId, Identity};

use crate::permission::PermissionRow;

/// Error surfaced by the remote permission store.
///
/// The resolver recovers these locally (fail closed); the variants exist so
/// adapters and logs can tell transport failures from malformed data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("permission store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed permission data: {0}")]
    Decode(String),
}

/// Supplies the authenticated principal for the current session.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The currently authenticated principal, if any.
    async fn current_identity(&self) -> Option<Identity>;
}

/// Maps a principal to its permission group.
#[async_trait]
pub trait GroupLookup: Send + Sync {
    /// The group `identity` belongs to; `Ok(None)` when unassigned.
    async fn group_of(&self, identity: &Identity) -> Result<Option<GroupId>, FetchError>;
}

/// Remote read of a group's per-module capability rows.
#[async_trait]
pub trait PermissionSource: Send + Sync {
    async fn permissions_of(&self, group: &GroupId) -> Result<Vec<PermissionRow>, FetchError>;
}
