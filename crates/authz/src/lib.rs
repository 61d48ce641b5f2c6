//! `balcao-authz` — per-session permission resolution and caching.
//!
//! Answers "can this user view/edit/delete module M" for the back office.
//! A user's authorization data lives in a remote, latency-bearing store and
//! is fetched exactly once per login: the [`AuthorizationCache`] coalesces
//! concurrent resolutions into a single flight, and [`PermissionResolver`]
//! turns its contents into boolean capability answers.
//!
//! The whole layer fails closed: no identity, no group, or a fetch error all
//! collapse to the empty permission set, never to an error the UI has to
//! handle.

pub mod cache;
pub mod module;
pub mod permission;
pub mod providers;
pub mod resolver;
pub mod session;

pub use cache::{AuthorizationCache, FlightGuard, FlightWaiter, Resolution};
pub use module::ModuleKey;
pub use permission::{Capability, ModulePermission, PermissionRow, PermissionSet};
pub use providers::{FetchError, GroupLookup, IdentityProvider, PermissionSource};
pub use resolver::PermissionResolver;
pub use session::Session;
