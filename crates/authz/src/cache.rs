//! Process-wide authorization cache with single-flight coalescing.
//!
//! One running application serves one tenant session at a time, so the cache
//! holds at most one `(identity, permission set)` pair plus at most one
//! in-flight resolution. Many UI components ask for permissions nearly
//! simultaneously during start-up; the cache guarantees they converge on a
//! single remote fetch and all observe its result.
//!
//! The cache is an explicitly constructed object shared via `Arc`, not a
//! module-level singleton, so tests can run isolated instances side by side.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use balcao_core::Identity;

use crate::permission::PermissionSet;

/// Store for the current identity's resolved permissions.
///
/// All operations are synchronous and lock-scoped; the mutex is never held
/// across an await. Suspension only happens on [`FlightWaiter::wait`], which
/// runs outside the lock.
#[derive(Debug, Default)]
pub struct AuthorizationCache {
    state: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    cached: Option<CachedSet>,
    in_flight: Option<InFlight>,
    /// Monotonic flight counter. A completing flight may only publish if its
    /// generation is still the registered one, so an `invalidate` (or a
    /// superseding registration) fences off stale results.
    generation: u64,
}

#[derive(Debug)]
struct CachedSet {
    identity: Identity,
    permissions: PermissionSet,
    /// For log correlation only; never consulted for expiry.
    resolved_at: DateTime<Utc>,
}

#[derive(Debug)]
struct InFlight {
    identity: Identity,
    generation: u64,
    rx: watch::Receiver<Option<PermissionSet>>,
}

/// Outcome of an atomic check-then-register against the cache.
pub enum Resolution {
    /// A valid cached set already exists (covers the race where a flight
    /// completed between the caller's `get` and `begin_resolution`).
    Cached(PermissionSet),
    /// A flight for this identity is already registered; await it.
    Joined(FlightWaiter),
    /// This caller is the leader and must fetch, then call
    /// [`FlightGuard::complete`].
    Lead(FlightGuard),
}

/// Shared handle onto an in-flight resolution.
pub struct FlightWaiter {
    rx: watch::Receiver<Option<PermissionSet>>,
}

impl FlightWaiter {
    /// Await the shared flight's result.
    pub async fn wait(mut self) -> PermissionSet {
        match self.rx.wait_for(Option::is_some).await {
            Ok(result) => (*result).clone().unwrap_or_default(),
            // Sender gone without publishing: the leader vanished. Fail closed.
            Err(_) => {
                tracing::warn!("permission flight closed without a result; denying all modules");
                PermissionSet::empty()
            }
        }
    }
}

/// Exclusive right, and obligation, to perform the remote fetch for a flight.
///
/// Dropping the guard without calling [`FlightGuard::complete`] releases all
/// waiters with the empty set and leaves the cache unpopulated, so the next
/// `resolve` starts a fresh fetch. Waiters are never left hanging, even if
/// the leading task panics or is cancelled mid-fetch.
pub struct FlightGuard {
    cache: Arc<AuthorizationCache>,
    identity: Identity,
    generation: u64,
    tx: Option<watch::Sender<Option<PermissionSet>>>,
}

impl FlightGuard {
    /// Publish the fetched set as current cache content and release every
    /// waiter with the same value, exactly once.
    pub fn complete(mut self, permissions: PermissionSet) {
        if let Some(tx) = self.tx.take() {
            self.cache.publish(self.generation, &self.identity, permissions.clone());
            let _ = tx.send(Some(permissions));
        }
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            tracing::warn!(
                identity = %self.identity,
                "permission resolution abandoned; releasing waiters with an empty set"
            );
            self.cache.abandon(self.generation);
            let _ = tx.send(Some(PermissionSet::empty()));
        }
    }
}

impl AuthorizationCache {
    /// Create an empty cache (nothing resolved, nothing in flight).
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        // The lock only ever guards a few field reads/writes, so a panic
        // while holding it cannot leave the state half-updated.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached permission set, only if it belongs to `identity`.
    ///
    /// No side effects, never blocks.
    pub fn get(&self, identity: &Identity) -> Option<PermissionSet> {
        self.state()
            .cached
            .as_ref()
            .filter(|c| &c.identity == identity)
            .map(|c| c.permissions.clone())
    }

    /// Whether a resolution for `identity` has completed since the last
    /// invalidation. Drives the session-level `loading` flag.
    pub fn is_resolved(&self, identity: &Identity) -> bool {
        self.state()
            .cached
            .as_ref()
            .is_some_and(|c| &c.identity == identity)
    }

    /// When the current cached set was resolved, if any.
    pub fn resolved_at(&self, identity: &Identity) -> Option<DateTime<Utc>> {
        self.state()
            .cached
            .as_ref()
            .filter(|c| &c.identity == identity)
            .map(|c| c.resolved_at)
    }

    /// Atomically check the cache and register or join the in-flight
    /// resolution for `identity`.
    ///
    /// At most one caller per identity receives [`Resolution::Lead`] before
    /// the flight settles; everyone else joins the same flight. Takes the
    /// shared handle because a [`FlightGuard`] must outlive the borrow that
    /// created it.
    pub fn begin_resolution(cache: &Arc<Self>, identity: &Identity) -> Resolution {
        let mut state = cache.state();

        if let Some(cached) = state.cached.as_ref().filter(|c| &c.identity == identity) {
            return Resolution::Cached(cached.permissions.clone());
        }

        if let Some(flight) = state.in_flight.as_ref().filter(|f| &f.identity == identity) {
            return Resolution::Joined(FlightWaiter {
                rx: flight.rx.clone(),
            });
        }

        // A flight for a *different* identity can only be present here if a
        // new login raced an old session's fetch. The new registration
        // supersedes it; the old flight still releases its own waiters, but
        // the generation fence keeps its result out of the cache.
        let (tx, rx) = watch::channel(None);
        state.generation += 1;
        let generation = state.generation;
        state.in_flight = Some(InFlight {
            identity: identity.clone(),
            generation,
            rx,
        });

        Resolution::Lead(FlightGuard {
            cache: Arc::clone(cache),
            identity: identity.clone(),
            generation,
            tx: Some(tx),
        })
    }

    /// Drop the cached set, its identity, and any in-flight registration.
    ///
    /// Must be called on logout or identity switch, before the next
    /// identity's resolution begins. Safe to call mid-flight: the leader
    /// still releases its waiters through the watch channel, but the
    /// generation fence keeps the late result from becoming current.
    pub fn invalidate(&self) {
        let mut state = self.state();
        state.cached = None;
        state.in_flight = None;
        tracing::debug!("authorization cache invalidated");
    }

    fn publish(&self, generation: u64, identity: &Identity, permissions: PermissionSet) {
        let mut state = self.state();
        if state
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation == generation)
        {
            state.in_flight = None;
            state.cached = Some(CachedSet {
                identity: identity.clone(),
                permissions,
                resolved_at: Utc::now(),
            });
        } else {
            tracing::debug!(
                identity = %identity,
                "resolution finished after invalidation; result not cached"
            );
        }
    }

    fn abandon(&self, generation: u64) {
        let mut state = self.state();
        if state
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation == generation)
        {
            state.in_flight = None;
        }
    }
}
