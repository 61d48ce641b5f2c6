//! Infrastructure layer: adapters to the hosted data platform.
//!
//! The permission layer itself (`balcao-authz`) does no I/O; this crate
//! provides the collaborator implementations it is wired with — a Postgres
//! read adapter for production and in-memory stand-ins for development and
//! tests.

pub mod memory;
pub mod postgres;

pub use memory::{FixedIdentityProvider, InMemoryDirectory};
pub use postgres::PgAuthzStore;
