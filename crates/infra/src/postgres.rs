//! Postgres-backed group and permission lookups.
//!
//! Thin read adapters over the hosted platform's authorization tables:
//! `perfil_usuario` maps a principal to its permission group, and
//! `permissoes_grupo` holds one row per (group, module) with the three
//! capability flags. Both lookups are read-only; grant administration
//! happens on the platform side.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

use balcao_authz::{FetchError, GroupLookup, PermissionRow, PermissionSource};
use balcao_core::{GroupId, Identity};

/// sqlx adapter implementing both remote lookups over one pool.
#[derive(Debug, Clone)]
pub struct PgAuthzStore {
    pool: Arc<PgPool>,
}

impl PgAuthzStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to the hosted platform's database.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("failed to connect to the authorization store")?;
        tracing::debug!("authorization store pool ready");
        Ok(Self::new(pool))
    }
}

fn unavailable(op: &str, err: sqlx::Error) -> FetchError {
    FetchError::Unavailable(format!("{op}: {err}"))
}

fn decode(column: &str, err: sqlx::Error) -> FetchError {
    FetchError::Decode(format!("{column}: {err}"))
}

#[async_trait]
impl GroupLookup for PgAuthzStore {
    async fn group_of(&self, identity: &Identity) -> Result<Option<GroupId>, FetchError> {
        let row = sqlx::query(
            r#"
            SELECT grupo_id
            FROM perfil_usuario
            WHERE user_id = $1
            "#,
        )
        .bind(identity.as_str())
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| unavailable("group lookup", e))?;

        row.map(|row| {
            let grupo: String = row.try_get("grupo_id").map_err(|e| decode("grupo_id", e))?;
            Ok(GroupId::from(grupo))
        })
        .transpose()
    }
}

#[async_trait]
impl PermissionSource for PgAuthzStore {
    async fn permissions_of(&self, group: &GroupId) -> Result<Vec<PermissionRow>, FetchError> {
        let rows = sqlx::query(
            r#"
            SELECT modulo, visualizar, editar, excluir
            FROM permissoes_grupo
            WHERE grupo_id = $1
            "#,
        )
        .bind(group.as_str())
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| unavailable("permission fetch", e))?;

        rows.into_iter()
            .map(|row| {
                let module: String = row.try_get("modulo").map_err(|e| decode("modulo", e))?;
                let can_view: bool = row.try_get("visualizar").map_err(|e| decode("visualizar", e))?;
                let can_edit: bool = row.try_get("editar").map_err(|e| decode("editar", e))?;
                let can_delete: bool = row.try_get("excluir").map_err(|e| decode("excluir", e))?;
                Ok(PermissionRow::new(module, can_view, can_edit, can_delete))
            })
            .collect()
    }
}
