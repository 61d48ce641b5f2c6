//! Permission data model.
//!
//! A principal's group grants per-module capability flags. Absence is the
//! operative rule everywhere in this module: a module with no entry grants
//! nothing, and the empty [`PermissionSet`] is the universal fail-closed
//! value the resolver falls back to.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::module::ModuleKey;

/// A capability a principal may hold on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    View,
    Edit,
    Delete,
}

/// Raw per-module capability row as returned by the remote permission store,
/// before key normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRow {
    pub module: String,
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl PermissionRow {
    pub fn new(module: impl Into<String>, can_view: bool, can_edit: bool, can_delete: bool) -> Self {
        Self {
            module: module.into(),
            can_view,
            can_edit,
            can_delete,
        }
    }
}

/// Capability flags granted on one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePermission {
    pub module: ModuleKey,
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl ModulePermission {
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::View => self.can_view,
            Capability::Edit => self.can_edit,
            Capability::Delete => self.can_delete,
        }
    }
}

/// The permission set resolved for one identity.
///
/// Unique by module key; insertion order is irrelevant. Logically owned by
/// exactly one identity at a time (the cache enforces that pairing).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    entries: HashMap<ModuleKey, ModulePermission>,
}

impl PermissionSet {
    /// The fail-closed value: grants nothing on any module.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from raw store rows, normalizing module keys.
    ///
    /// The first row per module wins; the store should not hold duplicates,
    /// and silently widening grants by merging them would be the wrong
    /// direction to err in.
    pub fn from_rows(rows: impl IntoIterator<Item = PermissionRow>) -> Self {
        let mut entries: HashMap<ModuleKey, ModulePermission> = HashMap::new();
        for row in rows {
            let module = ModuleKey::normalize(&row.module);
            if entries.contains_key(&module) {
                tracing::debug!(module = %module, "duplicate permission row ignored");
                continue;
            }
            entries.insert(
                module.clone(),
                ModulePermission {
                    module,
                    can_view: row.can_view,
                    can_edit: row.can_edit,
                    can_delete: row.can_delete,
                },
            );
        }
        Self { entries }
    }

    pub fn get(&self, module: &ModuleKey) -> Option<&ModulePermission> {
        self.entries.get(module)
    }

    /// Capability check; a module with no entry grants nothing.
    pub fn allows(&self, module: &ModuleKey, capability: Capability) -> bool {
        self.get(module).is_some_and(|p| p.allows(capability))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModulePermission> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_normalized_on_ingest() {
        let set = PermissionSet::from_rows([PermissionRow::new("Contas-Pagar", true, true, false)]);
        let key = ModuleKey::normalize("contas-pagar");
        assert!(set.allows(&key, Capability::View));
        assert!(set.allows(&key, Capability::Edit));
        assert!(!set.allows(&key, Capability::Delete));
    }

    #[test]
    fn absent_module_grants_nothing() {
        let set = PermissionSet::from_rows([PermissionRow::new("pdv", true, true, true)]);
        let key = ModuleKey::normalize("contas-pagar");
        assert!(!set.allows(&key, Capability::View));
        assert!(!set.allows(&key, Capability::Edit));
        assert!(!set.allows(&key, Capability::Delete));
    }

    #[test]
    fn first_row_per_module_wins() {
        let set = PermissionSet::from_rows([
            PermissionRow::new("pdv", false, false, false),
            PermissionRow::new("pdv", true, true, true),
        ]);
        assert_eq!(set.len(), 1);
        assert!(!set.allows(&ModuleKey::normalize("pdv"), Capability::View));
    }

    #[test]
    fn empty_set_grants_nothing() {
        let set = PermissionSet::empty();
        assert!(set.is_empty());
        assert!(!set.allows(&ModuleKey::normalize("pdv"), Capability::View));
    }
}
