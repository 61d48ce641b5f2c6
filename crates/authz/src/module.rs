//! Module-key normalization.
//!
//! UI routes address modules with hyphenated slugs (`contas-pagar`) while the
//! permission store keys its rows by underscore-separated names
//! (`contas_pagar`). Everything that touches the permission set goes through
//! [`ModuleKey::normalize`] first, so the two conventions can never be
//! compared against each other by accident.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Normalized module key (the storage-side naming convention).
///
/// The only constructor is [`ModuleKey::normalize`]; holding a `ModuleKey` is
/// proof the conversion already happened.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleKey(Cow<'static, str>);

/// Route slug → storage key, for modules whose names differ beyond the
/// mechanical hyphen/underscore swap. Keys absent here fall through to the
/// deterministic transform in [`ModuleKey::normalize`].
///
/// Alias targets must themselves be normalized, otherwise normalization
/// stops being idempotent (covered by a property test below).
static MODULE_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        // legacy route name for the register screen
        ("caixa", "pdv"),
        ("ponto-de-venda", "pdv"),
        ("estoque", "produtos"),
        ("cadastro-clientes", "clientes"),
        ("cadastro-fornecedores", "fornecedores"),
        ("admin-dominios", "dominios"),
    ])
});

impl ModuleKey {
    /// Map a caller-supplied module key onto the storage convention.
    ///
    /// Total and idempotent: trims and lowercases, consults the alias table,
    /// and otherwise swaps hyphens for underscores. Every input produces
    /// exactly one output and re-normalizing is a no-op.
    pub fn normalize(raw: &str) -> Self {
        let key = raw.trim().to_lowercase();
        match MODULE_ALIASES.get(key.as_str()) {
            Some(mapped) => Self(Cow::Borrowed(mapped)),
            None => Self(Cow::Owned(key.replace('-', "_"))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn hyphenated_route_slugs_map_to_underscores() {
        assert_eq!(ModuleKey::normalize("contas-pagar").as_str(), "contas_pagar");
        assert_eq!(ModuleKey::normalize("contas-receber").as_str(), "contas_receber");
        assert_eq!(ModuleKey::normalize("pdv").as_str(), "pdv");
    }

    #[test]
    fn alias_table_overrides_the_mechanical_transform() {
        assert_eq!(ModuleKey::normalize("caixa").as_str(), "pdv");
        assert_eq!(ModuleKey::normalize("ponto-de-venda").as_str(), "pdv");
        assert_eq!(ModuleKey::normalize("estoque").as_str(), "produtos");
        assert_eq!(ModuleKey::normalize("cadastro-clientes").as_str(), "clientes");
    }

    #[test]
    fn input_is_trimmed_and_lowercased() {
        assert_eq!(ModuleKey::normalize("  Contas-Pagar ").as_str(), "contas_pagar");
        assert_eq!(ModuleKey::normalize("PDV").as_str(), "pdv");
    }

    #[test]
    fn alias_targets_are_already_normalized() {
        for target in MODULE_ALIASES.values() {
            assert_eq!(ModuleKey::normalize(target).as_str(), *target);
        }
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(raw in "\\PC{0,40}") {
            let once = ModuleKey::normalize(&raw);
            let twice = ModuleKey::normalize(once.as_str());
            prop_assert_eq!(once, twice);
        }
    }
}
