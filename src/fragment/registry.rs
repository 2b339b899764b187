//! Entity aggregation and the sealed symbol table
//!
//! The [`EntityRegistry`] collects entities as fragments produce them,
//! preserving insertion order (which the composer makes deterministic by
//! sorting fragments before running any) and rejecting duplicate keys with
//! both source paths in the error.
//!
//! Token resolution needs the complete key universe, so lookup is only
//! available after [`EntityRegistry::seal`], which consumes the registry and
//! returns a [`SealedRegistry`]: the ordered entries plus a [`SymbolTable`].
//! The type system enforces the ordering guarantee; there is no way to ask
//! "is key X registered" while registration is still open.

use std::collections::HashMap;

use serde_json::{Value, json};
use strsim::levenshtein;
use tracing::{debug, trace};

use super::{Entity, ReferenceForm};
use crate::core::{ComposeError, Result};
use crate::token::TokenExpr;

/// Maximum allowed Levenshtein distance as a percentage of the unknown key's
/// length for nearest-key suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// An entity together with the fragment unit that produced it.
#[derive(Debug, Clone)]
pub struct RegisteredEntity {
    /// The produced entity.
    pub entity: Entity,
    /// Relative path of the producing fragment unit, for diagnostics.
    pub source: String,
}

/// Insertion-ordered entity collection with duplicate detection
///
/// The registry is single-writer: one composer owns it for the duration of
/// aggregation. Nothing can be read back out until [`EntityRegistry::seal`].
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entries: Vec<RegisteredEntity>,
    index: HashMap<String, usize>,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity produced by the fragment at `source`
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Structural`] for an empty key and
    /// [`ComposeError::DuplicateKey`] when the key is already taken, naming
    /// both the first claimant and `source`.
    pub fn register(&mut self, entity: Entity, source: impl Into<String>) -> Result<()> {
        let source = source.into();
        if entity.key().is_empty() {
            return Err(ComposeError::Structural {
                path: source,
                reason: "produced an entity with an empty key".to_string(),
            });
        }
        if let Some(&first) = self.index.get(entity.key()) {
            return Err(ComposeError::DuplicateKey {
                key: entity.key().to_string(),
                first_source: self.entries[first].source.clone(),
                second_source: source,
            });
        }

        trace!(key = entity.key(), kind = entity.kind(), source = %source, "registered entity");
        self.index.insert(entity.key().to_string(), self.entries.len());
        self.entries.push(RegisteredEntity {
            entity,
            source,
        });
        Ok(())
    }

    /// Number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Close registration and expose the symbol table
    ///
    /// Consumes the registry, so no further entities can be added and the
    /// key universe the table answers for is complete.
    #[must_use]
    pub fn seal(self) -> SealedRegistry {
        debug!(entities = self.entries.len(), "sealed registry");
        let forms = self
            .entries
            .iter()
            .map(|r| (r.entity.key().to_string(), r.entity.reference().clone()))
            .collect();
        SealedRegistry {
            symbols: SymbolTable {
                forms,
            },
            entries: self.entries,
        }
    }
}

/// The result of sealing: ordered entries plus the symbol table
///
/// Fields are public so the resolve phase can borrow them disjointly,
/// walking the entries mutably while consulting the table.
#[derive(Debug)]
pub struct SealedRegistry {
    /// Key lookup over the complete entity universe.
    pub symbols: SymbolTable,
    /// Entities in registration order.
    pub entries: Vec<RegisteredEntity>,
}

/// Key lookup over a sealed registry
///
/// Maps each key to its declared reference form and renders reference
/// objects for token expressions. Only obtainable through
/// [`EntityRegistry::seal`].
#[derive(Debug)]
pub struct SymbolTable {
    forms: HashMap<String, ReferenceForm>,
}

impl SymbolTable {
    /// Render the reference object for a parsed token expression
    ///
    /// A bare key renders the entity's declared form; an attributed
    /// expression renders `Fn::GetAtt` with the written attribute. Returns
    /// `None` when the key is not registered.
    #[must_use]
    pub fn resolve(&self, expr: &TokenExpr<'_>) -> Option<Value> {
        let form = self.forms.get(expr.key)?;
        match expr.attribute {
            Some(attr) => Some(json!({ "Fn::GetAtt": [expr.key, attr] })),
            None => Some(form.render(expr.key)),
        }
    }

    /// Whether `key` is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.forms.contains_key(key)
    }

    /// Number of keys in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Find the registered key closest to `target` using Levenshtein distance
    ///
    /// Returns `None` when no key is within half of `target`'s length. Ties
    /// break lexicographically so the suggestion is deterministic.
    #[must_use]
    pub fn closest(&self, target: &str) -> Option<String> {
        let mut scored: Vec<_> = self
            .forms
            .keys()
            .map(|key| (levenshtein(target, key), key.clone()))
            .collect();

        scored.sort();

        scored
            .into_iter()
            .find(|(dist, _)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
            .map(|(_, key)| key)
    }
}
