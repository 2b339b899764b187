//! Token resolution over registered entities
//!
//! Walks every property tree depth-first and rewrites each string leaf that
//! is exactly one placeholder token into the reference object the symbol
//! table prescribes. Literals pass through untouched, including strings with
//! embedded or repeated markers; only the exact-form leaf is a token.
//! Resolution is fail-fast: the first malformed or unresolvable token aborts
//! with the owning entity named.

use serde_json::Value;

use crate::core::{ComposeError, Result};
use crate::fragment::registry::{RegisteredEntity, SymbolTable};
use crate::token::{self, Scan};

/// Resolve every token in every registered entity, in place.
///
/// Returns the number of rewritten leaves.
///
/// # Errors
///
/// Returns [`ComposeError::MalformedToken`] for a leaf with broken marker
/// syntax and [`ComposeError::UnresolvedToken`] for a token whose key is not
/// registered, the latter carrying the closest registered key as a
/// suggestion.
pub(crate) fn resolve_entities(
    entries: &mut [RegisteredEntity],
    symbols: &SymbolTable,
) -> Result<usize> {
    let mut resolved = 0;
    for entry in entries {
        let entity_key = entry.entity.key().to_string();
        resolved += resolve_value(entry.entity.properties_mut(), &entity_key, symbols)?;
    }
    Ok(resolved)
}

fn resolve_value(value: &mut Value, entity: &str, symbols: &SymbolTable) -> Result<usize> {
    match value {
        Value::String(leaf) => match resolve_leaf(leaf, entity, symbols)? {
            Some(replacement) => {
                *value = replacement;
                Ok(1)
            }
            None => Ok(0),
        },
        Value::Array(items) => {
            let mut count = 0;
            for item in items {
                count += resolve_value(item, entity, symbols)?;
            }
            Ok(count)
        }
        Value::Object(map) => {
            let mut count = 0;
            for item in map.values_mut() {
                count += resolve_value(item, entity, symbols)?;
            }
            Ok(count)
        }
        _ => Ok(0),
    }
}

/// Resolve one string leaf, returning the replacement when the leaf is a
/// token and `None` when it is literal text.
fn resolve_leaf(leaf: &str, entity: &str, symbols: &SymbolTable) -> Result<Option<Value>> {
    match token::scan(leaf) {
        Scan::Literal => Ok(None),
        Scan::Malformed {
            reason,
        } => Err(ComposeError::MalformedToken {
            entity: entity.to_string(),
            token: leaf.to_string(),
            reason: reason.to_string(),
        }),
        Scan::Expression(expr) => {
            let parsed =
                token::parse_expr(expr).map_err(|reason| ComposeError::MalformedToken {
                    entity: entity.to_string(),
                    token: leaf.to_string(),
                    reason: reason.to_string(),
                })?;
            match symbols.resolve(&parsed) {
                Some(rendered) => Ok(Some(rendered)),
                None => Err(ComposeError::UnresolvedToken {
                    entity: entity.to_string(),
                    token: leaf.to_string(),
                    closest: symbols.closest(parsed.key),
                }),
            }
        }
    }
}
