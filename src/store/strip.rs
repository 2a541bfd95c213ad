//! Default-stripping serialization.
//!
//! Each document kind provides a table of per-entity default values and the
//! entity kind of each nested field. [`strip_defaults`] walks the serialized
//! document with that table and, at each entity level, drops fields equal to
//! their declared default, nulls, and empty collections. Free-form maps below
//! an entity are written untouched. Serde's `#[serde(default)]` attributes on the
//! document types restore the dropped values on the next read, so the same
//! defaults must appear in both places.

use serde_json::{Map, Value};

/// Per-entity default table, dispatched by variant.
pub trait EntityKind: Copy {
    /// The declared default for `field`, if it has one.
    fn default_for(self, field: &str) -> Option<Value>;

    /// The entity kind held by `field` (for arrays, the kind of each element).
    fn child(self, field: &str) -> Option<Self>;
}

pub fn strip_defaults<K: EntityKind>(value: Value, root: K) -> Value {
    strip_value(value, root)
}

fn strip_value<K: EntityKind>(value: Value, kind: K) -> Value {
    match value {
        Value::Object(map) => Value::Object(strip_object(map, kind)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(|item| strip_value(item, kind))
                .collect(),
        ),
        other => other,
    }
}

/// Strip one entity's fields. Fields without a child kind hold free-form
/// data and are kept as they are below this level.
fn strip_object<K: EntityKind>(map: Map<String, Value>, kind: K) -> Map<String, Value> {
    let mut out = Map::with_capacity(map.len());
    for (field, value) in map {
        if value.is_null() || kind.default_for(&field).as_ref() == Some(&value) {
            continue;
        }
        let value = match kind.child(&field) {
            Some(child) => strip_value(value, child),
            None => value,
        };
        if is_empty_collection(&value) {
            continue;
        }
        out.insert(field, value);
    }
    out
}

fn is_empty_collection(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
