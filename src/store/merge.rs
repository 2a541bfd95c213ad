use serde_json::Value;

/// Recursively merge `partial` into `target`.
///
/// When both sides hold a plain object at the same key the merge recurses;
/// in every other case (arrays, scalars, null, type mismatch) the incoming
/// value replaces the existing one wholesale.
pub fn deep_merge(target: &mut Value, partial: Value) {
    match (target, partial) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                if let Some(slot) = existing.get_mut(&key) {
                    if slot.is_object() && value.is_object() {
                        deep_merge(slot, value);
                        continue;
                    }
                }
                existing.insert(key, value);
            }
        }
        (target, partial) => *target = partial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_merge() {
        let mut doc = json!({"data": {"settings": {"currency": "USD"}, "goals": []}});
        deep_merge(&mut doc, json!({"data": {"settings": {"currency": "EUR"}}}));
        assert_eq!(doc, json!({"data": {"settings": {"currency": "EUR"}, "goals": []}}));
    }

    #[test]
    fn arrays_are_replaced_not_patched() {
        let mut doc = json!({"goals": [{"id": "g1"}, {"id": "g2"}]});
        deep_merge(&mut doc, json!({"goals": [{"id": "g3"}]}));
        assert_eq!(doc, json!({"goals": [{"id": "g3"}]}));
    }

    #[test]
    fn object_replaced_by_scalar() {
        let mut doc = json!({"meta": {"a": 1}});
        deep_merge(&mut doc, json!({"meta": 7, "new": true}));
        assert_eq!(doc, json!({"meta": 7, "new": true}));
    }
}
