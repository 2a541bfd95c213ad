//! Element compression against the design-system baseline, and the inverse
//! expansion that fills unset style fields from the current defaults.

use serde_json::{json, Map, Value};
use std::collections::HashSet;

use super::design_system::{StyleDefaults, TEXT_ONLY_KEYS};
use super::elements::generate_element_id;
use super::types::{ElementType, ExcalidrawElement};
use crate::error::{AideError, AideResult};

const DEFAULT_SHAPE_SIZE: f64 = 100.0;

/// Keep `value` only when it is not one of the known defaults for its field.
fn unless<T: PartialEq>(value: &Option<T>, defaults: &[T]) -> Option<T>
where
    T: Clone,
{
    value.as_ref().filter(|v| !defaults.contains(v)).cloned()
}

/// Copy of `element` with every field equal to a known default dropped.
///
/// Identity and geometry (`id`, `type`, `x`, `y`, `width`, `height`) are
/// always kept, as are `seed`, `text`, and extra fields other than nulls.
pub fn compress_element(element: &ExcalidrawElement) -> ExcalidrawElement {
    let mut out = ExcalidrawElement::new(
        element.id.clone(),
        element.element_type,
        element.x,
        element.y,
        element.width,
        element.height,
    );

    out.angle = unless(&element.angle, &[0.0]);
    out.stroke_color = unless(&element.stroke_color, &["#000000".to_string(), "#1e1e1e".to_string()]);
    out.background_color = unless(&element.background_color, &["transparent".to_string()]);
    out.fill_style = unless(&element.fill_style, &["solid".to_string(), "hachure".to_string()]);
    out.stroke_width = unless(&element.stroke_width, &[1.0, 2.0]);
    out.stroke_style = unless(&element.stroke_style, &["solid".to_string()]);
    out.roughness = unless(&element.roughness, &[0.0, 1.0]);
    out.opacity = unless(&element.opacity, &[100.0]);
    out.roundness = unless(&element.roundness, &[json!({"type": 1})]);
    out.text = element.text.clone();
    out.font_size = unless(&element.font_size, &[20.0]);
    out.font_family = unless(&element.font_family, &[1]);
    out.text_align = unless(&element.text_align, &["left".to_string()]);
    out.vertical_align = unless(&element.vertical_align, &["top".to_string()]);
    out.version = unless(&element.version, &[1]);
    out.seed = element.seed;
    out.group_ids = element.group_ids.clone();
    out.extra = element
        .extra
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    out
}

fn fill(map: &mut Map<String, Value>, key: &str, value: impl FnOnce() -> Value) {
    if map.get(key).map_or(true, Value::is_null) {
        map.insert(key.to_string(), value());
    }
}

/// Build a full element from a partial one.
///
/// Missing identity and geometry get a fresh id, `rectangle`, the origin, and
/// a 100x100 box; every unset style field comes from `defaults` (font fields
/// only for text elements). `version` starts at 1 and `seed` is random.
pub fn apply_style_defaults(
    partial: Map<String, Value>,
    defaults: &StyleDefaults,
) -> AideResult<ExcalidrawElement> {
    let mut map = partial;

    fill(&mut map, "id", || json!(generate_element_id(&HashSet::new())));
    fill(&mut map, "type", || json!(ElementType::Rectangle.as_str()));
    let is_text = map.get("type").and_then(Value::as_str) == Some(ElementType::Text.as_str());

    fill(&mut map, "x", || json!(0.0));
    fill(&mut map, "y", || json!(0.0));
    fill(&mut map, "width", || json!(DEFAULT_SHAPE_SIZE));
    fill(&mut map, "height", || json!(DEFAULT_SHAPE_SIZE));
    fill(&mut map, "angle", || json!(0.0));

    let Value::Object(style) = serde_json::to_value(defaults)? else {
        return Err(AideError::Serialization("style defaults must be an object".into()));
    };
    for (key, value) in style {
        if !is_text && TEXT_ONLY_KEYS.contains(&key.as_str()) {
            continue;
        }
        if value.is_null() {
            continue;
        }
        fill(&mut map, &key, || value);
    }

    fill(&mut map, "version", || json!(1));
    fill(&mut map, "seed", || json!(rand::random::<u32>()));

    serde_json::from_value(Value::Object(map))
        .map_err(|e| AideError::InvalidFormat(format!("invalid element: {e}")))
}

/// Expand a stored element back to full form with `defaults`.
pub fn expand_element(
    element: &ExcalidrawElement,
    defaults: &StyleDefaults,
) -> AideResult<ExcalidrawElement> {
    let Value::Object(map) = serde_json::to_value(element)? else {
        return Err(AideError::Serialization("element must serialize to an object".into()));
    };
    apply_style_defaults(map, defaults)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn compress_drops_known_defaults() {
        let mut e = ExcalidrawElement::new("a", ElementType::Rectangle, 1.0, 2.0, 3.0, 4.0);
        e.stroke_width = Some(1.0);
        e.opacity = Some(100.0);
        e.roundness = Some(json!({"type": 1}));
        e.stroke_color = Some("#e03131".into());
        e.extra.insert("link".into(), Value::Null);
        e.extra.insert("locked".into(), json!(true));

        let c = compress_element(&e);
        assert_eq!(c.stroke_width, None);
        assert_eq!(c.opacity, None);
        assert_eq!(c.roundness, None);
        assert_eq!(c.stroke_color.as_deref(), Some("#e03131"));
        assert!(!c.extra.contains_key("link"));
        assert_eq!(c.extra["locked"], true);
        assert_eq!((c.x, c.y, c.width, c.height), (1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn defaults_fill_only_unset_fields() {
        let defaults = StyleDefaults::default();
        let e = apply_style_defaults(
            partial(json!({"type": "ellipse", "x": 10, "y": 20, "strokeColor": "#2f9e44"})),
            &defaults,
        )
        .unwrap();
        assert_eq!(e.element_type, ElementType::Ellipse);
        assert_eq!(e.stroke_color.as_deref(), Some("#2f9e44"));
        assert_eq!(e.stroke_width, Some(2.0));
        assert_eq!(e.width, 100.0);
        assert_eq!(e.font_size, None);
        assert_eq!(e.version, Some(1));
        assert!(e.seed.is_some());
        assert_eq!(e.id.len(), 20);
    }

    #[test]
    fn text_elements_get_font_defaults() {
        let e = apply_style_defaults(
            partial(json!({"type": "text", "text": "hello"})),
            &StyleDefaults::default(),
        )
        .unwrap();
        assert_eq!(e.font_size, Some(20.0));
        assert_eq!(e.font_family, Some(1));
        assert_eq!(e.text_align.as_deref(), Some("left"));
    }

    #[test]
    fn compress_then_expand_restores_default_built_elements() {
        let defaults = StyleDefaults::default();
        for kind in ["rectangle", "text", "arrow"] {
            let original = apply_style_defaults(
                partial(json!({"type": kind, "x": 5, "y": 6, "width": 70, "height": 30})),
                &defaults,
            )
            .unwrap();
            let restored = expand_element(&compress_element(&original), &defaults).unwrap();
            assert_eq!(restored, original, "round trip failed for {kind}");
        }
    }

    #[test]
    fn unknown_element_type_is_invalid() {
        let err = apply_style_defaults(partial(json!({"type": "hexagon"})), &StyleDefaults::default())
            .unwrap_err();
        assert!(matches!(err, AideError::InvalidFormat(_)));
    }
}
