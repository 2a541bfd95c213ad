//! Parsing and structural validation of drawing and library files.
//!
//! Both parsers reject the whole document on malformed JSON or a wrong `type`
//! tag. Element id uniqueness is not checked here; it is enforced when
//! elements are merged.

use serde_json::{json, Map, Value};

use super::types::{Drawing, LibraryFile, DRAWING_TYPE, LIBRARY_TYPE};
use crate::error::{AideError, AideResult};

fn parse_object(content: &str, what: &str) -> AideResult<Map<String, Value>> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| AideError::InvalidFormat(format!("{what} is not valid JSON: {e}")))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(AideError::InvalidFormat(format!("{what} must be a JSON object"))),
    }
}

fn check_type(map: &Map<String, Value>, expected: &str, what: &str) -> AideResult<()> {
    match map.get("type").and_then(Value::as_str) {
        Some(tag) if tag == expected => Ok(()),
        Some(tag) => Err(AideError::InvalidFormat(format!(
            "{what} has type \"{tag}\", expected \"{expected}\""
        ))),
        None => Err(AideError::InvalidFormat(format!(
            "{what} is missing the \"type\" field"
        ))),
    }
}

pub fn parse_drawing_file(content: &str) -> AideResult<Drawing> {
    let map = parse_object(content, "drawing")?;
    check_type(&map, DRAWING_TYPE, "drawing")?;
    if !map.get("elements").is_some_and(Value::is_array) {
        return Err(AideError::InvalidFormat(
            "drawing \"elements\" must be an array".into(),
        ));
    }
    serde_json::from_value(Value::Object(map))
        .map_err(|e| AideError::InvalidFormat(format!("invalid drawing: {e}")))
}

/// Parse a library, rewriting the legacy `library: Element[][]` shape into
/// `libraryItems` with ids `item_<index>` and status `published`.
/// Files already carrying `libraryItems` are taken as they are.
pub fn parse_library_file(content: &str) -> AideResult<LibraryFile> {
    let mut map = parse_object(content, "library")?;
    check_type(&map, LIBRARY_TYPE, "library")?;

    if let Some(legacy) = map.remove("library") {
        if !map.contains_key("libraryItems") {
            map.insert("libraryItems".into(), normalize_legacy_items(legacy)?);
        }
    }

    serde_json::from_value(Value::Object(map))
        .map_err(|e| AideError::InvalidFormat(format!("invalid library: {e}")))
}

fn normalize_legacy_items(legacy: Value) -> AideResult<Value> {
    let Value::Array(groups) = legacy else {
        return Err(AideError::InvalidFormat(
            "legacy \"library\" must be an array of element arrays".into(),
        ));
    };
    let items = groups
        .into_iter()
        .enumerate()
        .map(|(index, elements)| {
            if !elements.is_array() {
                return Err(AideError::InvalidFormat(format!(
                    "legacy library entry {index} is not an element array"
                )));
            }
            Ok(json!({
                "id": format!("item_{index}"),
                "status": "published",
                "elements": elements,
            }))
        })
        .collect::<AideResult<Vec<_>>>()?;
    Ok(Value::Array(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: &str = r#"{"id":"a","type":"rectangle","x":0,"y":0,"width":10,"height":10}"#;

    #[test]
    fn wrong_type_tag_is_rejected() {
        let err = parse_drawing_file(r#"{"type":"excalidrawlib","version":2,"elements":[]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("expected \"excalidraw\""));
    }

    #[test]
    fn elements_must_be_array() {
        let err = parse_drawing_file(r#"{"type":"excalidraw","version":2,"elements":{}}"#)
            .unwrap_err();
        assert!(matches!(err, AideError::InvalidFormat(_)));
    }

    #[test]
    fn malformed_json_is_invalid_format() {
        assert!(matches!(
            parse_drawing_file("{not json"),
            Err(AideError::InvalidFormat(_))
        ));
    }

    #[test]
    fn unknown_fields_survive() {
        let content = format!(
            r#"{{"type":"excalidraw","version":2,"appState":{{"gridSize":20}},"elements":[{RECT}]}}"#
        );
        let drawing = parse_drawing_file(&content).unwrap();
        assert_eq!(drawing.extra["appState"]["gridSize"], 20);
        assert_eq!(drawing.elements.len(), 1);
    }

    #[test]
    fn duplicate_ids_are_accepted_at_parse_time() {
        let content = format!(r#"{{"type":"excalidraw","version":2,"elements":[{RECT},{RECT}]}}"#);
        assert_eq!(parse_drawing_file(&content).unwrap().elements.len(), 2);
    }

    #[test]
    fn legacy_library_is_normalized() {
        let content = format!(r#"{{"type":"excalidrawlib","version":1,"library":[[{RECT}],[{RECT},{RECT}]]}}"#);
        let library = parse_library_file(&content).unwrap();
        assert_eq!(library.library_items.len(), 2);
        assert_eq!(library.library_items[0].id, "item_0");
        assert_eq!(library.library_items[1].id, "item_1");
        assert_eq!(library.library_items[1].status, "published");
        assert_eq!(library.library_items[1].elements.len(), 2);
    }

    #[test]
    fn current_library_is_untouched() {
        let content = format!(
            r#"{{"type":"excalidrawlib","version":2,"libraryItems":[{{"id":"mine","status":"unpublished","elements":[{RECT}]}}]}}"#
        );
        let library = parse_library_file(&content).unwrap();
        assert_eq!(library.library_items[0].id, "mine");
        assert_eq!(library.library_items[0].status, "unpublished");
    }
}
