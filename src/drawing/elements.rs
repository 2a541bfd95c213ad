//! Element id generation, merging, and summaries.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use super::types::ExcalidrawElement;
use crate::error::{AideError, AideResult};

pub const ELEMENT_ID_LEN: usize = 20;

/// Random alphanumeric id not present in `existing`.
///
/// Retries on collision; the loop, not the alphabet size, guarantees uniqueness.
pub fn generate_element_id(existing: &HashSet<String>) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let id: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(ELEMENT_ID_LEN)
            .map(char::from)
            .collect();
        if !existing.contains(&id) {
            return id;
        }
    }
}

/// Rename elements whose id was already seen, either in `existing_ids` or
/// earlier in `elements`. The first occurrence keeps its id.
///
/// Returns `(old, new)` for every rename, in element order.
pub fn ensure_unique_ids(
    elements: &mut [ExcalidrawElement],
    existing_ids: &HashSet<String>,
) -> Vec<(String, String)> {
    let mut seen = existing_ids.clone();
    let mut renamed = Vec::new();
    for element in elements.iter_mut() {
        if seen.contains(&element.id) {
            let fresh = generate_element_id(&seen);
            renamed.push((std::mem::replace(&mut element.id, fresh.clone()), fresh.clone()));
            seen.insert(fresh);
        } else {
            seen.insert(element.id.clone());
        }
    }
    renamed
}

#[derive(Debug, Clone, Copy)]
pub struct MergeOptions {
    /// Rename colliding ids instead of failing.
    pub regenerate_ids: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            regenerate_ids: true,
        }
    }
}

/// Append `new` after `existing`.
///
/// With `regenerate_ids`, colliding ids in `new` are renamed. Without it any
/// collision, with `existing` or inside `new`, is an [`AideError::ElementIdConflict`].
pub fn merge_elements(
    existing: Vec<ExcalidrawElement>,
    mut new: Vec<ExcalidrawElement>,
    options: MergeOptions,
) -> AideResult<Vec<ExcalidrawElement>> {
    let existing_ids: HashSet<String> = existing.iter().map(|e| e.id.clone()).collect();

    if options.regenerate_ids {
        let renamed = ensure_unique_ids(&mut new, &existing_ids);
        if !renamed.is_empty() {
            tracing::debug!(count = renamed.len(), "renamed colliding element ids");
        }
    } else {
        let mut seen = existing_ids;
        for element in &new {
            if !seen.insert(element.id.clone()) {
                return Err(AideError::ElementIdConflict(element.id.clone()));
            }
        }
    }

    let mut merged = existing;
    merged.extend(new);
    Ok(merged)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSummary {
    pub total: usize,
    pub type_counts: BTreeMap<String, usize>,
    pub bounds: Bounds,
}

/// Count elements per type and compute the union of their boxes.
/// An empty list yields a zero-sized box at the origin.
pub fn element_summary(elements: &[ExcalidrawElement]) -> ElementSummary {
    let mut type_counts = BTreeMap::new();
    for element in elements {
        *type_counts
            .entry(element.element_type.as_str().to_string())
            .or_insert(0) += 1;
    }

    let bounds = if elements.is_empty() {
        Bounds {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    } else {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for e in elements {
            // Line-like elements may carry negative extents.
            let (x0, x1) = ordered(e.x, e.x + e.width);
            let (y0, y1) = ordered(e.y, e.y + e.height);
            min_x = min_x.min(x0);
            min_y = min_y.min(y0);
            max_x = max_x.max(x1);
            max_y = max_y.max(y1);
        }
        Bounds {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    };

    ElementSummary {
        total: elements.len(),
        type_counts,
        bounds,
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::types::ElementType;

    fn rect(id: &str, x: f64, y: f64) -> ExcalidrawElement {
        ExcalidrawElement::new(id, ElementType::Rectangle, x, y, 10.0, 20.0)
    }

    #[test]
    fn generated_ids_are_alphanumeric() {
        let id = generate_element_id(&HashSet::new());
        assert_eq!(id.len(), ELEMENT_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn first_duplicate_keeps_its_id() {
        let mut batch = vec![rect("a", 0.0, 0.0), rect("a", 1.0, 1.0), rect("b", 2.0, 2.0)];
        let existing: HashSet<String> = ["b".to_string()].into_iter().collect();
        let renamed = ensure_unique_ids(&mut batch, &existing);

        assert_eq!(batch[0].id, "a");
        assert_ne!(batch[1].id, "a");
        assert_ne!(batch[2].id, "b");
        assert_eq!(renamed.len(), 2);
        assert_eq!(renamed[0].0, "a");
        assert_eq!(renamed[1].0, "b");
    }

    #[test]
    fn merge_without_regeneration_rejects_conflicts() {
        let err = merge_elements(
            vec![rect("a", 0.0, 0.0)],
            vec![rect("a", 5.0, 5.0)],
            MergeOptions { regenerate_ids: false },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Element ID conflict: a");
    }

    #[test]
    fn merge_keeps_existing_first() {
        let merged = merge_elements(
            vec![rect("a", 0.0, 0.0), rect("b", 0.0, 0.0)],
            vec![rect("c", 0.0, 0.0)],
            MergeOptions::default(),
        )
        .unwrap();
        let ids: Vec<_> = merged.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn repeated_merges_never_duplicate_ids() {
        let mut elements = Vec::new();
        for _ in 0..5 {
            let batch = vec![rect("x", 0.0, 0.0), rect("x", 0.0, 0.0), rect("y", 0.0, 0.0)];
            elements = merge_elements(elements, batch, MergeOptions::default()).unwrap();
        }
        let unique: HashSet<_> = elements.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(unique.len(), elements.len());
        assert_eq!(elements.len(), 15);
    }

    #[test]
    fn empty_summary_is_zero_box() {
        let summary = element_summary(&[]);
        assert_eq!(summary.total, 0);
        assert!(summary.type_counts.is_empty());
        assert_eq!(
            summary.bounds,
            Bounds { x: 0.0, y: 0.0, width: 0.0, height: 0.0 }
        );
    }

    #[test]
    fn summary_bounds_union() {
        let mut text = ExcalidrawElement::new("t", ElementType::Text, -5.0, 40.0, 30.0, 10.0);
        text.text = Some("hi".into());
        let summary = element_summary(&[rect("a", 0.0, 0.0), rect("b", 100.0, 10.0), text]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.type_counts["rectangle"], 2);
        assert_eq!(summary.type_counts["text"], 1);
        assert_eq!(summary.bounds, Bounds { x: -5.0, y: 0.0, width: 115.0, height: 50.0 });
    }
}
