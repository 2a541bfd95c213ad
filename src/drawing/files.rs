//! The drawings directory: one `.excalidraw` JSON file per drawing, plus
//! `.excalidrawlib` libraries. Each call reads the whole file and writes the
//! whole file back; writers hold the directory lock for the whole cycle.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::compress::{apply_style_defaults, compress_element};
use super::design_system::DesignSystemStore;
use super::elements::{element_summary, merge_elements, ElementSummary, MergeOptions};
use super::parse::{parse_drawing_file, parse_library_file};
use super::types::{Drawing, LibraryFile};
use crate::error::{AideError, AideResult};
use crate::store::write_atomic;

pub const DRAWING_EXTENSION: &str = "excalidraw";
pub const LIBRARY_EXTENSION: &str = "excalidrawlib";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingListing {
    pub name: String,
    pub title: Option<String>,
    pub element_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendResult {
    pub name: String,
    pub added_ids: Vec<String>,
    pub summary: ElementSummary,
}

pub struct DrawingFiles {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl DrawingFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Resolve a drawing name to a file inside the directory.
    /// Names are single path segments; a trailing extension is optional.
    fn resolve(&self, name: &str, extension: &str) -> AideResult<PathBuf> {
        let name = name.trim();
        let stem = name
            .strip_suffix(&format!(".{extension}"))
            .unwrap_or(name);
        if stem.is_empty()
            || stem.starts_with('.')
            || stem.contains(['/', '\\'])
            || stem.contains("..")
        {
            return Err(AideError::InvalidFormat(format!("invalid drawing name: {name}")));
        }
        Ok(self.dir.join(format!("{stem}.{extension}")))
    }

    fn read_file(path: &Path, name: &str) -> AideResult<String> {
        fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AideError::NotFound(format!("drawing {name}")),
            _ => AideError::io(path, e),
        })
    }

    pub fn create(&self, name: &str, title: Option<String>) -> AideResult<Drawing> {
        let path = self.resolve(name, DRAWING_EXTENSION)?;
        let _guard = self.lock_writes();
        if path.exists() {
            return Err(AideError::AlreadyExists(format!("drawing {name}")));
        }
        let drawing = Drawing::new(title);
        self.write_to(&path, &drawing)?;
        tracing::info!(path = %path.display(), "drawing created");
        Ok(drawing)
    }

    pub fn read(&self, name: &str) -> AideResult<Drawing> {
        let path = self.resolve(name, DRAWING_EXTENSION)?;
        parse_drawing_file(&Self::read_file(&path, name)?)
    }

    /// Read a drawing with every element compressed against the baseline defaults.
    pub fn read_compressed(&self, name: &str) -> AideResult<Drawing> {
        let mut drawing = self.read(name)?;
        drawing.elements = drawing.elements.iter().map(compress_element).collect();
        Ok(drawing)
    }

    pub fn write(&self, name: &str, drawing: &Drawing) -> AideResult<()> {
        let path = self.resolve(name, DRAWING_EXTENSION)?;
        let _guard = self.lock_writes();
        self.write_to(&path, drawing)
    }

    fn write_to(&self, path: &Path, drawing: &Drawing) -> AideResult<()> {
        let json = serde_json::to_string_pretty(drawing)?;
        write_atomic(path, json.as_bytes())
    }

    /// Expand `partials` with the current design-system defaults and append
    /// them to the drawing. The file is written only after the full element
    /// list has been built.
    pub fn append_elements(
        &self,
        name: &str,
        partials: Vec<Map<String, Value>>,
        design: &DesignSystemStore,
        options: MergeOptions,
    ) -> AideResult<AppendResult> {
        let path = self.resolve(name, DRAWING_EXTENSION)?;
        let defaults = design.get()?.defaults;
        let _guard = self.lock_writes();
        let mut drawing = parse_drawing_file(&Self::read_file(&path, name)?)?;

        let new = partials
            .into_iter()
            .map(|partial| apply_style_defaults(partial, &defaults))
            .collect::<AideResult<Vec<_>>>()?;
        let added = new.len();

        drawing.elements = merge_elements(std::mem::take(&mut drawing.elements), new, options)?;
        self.write_to(&path, &drawing)?;

        let added_ids = drawing.elements[drawing.elements.len() - added..]
            .iter()
            .map(|e| e.id.clone())
            .collect();
        tracing::info!(drawing = %name, added, total = drawing.elements.len(), "elements appended");
        Ok(AppendResult {
            name: name.to_string(),
            added_ids,
            summary: element_summary(&drawing.elements),
        })
    }

    pub fn summary(&self, name: &str) -> AideResult<ElementSummary> {
        Ok(element_summary(&self.read(name)?.elements))
    }

    pub fn delete(&self, name: &str) -> AideResult<()> {
        let path = self.resolve(name, DRAWING_EXTENSION)?;
        let _guard = self.lock_writes();
        fs::remove_file(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AideError::NotFound(format!("drawing {name}")),
            _ => AideError::io(&path, e),
        })
    }

    /// All drawings in the directory, sorted by name. Unparsable files are
    /// skipped with a warning.
    pub fn list(&self) -> AideResult<Vec<DrawingListing>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AideError::io(&self.dir, e)),
        };

        let mut listings = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| AideError::io(&self.dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DRAWING_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem.starts_with('.') {
                continue;
            }
            match fs::read_to_string(&path)
                .map_err(|e| AideError::io(&path, e))
                .and_then(|content| parse_drawing_file(&content))
            {
                Ok(drawing) => listings.push(DrawingListing {
                    name: stem.to_string(),
                    title: drawing.title,
                    element_count: drawing.elements.len(),
                }),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable drawing");
                }
            }
        }
        listings.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listings)
    }

    pub fn read_library(&self, name: &str) -> AideResult<LibraryFile> {
        let path = self.resolve(name, LIBRARY_EXTENSION)?;
        parse_library_file(&Self::read_file(&path, name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn names_cannot_escape_directory() {
        let files = DrawingFiles::new("/tmp/drawings");
        assert!(files.resolve("../etc/passwd", DRAWING_EXTENSION).is_err());
        assert!(files.resolve("a/b", DRAWING_EXTENSION).is_err());
        assert!(files.resolve("", DRAWING_EXTENSION).is_err());
        assert_eq!(
            files.resolve("plan.excalidraw", DRAWING_EXTENSION).unwrap(),
            PathBuf::from("/tmp/drawings/plan.excalidraw")
        );
    }

    #[test]
    fn create_twice_is_already_exists() {
        let tmp = TempDir::new().unwrap();
        let files = DrawingFiles::new(tmp.path());
        files.create("plan", None).unwrap();
        assert!(matches!(files.create("plan", None), Err(AideError::AlreadyExists(_))));
    }

    #[test]
    fn explicit_id_conflict_leaves_file_unchanged() {
        let tmp = TempDir::new().unwrap();
        let files = DrawingFiles::new(tmp.path().join("drawings"));
        let design = DesignSystemStore::new(tmp.path().join("design-system.yaml"));
        files.create("plan", None).unwrap();

        let first = json!({"id": "box", "type": "rectangle"}).as_object().unwrap().clone();
        files
            .append_elements("plan", vec![first.clone()], &design, MergeOptions::default())
            .unwrap();

        let err = files
            .append_elements("plan", vec![first], &design, MergeOptions { regenerate_ids: false })
            .unwrap_err();
        assert!(matches!(err, AideError::ElementIdConflict(_)));
        assert_eq!(files.read("plan").unwrap().elements.len(), 1);
    }

    #[test]
    fn list_skips_broken_files() {
        let tmp = TempDir::new().unwrap();
        let files = DrawingFiles::new(tmp.path());
        files.create("good", Some("Good".into())).unwrap();
        fs::write(tmp.path().join("bad.excalidraw"), "{oops").unwrap();

        let listings = files.list().unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].name, "good");
        assert_eq!(listings[0].title.as_deref(), Some("Good"));
    }
}
