//! Flat markdown notes under a single root directory.
//!
//! Note paths are relative to the root. Absolute paths and `..` segments are
//! refused so a tool call cannot reach outside the notes directory.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{AideError, AideResult};
use crate::store::write_atomic;

const NOTE_EXTENSION: &str = "md";

#[derive(Debug, Serialize)]
pub struct Note {
    pub path: String,
    pub content: String,
}

pub struct NoteStore {
    root: PathBuf,
}

impl NoteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative: &str) -> AideResult<PathBuf> {
        let relative = relative.trim();
        let path = Path::new(relative);
        if relative.is_empty()
            || path
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(AideError::InvalidFormat(format!("invalid note path: {relative}")));
        }
        Ok(self.root.join(path))
    }

    pub fn write_note(&self, path: &str, content: &str) -> AideResult<()> {
        let full = self.resolve(path)?;
        write_atomic(&full, content.as_bytes())?;
        tracing::debug!(path = %full.display(), "note written");
        Ok(())
    }

    pub fn read_note(&self, path: &str) -> AideResult<Note> {
        let full = self.resolve(path)?;
        let content = fs::read_to_string(&full).map_err(|e| not_found_or_io(e, &full, path))?;
        Ok(Note {
            path: path.to_string(),
            content,
        })
    }

    pub fn delete_note(&self, path: &str) -> AideResult<()> {
        let full = self.resolve(path)?;
        fs::remove_file(&full).map_err(|e| not_found_or_io(e, &full, path))
    }

    pub fn move_note(&self, old_path: &str, new_path: &str) -> AideResult<()> {
        let from = self.resolve(old_path)?;
        let to = self.resolve(new_path)?;
        if !from.is_file() {
            return Err(AideError::NotFound(format!("note {old_path}")));
        }
        if to.exists() {
            return Err(AideError::AlreadyExists(format!("note {new_path}")));
        }
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|e| AideError::io(parent, e))?;
        }
        fs::rename(&from, &to).map_err(|e| AideError::io(&from, e))
    }

    /// A free relative path for a note titled `title`: `<slug>.md`, then
    /// `<slug>-2.md`, `<slug>-3.md`, ... when taken.
    pub fn generate_note_path(&self, title: &str) -> String {
        let slug = slugify(title);
        let mut candidate = format!("{slug}.{NOTE_EXTENSION}");
        let mut n = 2;
        while self.root.join(&candidate).exists() {
            candidate = format!("{slug}-{n}.{NOTE_EXTENSION}");
            n += 1;
        }
        candidate
    }

    /// Every markdown note under the root, as sorted relative paths.
    pub fn list_notes(&self) -> AideResult<Vec<String>> {
        let mut out = Vec::new();
        collect_notes(&self.root, &self.root, &mut out)?;
        out.sort();
        Ok(out)
    }
}

fn not_found_or_io(err: io::Error, full: &Path, relative: &str) -> AideError {
    if err.kind() == io::ErrorKind::NotFound {
        AideError::NotFound(format!("note {relative}"))
    } else {
        AideError::io(full, err)
    }
}

fn collect_notes(root: &Path, dir: &Path, out: &mut Vec<String>) -> AideResult<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(AideError::io(dir, e)),
    };
    for entry in entries {
        let path = entry.map_err(|e| AideError::io(dir, e))?.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if hidden {
            continue;
        }
        if path.is_dir() {
            collect_notes(root, &path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(NOTE_EXTENSION) {
            if let Ok(relative) = path.strip_prefix(root) {
                out.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    Ok(())
}

/// Lowercase ASCII slug; runs of other characters collapse to one `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "note".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("  Weekly Review: Q3 / 2026!  "), "weekly-review-q3-2026");
        assert_eq!(slugify("???"), "note");
    }

    #[test]
    fn generated_paths_avoid_existing_notes() {
        let tmp = TempDir::new().unwrap();
        let notes = NoteStore::new(tmp.path());
        let first = notes.generate_note_path("Trip plan");
        assert_eq!(first, "trip-plan.md");
        notes.write_note(&first, "# Trip").unwrap();
        assert_eq!(notes.generate_note_path("Trip plan"), "trip-plan-2.md");
    }

    #[test]
    fn paths_are_confined_to_root() {
        let tmp = TempDir::new().unwrap();
        let notes = NoteStore::new(tmp.path());
        assert!(notes.write_note("../escape.md", "x").is_err());
        assert!(notes.write_note("/etc/passwd", "x").is_err());
    }

    #[test]
    fn move_and_list() {
        let tmp = TempDir::new().unwrap();
        let notes = NoteStore::new(tmp.path());
        notes.write_note("inbox/a.md", "A").unwrap();
        notes.write_note("b.md", "B").unwrap();
        notes.move_note("inbox/a.md", "archive/a.md").unwrap();

        assert_eq!(notes.list_notes().unwrap(), vec!["archive/a.md", "b.md"]);
        assert_eq!(notes.read_note("archive/a.md").unwrap().content, "A");
        assert!(matches!(notes.read_note("inbox/a.md"), Err(AideError::NotFound(_))));
        assert!(matches!(
            notes.move_note("b.md", "archive/a.md"),
            Err(AideError::AlreadyExists(_))
        ));
    }
}
