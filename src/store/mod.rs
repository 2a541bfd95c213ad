//! Generic typed-document storage.
//!
//! A [`DocumentStore`] owns one YAML file holding one schema-validated document.
//! Reads never fail: a missing, empty, unparsable, or invalid file yields the
//! configured default (see [`DocumentStore::load`] for the distinguishable
//! variant). Writes validate first and touch disk only after validation passes.
//!
//! Every write goes through a per-store lock, and [`DocumentStore::modify`]
//! holds it across the whole read-modify-write, so concurrent tool calls on
//! one store never overwrite each other's changes. Share one store per file.

pub mod ids;
pub mod merge;
pub mod strip;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AideError, AideResult};
use strip::EntityKind;

/// A persisted document kind with its own structural rules.
///
/// Serde handles field types and default filling; `validate` covers the
/// cross-field invariants serde cannot express (unique ids, non-empty tags).
pub trait Document: Serialize + DeserializeOwned + Clone {
    fn validate(&self) -> AideResult<()>;
}

type Serializer = Box<dyn Fn(Value) -> Value + Send + Sync>;

/// Outcome of a read: the document plus whether it was substituted for bad data.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub document: T,
    /// `true` when the file existed with content but could not be read, parsed,
    /// or validated, and the default was returned in its place.
    pub recovered: bool,
}

pub struct DocumentStore<T> {
    path: PathBuf,
    default: T,
    serializer: Option<Serializer>,
    write_lock: Mutex<()>,
}

impl<T: Document> DocumentStore<T> {
    pub fn new(path: impl Into<PathBuf>, default: T) -> Self {
        Self {
            path: path.into(),
            default,
            serializer: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Strip default-valued and empty fields on save, walking the document
    /// from `root` through the entity kind's child table.
    pub fn with_default_stripping<K>(mut self, root: K) -> Self
    where
        K: EntityKind + Send + Sync + 'static,
    {
        self.serializer = Some(Box::new(move |value| strip::strip_defaults(value, root)));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, falling back to the default on any read problem.
    pub fn get(&self) -> T {
        self.load().document
    }

    /// Like [`get`](Self::get), but reports whether bad data was discarded.
    pub fn load(&self) -> Loaded<T> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return self.fallback(false);
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "document unreadable, using default");
                return self.fallback(true);
            }
        };

        if contents.trim().is_empty() {
            return self.fallback(false);
        }

        match self.parse(&contents) {
            Ok(document) => {
                tracing::debug!(path = %self.path.display(), "document loaded");
                Loaded {
                    document,
                    recovered: false,
                }
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "document invalid, using default");
                self.fallback(true)
            }
        }
    }

    /// Strict read for health checks: every failure is reported.
    /// A missing file is not an error (first run).
    pub fn validate_file(&self) -> AideResult<Option<T>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AideError::io(&self.path, err)),
        };
        if contents.trim().is_empty() {
            return Ok(None);
        }
        self.parse(&contents).map(Some)
    }

    /// Validate, serialize, and write `doc`. Nothing is written on validation failure.
    pub fn save(&self, doc: &T) -> AideResult<()> {
        let _guard = self.lock_writes();
        self.write(doc)
    }

    /// Write `doc` to another path using this store's serialization (backups).
    pub fn save_copy(&self, doc: &T, path: &Path) -> AideResult<()> {
        let rendered = self.render(doc)?;
        write_atomic(path, rendered.as_bytes())
    }

    /// Read-modify-write: deep-merge `partial` into the current document.
    ///
    /// Objects merge recursively; arrays and scalars in `partial` replace the
    /// stored value wholesale. To change one goal, pass the full `goals` array.
    pub fn update(&self, partial: Value) -> AideResult<T> {
        let _guard = self.lock_writes();
        let mut current = serde_json::to_value(self.get())?;
        merge::deep_merge(&mut current, partial);
        let merged: T = serde_json::from_value(current)
            .map_err(|e| AideError::SchemaValidation(e.to_string()))?;
        self.write(&merged)?;
        Ok(merged)
    }

    /// Read the current document, let `edit` change it in place, and write it
    /// back, all under the write lock. Nothing is written when `edit` fails or
    /// the edited document does not validate.
    ///
    /// `edit` must not call back into this store's writing methods.
    pub fn modify<R, F>(&self, edit: F) -> AideResult<R>
    where
        F: FnOnce(&mut T) -> AideResult<R>,
    {
        let _guard = self.lock_writes();
        let mut doc = self.get();
        let out = edit(&mut doc)?;
        self.write(&doc)?;
        Ok(out)
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self, doc: &T) -> AideResult<()> {
        let rendered = self.render(doc)?;
        write_atomic(&self.path, rendered.as_bytes())?;
        tracing::debug!(path = %self.path.display(), "document saved");
        Ok(())
    }

    fn render(&self, doc: &T) -> AideResult<String> {
        doc.validate()?;
        let mut value = serde_json::to_value(doc)?;
        if let Some(serializer) = &self.serializer {
            value = serializer(value);
        }
        Ok(serde_yaml::to_string(&value)?)
    }

    fn parse(&self, contents: &str) -> AideResult<T> {
        let document: T = serde_yaml::from_str(contents)
            .map_err(|e| AideError::InvalidFormat(e.to_string()))?;
        document.validate()?;
        Ok(document)
    }

    fn fallback(&self, recovered: bool) -> Loaded<T> {
        Loaded {
            document: self.default.clone(),
            recovered,
        }
    }
}

/// Write through a sibling temp file and rename into place.
/// Parent directories are created as needed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> AideResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| AideError::io(parent, e))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| AideError::io(path, io::Error::other("path has no file name")))?;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".aide.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let result = (|| {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, path)
    })();

    if let Err(err) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(AideError::io(path, err));
    }
    Ok(())
}
