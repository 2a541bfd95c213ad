//! Excalidraw drawing engine.
//!
//! - [`parse`]: drawing/library parsing and legacy library normalization
//! - [`elements`]: id generation, collision-free merging, summaries
//! - [`compress`]: default-field compression and design-system expansion
//! - [`design_system`]: the mutable style-defaults document
//! - [`files`]: the drawings directory

pub mod compress;
pub mod design_system;
pub mod elements;
pub mod files;
pub mod parse;
pub mod types;

pub use elements::{element_summary, merge_elements, ElementSummary, MergeOptions};
pub use files::DrawingFiles;
pub use types::{Drawing, ElementType, ExcalidrawElement, LibraryFile};
