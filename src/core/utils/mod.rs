//! Shared helpers for text positions and path handling.
//!
//! - `line_index`: byte offset to line/column conversion
//! - `path`: path normalization and display

pub mod line_index;
pub mod path;

pub use line_index::{LineIndex, Position};
pub use path::{display_path, normalize_path, resolve_path};
