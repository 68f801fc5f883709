//! File parsers for source code and message files.
//!
//! - `json`: position-aware JSON parser for locale files
//! - `script`: JS/TS source parser (uses swc for AST generation)

pub mod json;
pub mod script;
