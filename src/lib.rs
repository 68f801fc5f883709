//! keycheck - locale key consistency checker for vue-i18n projects
//!
//! keycheck compares the translation keys used in JavaScript and Vue sources
//! with the keys defined in JSON locale files, and reports keys that are
//! missing from a locale or defined but never used.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Locale loading, key collection and the key diff
//! - `issues`: Issue type definitions and reporting
//! - `rules`: The missing-key and unused-key rules

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod rules;
