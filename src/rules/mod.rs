//! Rule implementations for keycheck.
//!
//! Each rule has a context entry point (`check_*_issues`) and a pure function
//! that takes only the inputs it needs and returns its issue type.
//!
//! - `missing`: keys used in source but absent from a locale
//! - `unused`: keys defined in a locale file but never referenced
//! - `errors`: configuration and parse failures turned into issues

pub mod errors;
pub mod missing;
pub mod unused;
