//! Core analysis engine.
//!
//! - `locale`: loads locale files into a uniform model
//! - `collect`: extracts used keys from source files
//! - `diff`: compares expected keys against locale trees
//! - `parsers`: position-aware JSON and swc-based script parsing
//! - `context`: per-run state shared by the rules

pub mod collect;
pub mod context;
pub mod data;
pub mod diff;
pub mod error;
pub mod locale;
pub mod parsers;
pub mod utils;

pub use collect::{KeyUsage, UsedKeyCache, UsedKeys};
pub use context::CheckContext;
pub use data::{MessageContext, MessageLocation, SourceContext, SourceLocation};
pub use diff::{Change, KeyFinding, KeySet};
pub use error::CheckError;
pub use locale::{LocaleKeyMode, LocaleMessage, LocaleMessageSource, LocaleMessages};
