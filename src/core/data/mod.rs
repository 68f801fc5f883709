//! Location types shared by the collector, the rules and the reporter.
//!
//! - `message`: positions inside locale JSON files
//! - `source`: positions inside source code files

pub mod message;
pub mod source;

pub use message::{MessageContext, MessageLocation};
pub use source::{SourceContext, SourceLocation};
