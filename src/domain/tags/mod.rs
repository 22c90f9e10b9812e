//! Tag system

pub mod codec;
pub mod labels;

// Re-export main types
pub use codec::{list_annotations, redact_tags, strip_tags, Span};
pub use labels::{is_known_label, CATCH_ALL_LABEL, KNOWN_LABELS};
