//! deidgen - Synthetic de-identification corpus toolkit
//!
//! Generates fictional Norwegian discharge summaries with inline PHI tags
//! through a chat-completion API, exports the tagged results as training
//! and review formats, and scores reviewed annotations against the
//! generated tags.

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::DeidgenError;
