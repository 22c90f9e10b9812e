//! Infrastructure layer - External I/O and persistence

pub mod completion;
pub mod config;
pub mod corpus;
pub mod vocabulary;

pub use completion::{CompletionClient, CompletionError, OpenAiClient};
pub use config::Config;
pub use corpus::{GenerationParameters, ResultsFile, ReviewTask, Section};
pub use vocabulary::{ScenarioVocabularies, Vocabulary};
