//! Application layer - Use cases and orchestration

pub mod check;
pub mod convert;
pub mod filter_codes;
pub mod generate;
pub mod split;

pub use check::CheckOptions;
pub use convert::{ConvertOptions, ExportFormat};
pub use filter_codes::FilterCodesOptions;
pub use generate::GenerateOptions;
pub use split::SplitOptions;
