//! Prompt assembly and model output normalization

pub mod normalizer;
pub mod prompt;

pub use normalizer::{normalize, strip_fences};
pub use prompt::PromptBuilder;
