//! Prompt composition and structured-output validation

pub mod characters;
pub mod prompt;

pub use characters::{CharacterSchema, ContractViolation};
pub use prompt::PromptBuilder;
