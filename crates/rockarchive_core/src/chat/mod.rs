//! Question answering over the archive.
//!
//! # Responsibility
//! - Abstract the external text-generation call behind `GenerationService`.
//! - Compose prompts from the context blob, focus and question.
//!
//! # Invariants
//! - `ChatPipeline::ask` always returns a string and never panics.
//! - At most one generation request is issued per `ask`.

mod gemini;
mod pipeline;
mod service;

pub use gemini::GeminiService;
pub use pipeline::{compose_prompt, ChatPipeline, AI_ERROR_PREFIX, MISSING_API_KEY_WARNING};
pub use service::{GenerationService, ServiceError};
