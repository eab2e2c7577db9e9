//! Prompt composition and the string-only chat contract.

use super::service::GenerationService;
use log::{info, warn};
use std::time::Instant;

/// Returned instead of calling the service when no key was supplied.
pub const MISSING_API_KEY_WARNING: &str = "Enter an API key to ask about the archive.";
/// Prefix of every failure string returned by `ChatPipeline::ask`.
pub const AI_ERROR_PREFIX: &str = "AI Error: ";

/// Chat front over a generation service.
pub struct ChatPipeline<S: GenerationService> {
    service: S,
}

impl<S: GenerationService> ChatPipeline<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Answers `question` against `context`, biased toward `focus` if given.
    ///
    /// `focus` is the profile block of the record being viewed, usually from
    /// `build_focus_context`.
    ///
    /// # Contract
    /// - Empty `api_key`: returns `MISSING_API_KEY_WARNING`, no request.
    /// - Success: the service text, verbatim.
    /// - Failure: `"AI Error: {details}"`.
    pub fn ask(
        &self,
        api_key: &str,
        context: &str,
        question: &str,
        focus: Option<&str>,
    ) -> String {
        if api_key.is_empty() {
            warn!("event=chat_ask module=chat status=skipped reason=missing_api_key");
            return MISSING_API_KEY_WARNING.to_string();
        }

        let prompt = compose_prompt(context, question, focus);
        let started_at = Instant::now();
        info!(
            "event=chat_ask module=chat status=start prompt_chars={} focused={}",
            prompt.chars().count(),
            focus.is_some()
        );

        match self.service.generate(&prompt, api_key) {
            Ok(text) => {
                info!(
                    "event=chat_ask module=chat status=ok duration_ms={} answer_chars={}",
                    started_at.elapsed().as_millis(),
                    text.chars().count()
                );
                text
            }
            Err(err) => {
                warn!(
                    "event=chat_ask module=chat status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                format!("{AI_ERROR_PREFIX}{err}")
            }
        }
    }
}

/// Builds the full prompt: preamble with the archive, optional focus clause
/// embedding the viewed profile, then the question verbatim.
pub fn compose_prompt(context: &str, question: &str, focus: Option<&str>) -> String {
    let mut prompt = format!(
        "You are an expert historian of Algerian rock music. \
         Base your answers on this archive:\n\n{context}\n"
    );
    if let Some(profile) = focus {
        prompt.push_str(&format!(
            "\nThe user is currently viewing this band profile:\n{}\n\
             Focus your answer on this band unless the question says otherwise.\n",
            profile.trim_end()
        ));
    }
    prompt.push_str(&format!("\nQuestion: {question}"));
    prompt
}
