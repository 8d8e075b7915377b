// src/chat/orchestrator.rs — Question in, recorded and rendered answer out

use std::sync::Arc;
use std::time::Instant;

use super::markdown;
use super::prompt::build_chat_prompt;
use super::session::{PaperContext, Presence, Role, SessionOutcome, SessionStore};
use crate::infra::errors::BioAstraError;
use crate::provider::TextGenerator;

#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Display HTML.
    pub response: String,
    /// Unmodified model output.
    pub raw_response: String,
    pub session_id: String,
    pub outcome: SessionOutcome,
}

pub struct ChatOrchestrator {
    store: Arc<SessionStore>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl ChatOrchestrator {
    pub fn new(store: Arc<SessionStore>, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { store, generator }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn generator(&self) -> Option<&Arc<dyn TextGenerator>> {
        self.generator.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Answer `user_message` in the context of one paper.
    ///
    /// Validation and configuration failures happen before the session is
    /// touched. The question is recorded before generation; the answer is
    /// recorded only when generation succeeds.
    pub async fn handle_chat(
        &self,
        session_id: Option<&str>,
        user_message: &str,
        paper_context: PaperContext,
    ) -> Result<ChatReply, BioAstraError> {
        if user_message.trim().is_empty() {
            return Err(BioAstraError::validation("Message is required"));
        }

        let generator = self.generator.as_ref().ok_or_else(|| {
            BioAstraError::Configuration(
                "Generation provider not configured. Set the GEMINI_API_KEY environment variable."
                    .into(),
            )
        })?;

        let resolved = self.store.resolve_or_create(session_id);
        let session_id = resolved.session_id;

        let prompt = build_chat_prompt(user_message, &paper_context);
        self.record(&session_id, Role::Question, user_message, paper_context.clone());

        let started = Instant::now();
        let raw_response = generator.generate(&prompt).await.map_err(|e| {
            tracing::warn!(provider = generator.id(), error = %e, "Chat generation failed");
            e
        })?;
        tracing::info!(
            provider = generator.id(),
            prompt_bytes = prompt.len(),
            response_bytes = raw_response.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Chat answer generated"
        );

        let response = markdown::render(&raw_response);
        self.record(&session_id, Role::Answer, &raw_response, paper_context);

        Ok(ChatReply {
            response,
            raw_response,
            session_id,
            outcome: resolved.outcome,
        })
    }

    fn record(&self, session_id: &str, role: Role, content: &str, context: PaperContext) {
        // The session can vanish between resolve and append if the idle
        // sweeper runs in between.
        if self.store.append_message(session_id, role, content, context) == Presence::Absent {
            tracing::debug!(?role, "Session evicted before message could be recorded");
        }
    }
}
