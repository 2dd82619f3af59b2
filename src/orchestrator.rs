//! RAG orchestration: retrieve, assemble, window, generate.

use std::sync::Arc;

use serde::Serialize;

use crate::context::{ContextAssembler, UserLearningState};
use crate::conversation::{ConversationManager, ConversationTurn, Role};
use crate::core::errors::RagError;
use crate::generation::{ChatMessage, GenerationOptions, GenerationService};
use crate::retrieval::RetrievalService;

/// A generated answer plus the documents that grounded it. An empty
/// `sources` list means the answer used no retrieved context.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    /// Ids of the documents whose sections were injected, most relevant
    /// first.
    pub sources: Vec<String>,
}

/// Composes retrieval, context assembly and conversation windowing around
/// the generation collaborator.
pub struct RagOrchestrator {
    retrieval: Arc<RetrievalService>,
    assembler: ContextAssembler,
    conversation: ConversationManager,
    generation: Arc<dyn GenerationService>,
    options: GenerationOptions,
}

impl RagOrchestrator {
    pub fn new(
        retrieval: Arc<RetrievalService>,
        assembler: ContextAssembler,
        conversation: ConversationManager,
        generation: Arc<dyn GenerationService>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            retrieval,
            assembler,
            conversation,
            generation,
            options,
        }
    }

    /// Answer `user_message`, grounding on the owner's documents when
    /// possible.
    ///
    /// Retrieval failures degrade to an answer without context; generation
    /// failures propagate as [`RagError::Generation`].
    pub async fn answer(
        &self,
        user_message: &str,
        owner_id: Option<&str>,
        history: &[ConversationTurn],
    ) -> Result<Answer, RagError> {
        self.answer_with_state(user_message, owner_id, history, None)
            .await
    }

    /// Like [`answer`](Self::answer), with a learner-progress snapshot to
    /// bias explanation depth.
    pub async fn answer_with_state(
        &self,
        user_message: &str,
        owner_id: Option<&str>,
        history: &[ConversationTurn],
        user_state: Option<&UserLearningState>,
    ) -> Result<Answer, RagError> {
        let matches = self.retrieval.search(user_message, owner_id).await;
        if matches.is_empty() {
            tracing::debug!("no sources found, answering without retrieved context");
        }

        let context = self.assembler.build_context(&matches, user_state);
        let system = self.assembler.system_prompt(&context);

        let mut messages = Vec::with_capacity(self.conversation.max_turns() + 2);
        messages.push(ChatMessage::new(Role::System, system));
        messages.extend(self.conversation.window(history).iter().map(ChatMessage::from));
        messages.push(ChatMessage::new(Role::User, user_message));

        let text = self.generation.complete(&messages, &self.options).await?;

        let mut sources = Vec::new();
        for m in &matches {
            if !sources.contains(&m.document_id) {
                sources.push(m.document_id.clone());
            }
        }

        Ok(Answer { text, sources })
    }
}
