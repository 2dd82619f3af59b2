//! Context assembly: retrieved chunks and learner state rendered into the
//! system message.

use serde::{Deserialize, Serialize};

use crate::store::DocumentMatch;

/// Fixed persona prompt. Assembled context is appended after this, never in
/// place of it.
pub const SYSTEM_PROMPT: &str = r#"You are Synapse, an intelligent learning companion. You help students understand complex topics through:

1. **Clear explanations** using the Feynman technique (explain like teaching someone else)
2. **Visual thinking** - when appropriate, generate Mermaid diagrams for concepts
3. **Code examples** - provide working code with syntax highlighting
4. **Socratic questioning** - guide users to answers through thoughtful questions

When you have context from the user's documents, cite them and build upon that knowledge.
When generating diagrams, use Mermaid syntax in code blocks with ```mermaid.

Be concise, helpful, and encourage deeper understanding rather than just giving answers."#;

/// Progress state of one skill in the learner's tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillStatus {
    Mastered,
    Unlocked,
    Locked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillProgress {
    pub name: String,
    pub status: SkillStatus,
}

/// Read-only learning-progress snapshot supplied by the platform. Used only
/// to bias generation tone, never mutated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLearningState {
    pub level: u32,
    pub skills: Vec<SkillProgress>,
}

/// Renders retrieved matches (and optional learner state) into the context
/// block appended to the persona prompt.
pub struct ContextAssembler {
    persona: String,
}

impl ContextAssembler {
    pub fn new() -> Self {
        Self {
            persona: SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_persona(persona: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
        }
    }

    /// Build the context block. Empty matches yield an empty string: no
    /// context section is injected at all.
    pub fn build_context(
        &self,
        matches: &[DocumentMatch],
        user_state: Option<&UserLearningState>,
    ) -> String {
        if matches.is_empty() {
            return String::new();
        }

        let parts: Vec<String> = matches
            .iter()
            .enumerate()
            .map(|(i, m)| {
                format!(
                    "[Document {}] (similarity: {:.1}%)\n{}",
                    i + 1,
                    m.similarity * 100.0,
                    m.content
                )
            })
            .collect();

        let mut context = format!(
            "\n\nRelevant context from your documents:\n\n{}",
            parts.join("\n\n---\n\n")
        );

        if let Some(state) = user_state {
            context.push_str(&render_learner_profile(state));
        }

        context
    }

    /// Final system message: persona prompt plus the assembled context.
    pub fn system_prompt(&self, context: &str) -> String {
        format!("{}{}", self.persona, context)
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new()
    }
}

fn render_learner_profile(state: &UserLearningState) -> String {
    let list = |status: SkillStatus| -> String {
        let names: Vec<&str> = state
            .skills
            .iter()
            .filter(|s| s.status == status)
            .map(|s| s.name.as_str())
            .collect();
        if names.is_empty() {
            "none yet".to_string()
        } else {
            names.join(", ")
        }
    };

    format!(
        "\n\nLearner profile (level {}):\n- Mastered skills: {}\n- Skills in progress: {}\n\
         Calibrate the depth of your explanation to this profile: build on mastered \
         skills and explain in-progress topics more carefully.",
        state.level,
        list(SkillStatus::Mastered),
        list(SkillStatus::Unlocked),
    )
}
