use crate::core::lexicon::Lexicon;
use crate::domain::model::{Verdict, VerdictReason};
use std::sync::Arc;

/// Texts shorter than this, in characters, need in-scope evidence to pass.
pub const MIN_QUERY_LENGTH: usize = 10;

/// Keyword relevance check over a fixed lexicon. Stateless; share freely.
#[derive(Debug, Clone)]
pub struct Classifier {
    lexicon: Arc<Lexicon>,
}

impl Classifier {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Classify one free-text field.
    ///
    /// In-scope evidence always wins: text carrying both in-scope and off-topic
    /// tokens is allowed. Short text is rejected only when it has no in-scope
    /// token, and long neutral text passes.
    pub fn classify(&self, text: &str) -> Verdict {
        let lowered = text.to_lowercase();
        let has_off_topic = self.lexicon.contains_off_topic(&lowered);
        let has_in_scope = self.lexicon.contains_in_scope(&lowered);

        let verdict = if has_off_topic && !has_in_scope {
            Verdict::reject(VerdictReason::OffTopic)
        } else if text.chars().count() < MIN_QUERY_LENGTH && !has_in_scope {
            Verdict::reject(VerdictReason::TooVague)
        } else {
            Verdict::allow()
        };

        tracing::debug!(
            has_in_scope,
            has_off_topic,
            allowed = verdict.allowed,
            reason = %verdict.reason,
            "Classified query"
        );
        verdict
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Arc::new(Lexicon::default()))
    }
}
