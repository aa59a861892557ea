use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ConversationMessage, ErrorDetail, Role, TutorTurnResponse};

/// Synthetic first message shown when a session starts. It is part of the
/// visible history but never sent to the model.
pub const GREETING: &str = "Hello! I'm your AI math tutor. I'll help guide you through \
solving math problems using questions and hints. You can type a problem below or upload \
an image of one. Let's get started!";

/// Escalation level derived from the consecutive-wrong-answer counter.
/// Read-only view: it shapes the next turn's system prompt and is never
/// persisted into history.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HintTier {
    None,
    /// Two wrong answers in a row: nudge toward the method
    Gentle,
    /// Three or more: a concrete hint, still phrased as a question
    Concrete,
}

impl HintTier {
    pub fn from_stuck_count(stuck_count: u32) -> Self {
        match stuck_count {
            0 | 1 => HintTier::None,
            2 => HintTier::Gentle,
            _ => HintTier::Concrete,
        }
    }
}

/// Session tunables
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, Setters)]
#[setters(into)]
pub struct SessionConfig {
    /// Saturation point for the stuck counter. Escalation only
    /// distinguishes 2 and >= 3, so the counter never needs to grow
    /// unboundedly.
    pub stuck_cap: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { stuck_cap: 5 }
    }
}

/// Client-held conversation state. Owned by exactly one session, mutated
/// only through the pure transition methods below; lives in memory for the
/// session's lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub history: Vec<ConversationMessage>,
    pub current_problem: Option<String>,
    pub stuck_count: u32,
    pub last_error: Option<ErrorDetail>,
    /// Original user input retained after a recoverable failure so a retry
    /// can resubmit it unchanged
    pub pending_retry: Option<String>,
    config: SessionConfig,
}

impl SessionState {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            history: vec![ConversationMessage::assistant(GREETING)],
            current_problem: None,
            stuck_count: 0,
            last_error: None,
            pending_retry: None,
            config,
        }
    }

    /// Append the user's message for the turn about to run
    pub fn with_user_message(&self, content: impl ToString) -> Self {
        let mut next = self.clone();
        next.history.push(ConversationMessage::user(content.to_string()));
        next
    }

    /// Record a failed turn: categorized error retained, and the input kept
    /// for resubmission when the category allows it
    pub fn with_error(&self, error: ErrorDetail, user_input: impl ToString) -> Self {
        let mut next = self.clone();
        next.pending_retry = error.recoverable.then(|| user_input.to_string());
        next.last_error = Some(error);
        next
    }

    /// Pure transition applied when a turn completes, in precedence order:
    ///
    /// 1. a new problem (with text) resets tracking — it wins over any
    ///    correctness signal reported in the same turn;
    /// 2. a wrong answer increments the stuck counter (saturating at the
    ///    configured cap);
    /// 3. a correct answer resets it;
    /// 4. absent or inconclusive metadata changes nothing beyond the
    ///    history append.
    pub fn apply(&self, response: &TutorTurnResponse) -> Self {
        let mut next = self.clone();
        next.history.push(ConversationMessage::assistant(&response.message));
        next.last_error = None;
        next.pending_retry = None;

        let Some(metadata) = &response.metadata else {
            return next;
        };

        if metadata.is_new_problem && metadata.current_problem_text.is_some() {
            debug!(problem = ?metadata.current_problem_text, "Tracking new problem");
            next.current_problem = metadata.current_problem_text.clone();
            next.stuck_count = 0;
        } else if metadata.student_answer_correct == Some(false) {
            next.stuck_count = (next.stuck_count + 1).min(self.config.stuck_cap);
        } else if metadata.student_answer_correct == Some(true) {
            next.stuck_count = 0;
        }

        next
    }

    pub fn hint_tier(&self) -> HintTier {
        HintTier::from_stuck_count(self.stuck_count)
    }

    /// History as sent to the model: everything except the synthetic
    /// greeting
    pub fn history_for_model(&self) -> &[ConversationMessage] {
        match self.history.first() {
            Some(first) if first.has_role(Role::Assistant) && first.content == GREETING => {
                &self.history[1..]
            }
            _ => &self.history,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::TurnMetadata;

    fn response(metadata: Option<TurnMetadata>) -> TutorTurnResponse {
        TutorTurnResponse { message: "What do we know?".to_string(), metadata }
    }

    fn wrong_answer() -> TutorTurnResponse {
        response(Some(TurnMetadata::default().student_answer_correct(false)))
    }

    #[test]
    fn test_three_wrong_answers_escalate_to_concrete_hints() {
        let mut state = SessionState::default();
        for _ in 0..3 {
            state = state.apply(&wrong_answer());
        }
        assert_eq!(state.stuck_count, 3);
        assert_eq!(state.hint_tier(), HintTier::Concrete);
    }

    #[test]
    fn test_two_wrong_answers_are_the_gentle_tier() {
        let state = SessionState::default()
            .apply(&wrong_answer())
            .apply(&wrong_answer());
        assert_eq!(state.hint_tier(), HintTier::Gentle);
    }

    #[test]
    fn test_correct_answer_resets_the_counter() {
        let mut state = SessionState::default();
        for _ in 0..3 {
            state = state.apply(&wrong_answer());
        }
        let state = state.apply(&response(Some(
            TurnMetadata::default().student_answer_correct(true),
        )));
        assert_eq!(state.stuck_count, 0);
        assert_eq!(state.hint_tier(), HintTier::None);
    }

    #[test]
    fn test_new_problem_wins_over_wrong_answer() {
        let mut state = SessionState::default();
        for _ in 0..2 {
            state = state.apply(&wrong_answer());
        }
        let metadata = TurnMetadata::default()
            .is_new_problem(true)
            .current_problem_text("2x = 10")
            .student_answer_correct(false);
        let state = state.apply(&response(Some(metadata)));
        assert_eq!(state.stuck_count, 0);
        assert_eq!(state.current_problem, Some("2x = 10".to_string()));
    }

    #[test]
    fn test_new_problem_without_text_does_not_reset() {
        let state = SessionState::default().apply(&wrong_answer());
        let metadata = TurnMetadata::default()
            .is_new_problem(true)
            .student_answer_correct(false);
        let state = state.apply(&response(Some(metadata)));
        // No problem text: falls through to the correctness rule
        assert_eq!(state.stuck_count, 2);
    }

    #[test]
    fn test_missing_metadata_only_appends_history() {
        let prior = SessionState::default().apply(&wrong_answer());
        let next = prior.apply(&response(None));
        assert_eq!(next.stuck_count, prior.stuck_count);
        assert_eq!(next.current_problem, prior.current_problem);
        assert_eq!(next.history.len(), prior.history.len() + 1);
    }

    #[test]
    fn test_stuck_count_saturates_at_the_cap() {
        let mut state = SessionState::new(SessionConfig::default().stuck_cap(3u32));
        for _ in 0..10 {
            state = state.apply(&wrong_answer());
        }
        assert_eq!(state.stuck_count, 3);
    }

    #[test]
    fn test_greeting_is_excluded_from_model_history() {
        let state = SessionState::default().with_user_message("solve x + 5 = 12");
        let actual = state.history_for_model();
        assert_eq!(actual, &[ConversationMessage::user("solve x + 5 = 12")]);
    }

    #[test]
    fn test_recoverable_error_retains_input_for_retry() {
        use crate::{ErrorCategory, ErrorDetail};

        let state = SessionState::default().with_error(
            ErrorDetail::new(ErrorCategory::Connection, "connection refused"),
            "what is 2 + 2?",
        );
        assert_eq!(state.pending_retry, Some("what is 2 + 2?".to_string()));
    }

    #[test]
    fn test_auth_error_has_no_retry_affordance() {
        use crate::{ErrorCategory, ErrorDetail};

        let state = SessionState::default().with_error(
            ErrorDetail::new(ErrorCategory::Auth, "invalid api key"),
            "what is 2 + 2?",
        );
        assert_eq!(state.pending_retry, None);
    }

    #[test]
    fn test_successful_turn_clears_error_state() {
        use crate::{ErrorCategory, ErrorDetail};

        let state = SessionState::default()
            .with_error(
                ErrorDetail::new(ErrorCategory::Timeout, "deadline exceeded"),
                "what is 2 + 2?",
            )
            .apply(&response(None));
        assert_eq!(state.last_error, None);
        assert_eq!(state.pending_retry, None);
    }
}
