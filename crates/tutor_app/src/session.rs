use tracing::debug;
use tutor_domain::{SessionConfig, SessionState};
use tutor_provider::ChatCompletion;

use crate::{PromptBuilder, PromptContext, TurnFailure, TurnOutcome, TurnRunner};

/// One tutoring conversation: owns the state, assembles the prompt for
/// each turn, runs the protocol, and applies the resulting transition.
///
/// State is an explicit, passed-around value rather than ambient globals,
/// so multiple sessions can coexist and tests can inject any starting
/// point. The UI allows one in-flight turn at a time; this type assumes
/// that and holds no locks.
pub struct TutorSession<P> {
    runner: TurnRunner<P>,
    prompts: PromptBuilder,
    state: SessionState,
}

impl<P: ChatCompletion> TutorSession<P> {
    pub fn new(runner: TurnRunner<P>, prompts: PromptBuilder, config: SessionConfig) -> Self {
        Self {
            runner,
            prompts,
            state: SessionState::new(config),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run one full turn for the given user input.
    ///
    /// On success the user message and the tutor's reply are committed to
    /// history and the metadata transition is applied. On failure nothing
    /// is committed; the categorized error is recorded and, when
    /// recoverable, the input is retained so [`Self::retry`] can resubmit
    /// it unchanged.
    pub async fn send(&mut self, user_input: &str) -> Result<TurnOutcome, TurnFailure> {
        let attempt = self.state.with_user_message(user_input);

        let context = PromptContext::from(&attempt);
        let system_prompt = self
            .prompts
            .system_prompt(&context)
            .map_err(TurnFailure::internal)?;

        match self
            .runner
            .run_turn(attempt.history_for_model(), &system_prompt)
            .await
        {
            Ok(outcome) => {
                self.state = attempt.apply(&outcome.response);
                debug!(
                    stuck_count = self.state.stuck_count,
                    used_calculator = outcome.used_calculator,
                    "Turn completed"
                );
                Ok(outcome)
            }
            Err(failure) => {
                self.state = self.state.with_error(failure.detail.clone(), user_input);
                Err(failure)
            }
        }
    }

    /// Resubmit the input retained by the last recoverable failure, if any
    pub async fn retry(&mut self) -> Option<Result<TurnOutcome, TurnFailure>> {
        let input = self.state.pending_retry.clone()?;
        Some(self.send(&input).await)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tutor_domain::{ErrorCategory, Role};
    use tutor_provider::{ChatRequest, CompletionMessage, Error};

    use super::*;

    struct ScriptedProvider {
        replies: Mutex<Vec<Result<CompletionMessage, Error>>>,
    }

    impl ScriptedProvider {
        fn new(mut replies: Vec<Result<CompletionMessage, Error>>) -> Self {
            replies.reverse();
            Self { replies: Mutex::new(replies) }
        }
    }

    #[async_trait]
    impl ChatCompletion for ScriptedProvider {
        async fn chat(&self, _request: &ChatRequest) -> Result<CompletionMessage, Error> {
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(CompletionMessage::default()))
        }
    }

    fn session(replies: Vec<Result<CompletionMessage, Error>>) -> TutorSession<ScriptedProvider> {
        let provider = Arc::new(ScriptedProvider::new(replies));
        TutorSession::new(
            TurnRunner::new(provider, "gpt-4o-mini"),
            PromptBuilder::new().unwrap(),
            SessionConfig::default(),
        )
    }

    fn reply(content: &str) -> Result<CompletionMessage, Error> {
        Ok(CompletionMessage {
            content: Some(content.to_string()),
            tool_calls: vec![],
        })
    }

    #[tokio::test]
    async fn test_successful_turn_commits_history() {
        let mut session = session(vec![reply(
            r#"{"message": "What do we know?", "metadata": {"isNewProblem": true, "currentProblemText": "x + 5 = 12", "studentAnswerCorrect": null, "problemComplete": false}}"#,
        )]);

        session.send("solve x + 5 = 12").await.unwrap();

        let state = session.state();
        // Greeting + user + assistant
        assert_eq!(state.history.len(), 3);
        assert_eq!(state.history[1].role, Role::User);
        assert_eq!(state.history[2].content, "What do we know?");
        assert_eq!(state.current_problem, Some("x + 5 = 12".to_string()));
        assert_eq!(state.stuck_count, 0);
    }

    #[tokio::test]
    async fn test_failed_turn_commits_nothing_and_retains_input() {
        let mut session = session(vec![
            Err(Error::InvalidStatusCode { status: 429, body: "rate limited".to_string() }),
            reply(r#"{"message": "Welcome back!", "metadata": null}"#),
        ]);

        let failure = session.send("what is 2 + 2?").await.unwrap_err();
        assert_eq!(failure.detail.category, ErrorCategory::RateLimit);

        // Only the greeting: the failed user message was not committed
        assert_eq!(session.state().history.len(), 1);
        assert_eq!(
            session.state().pending_retry,
            Some("what is 2 + 2?".to_string())
        );

        // Retry resubmits the same input and commits on success
        let outcome = session.retry().await.unwrap().unwrap();
        assert_eq!(outcome.response.message, "Welcome back!");
        assert_eq!(session.state().history.len(), 3);
        assert_eq!(session.state().history[1].content, "what is 2 + 2?");
        assert_eq!(session.state().pending_retry, None);
    }

    #[tokio::test]
    async fn test_retry_without_pending_input_is_a_no_op() {
        let mut session = session(vec![]);
        assert!(session.retry().await.is_none());
    }

    #[tokio::test]
    async fn test_consecutive_wrong_answers_escalate() {
        let wrong = r#"{"message": "Not quite. What operation undoes addition?", "metadata": {"isNewProblem": false, "currentProblemText": "x + 5 = 12", "studentAnswerCorrect": false, "problemComplete": false}}"#;
        let mut session = session(vec![reply(wrong), reply(wrong), reply(wrong)]);

        session.send("x = 5").await.unwrap();
        session.send("x = 6").await.unwrap();
        session.send("x = 8").await.unwrap();

        assert_eq!(session.state().stuck_count, 3);
        assert_eq!(
            session.state().hint_tier(),
            tutor_domain::HintTier::Concrete
        );
    }
}
