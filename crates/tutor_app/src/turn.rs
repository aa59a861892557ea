use std::sync::Arc;

use tracing::{debug, info, warn};
use tutor_domain::{
    calculator, eval, ConversationMessage, MaxTokens, Temperature, ToolCallId, ToolResult,
    TutorTurnResponse,
};
use tutor_provider::{
    ChatCompletion, ChatRequest, CompletionMessage, ResponseFormat, ToolChoice, WireMessage,
    WireTool,
};

use crate::TurnFailure;

/// Result of a completed turn: the parsed contract plus whether the
/// calculator ran, surfaced independently of the parsed content for the
/// UI/telemetry
#[derive(Clone, Debug)]
pub struct TurnOutcome {
    pub response: TutorTurnResponse,
    pub used_calculator: bool,
}

/// Drives the two-round tool protocol for a single turn.
///
/// Round 1 declares the calculator; if the model suspends on tool calls,
/// every requested calculation is evaluated locally and the joined results
/// are fed back in round 2. Round 2 is terminal: the protocol never runs a
/// second calculator round, bounding latency and cost per turn.
pub struct TurnRunner<P> {
    provider: Arc<P>,
    model: String,
    temperature: Temperature,
    max_tokens: MaxTokens,
}

impl<P: ChatCompletion> TurnRunner<P> {
    pub fn new(provider: Arc<P>, model: impl ToString) -> Self {
        Self {
            provider,
            model: model.to_string(),
            temperature: Temperature::default(),
            max_tokens: MaxTokens::default(),
        }
    }

    pub fn temperature(mut self, temperature: Temperature) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: impl Into<MaxTokens>) -> Self {
        self.max_tokens = max_tokens.into();
        self
    }

    /// Run one full turn against the model. No retries happen here; retry
    /// is a caller-level decision.
    pub async fn run_turn(
        &self,
        history: &[ConversationMessage],
        system_prompt: &str,
    ) -> Result<TurnOutcome, TurnFailure> {
        let mut messages = vec![WireMessage::system(system_prompt)];
        messages.extend(history.iter().map(WireMessage::from));

        let request = ChatRequest::new(&self.model)
            .messages(messages.clone())
            .tools(vec![WireTool::from(&calculator())])
            .tool_choice(ToolChoice::Auto)
            .response_format(ResponseFormat::JsonObject)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);

        let message = self
            .provider
            .chat(&request)
            .await
            .map_err(TurnFailure::upstream)?;

        let mut used_calculator = false;
        let final_message = if message.has_tool_calls() {
            // Suspension point: nothing is published to the caller until
            // the follow-up round resolves
            used_calculator = true;
            info!(
                call_count = message.tool_calls.len(),
                "Model is verifying arithmetic with the calculator"
            );
            self.follow_up_round(messages, &message).await?
        } else {
            message
        };

        if final_message.has_tool_calls() {
            warn!("Model requested another calculator round; the protocol is capped at one");
        }

        let content = final_message.text().ok_or_else(TurnFailure::empty_response)?;
        let response = TutorTurnResponse::parse(content);

        Ok(TurnOutcome { response, used_calculator })
    }

    /// Evaluate every requested calculation and issue the terminal second
    /// round carrying the correlated results
    async fn follow_up_round(
        &self,
        mut messages: Vec<WireMessage>,
        message: &CompletionMessage,
    ) -> Result<CompletionMessage, TurnFailure> {
        let results = execute_tool_calls(message).await;

        messages.push(WireMessage::assistant_tool_calls(
            message.content.clone(),
            message.tool_calls.clone(),
        ));
        messages.extend(results.iter().map(WireMessage::tool_result));

        // No tools declared: the reply must be the final answer
        let request = ChatRequest::new(&self.model)
            .messages(messages)
            .response_format(ResponseFormat::JsonObject)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);

        self.provider
            .chat(&request)
            .await
            .map_err(TurnFailure::upstream)
    }
}

/// Evaluate all requested calculations. Invocations are independent, so
/// they run concurrently and are joined here — a barrier — before the
/// second round is sent. Evaluator errors become structured result data,
/// never turn failures.
async fn execute_tool_calls(message: &CompletionMessage) -> Vec<ToolResult> {
    let (requests, failures) = message.calculation_requests();

    let evaluations = requests.iter().map(|request| async move {
        let outcome = eval::evaluate(&request.expression);
        debug!(expression = %request.expression, outcome = ?outcome, "Calculating");
        ToolResult::from_eval(request, outcome)
    });

    let mut results = futures::future::join_all(evaluations).await;

    // Undecodable calls still get a correlated failure so the model sees
    // every id answered
    results.extend(
        failures
            .into_iter()
            .map(|(id, reason)| ToolResult::new(ToolCallId::new(id), "").failure(reason)),
    );

    results
}
