use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tutor_app::{ImageError, ProblemExtractor, PromptBuilder, PromptContext, TurnRunner};
use tutor_domain::{ConversationMessage, ErrorDetail, HintTier, TurnMetadata};
use tutor_provider::ChatCompletion;

/// Everything a request handler needs. The proxy is stateless with respect
/// to conversations: the client ships its full history and stuck count on
/// every call, exactly like the direct-to-provider path.
pub struct AppState<P> {
    pub runner: TurnRunner<P>,
    pub extractor: ProblemExtractor<P>,
    pub prompts: PromptBuilder,
}

pub fn router<P: ChatCompletion + 'static>(state: Arc<AppState<P>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(chat::<P>))
        .route("/parse-image", post(parse_image::<P>))
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    pub messages: Vec<ConversationMessage>,
    /// Pre-rendered system prompt; when absent the server renders its own
    /// from the stuck count and current problem
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub stuck_count: u32,
    #[serde(default)]
    pub current_problem: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TurnMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_calculator: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl ChatReply {
    fn failure(detail: ErrorDetail) -> Self {
        Self {
            success: false,
            content: None,
            metadata: None,
            used_calculator: None,
            error: Some(detail),
        }
    }
}

pub async fn chat<P: ChatCompletion>(
    State(state): State<Arc<AppState<P>>>,
    Json(body): Json<ChatBody>,
) -> (StatusCode, Json<ChatReply>) {
    let system_prompt = match body.system_prompt {
        Some(prompt) => prompt,
        None => {
            let tier = HintTier::from_stuck_count(body.stuck_count);
            let context = PromptContext {
                current_problem: body.current_problem.clone(),
                gentle_hint: tier == HintTier::Gentle,
                concrete_hint: tier == HintTier::Concrete,
            };
            match state.prompts.system_prompt(&context) {
                Ok(prompt) => prompt,
                Err(error) => {
                    error!(%error, "Failed to render the system prompt");
                    let detail = ErrorDetail::new(
                        tutor_domain::ErrorCategory::Unexpected,
                        error.to_string(),
                    );
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ChatReply::failure(detail)),
                    );
                }
            }
        }
    };

    match state.runner.run_turn(&body.messages, &system_prompt).await {
        Ok(outcome) => {
            info!(
                used_calculator = outcome.used_calculator,
                "Turn completed via proxy"
            );
            (
                StatusCode::OK,
                Json(ChatReply {
                    success: true,
                    content: Some(outcome.response.message),
                    metadata: outcome.response.metadata,
                    used_calculator: Some(outcome.used_calculator),
                    error: None,
                }),
            )
        }
        Err(failure) => {
            error!(error = %failure, category = ?failure.detail.category, "Turn failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatReply::failure(failure.detail)),
            )
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseImageBody {
    pub image_url: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseImageReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn parse_image<P: ChatCompletion>(
    State(state): State<Arc<AppState<P>>>,
    Json(body): Json<ParseImageBody>,
) -> (StatusCode, Json<ParseImageReply>) {
    match state.extractor.extract(&body.image_url).await {
        Ok(text) => (
            StatusCode::OK,
            Json(ParseImageReply { success: true, text: Some(text), error: None }),
        ),
        Err(error) => {
            let status = match &error {
                ImageError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            };
            error!(%error, "Image parsing failed");
            (
                status,
                Json(ParseImageReply {
                    success: false,
                    text: None,
                    error: Some(error.to_string()),
                }),
            )
        }
    }
}
