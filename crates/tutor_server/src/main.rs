use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tutor_app::{Environment, ProblemExtractor, PromptBuilder, TurnRunner};
use tutor_server::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real deployments set the environment directly
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tutor_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let environment = Environment::from_env()?;
    let client = Arc::new(environment.client()?);

    let state = AppState {
        runner: TurnRunner::new(client.clone(), &environment.chat_model),
        extractor: ProblemExtractor::new(client.clone(), &environment.vision_model),
        prompts: PromptBuilder::new()?,
    };

    let listener = tokio::net::TcpListener::bind(&environment.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", environment.bind_addr))?;

    tracing::info!(
        addr = %environment.bind_addr,
        chat_model = %environment.chat_model,
        vision_model = %environment.vision_model,
        "Starting tutor-server"
    );

    axum::serve(listener, router(Arc::new(state))).await?;

    tracing::info!("tutor-server shutdown complete");
    Ok(())
}
