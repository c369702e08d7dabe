//! Main Entrypoint for the Interview Conductor API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Connecting to the archive database and running migrations, if configured.
//! 3. Initializing the judgment collaborator and the conductor.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use conductor_api::{
    config::{Config, Provider},
    db::Db,
    router::create_router,
    state::AppState,
};
use conductor_core::{
    InterviewConductor,
    judgment::{HeuristicJudge, JudgmentClient, OpenAICompatibleJudge, load_prompts},
};
use sqlx::PgPool;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

fn build_judge(config: &Config) -> anyhow::Result<Arc<dyn JudgmentClient>> {
    let api_base = match config.provider {
        Provider::Heuristic => {
            info!("Using heuristic judgment provider.");
            return Ok(Arc::new(HeuristicJudge));
        }
        Provider::OpenAI => "https://api.openai.com/v1/",
        Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
    };
    let api_key = match config.provider {
        Provider::Gemini => config.gemini_api_key.as_ref(),
        _ => config.openai_api_key.as_ref(),
    }
    .context("API key missing for the configured provider")?;

    let prompts = load_prompts(&config.prompts_path)?;
    info!(provider = ?config.provider, prompts = prompts.len(), "Using LLM judgment provider.");
    let openai_config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(api_base);
    Ok(Arc::new(OpenAICompatibleJudge::new(
        openai_config,
        config.chat_model.clone(),
        prompts,
    )))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Shared Services ---
    let judge = build_judge(&config)?;
    let mut conductor = InterviewConductor::new(judge, config.conductor.clone());

    // --- 4. Initialize the Archive ---
    match &config.database_url {
        Some(database_url) => {
            let pool = PgPool::connect(database_url)
                .await
                .context("Failed to connect to database")?;
            let db = Db::new(pool);
            db.run_migrations().await?;
            info!("Database connection established and migrations are up-to-date.");
            conductor = conductor.with_archive(Arc::new(db));
        }
        None => warn!("DATABASE_URL not set; completed sessions will not be archived."),
    }

    let app_state = Arc::new(AppState::new(conductor));

    // --- 5. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 6. Start Server ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        bind_address = %config.bind_address,
        min_follow_ups = config.conductor.min_follow_ups,
        max_turns = config.conductor.max_turns,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
