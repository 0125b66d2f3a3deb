use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crewforge_api::agents::Crew;
use crewforge_api::api::{self, AppState};
use crewforge_api::config::AppConfig;
use crewforge_api::infrastructure::github::RepoScanner;
use crewforge_api::infrastructure::relays::HttpChatRelay;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let mut crew = Crew::new(config.openai_api_key.clone(), config.openai_base_url.clone());
    if let Some(model) = &config.crew_model {
        tracing::info!(%model, "Overriding crew model");
        crew = crew.with_model(model.clone());
    }

    let relay = HttpChatRelay::new(config.chat_backend_url.clone());
    tracing::info!(endpoint = relay.endpoint(), "Relaying responses to chat backend");

    let scanner = RepoScanner::with_api_base(config.github_api_url.clone(), config.github_token.clone());

    let state = AppState::new(
        Arc::new(crew),
        Arc::new(relay),
        scanner,
        config.project_folder.clone(),
    );

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Server listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .await
        .expect("Server failed");
}
