//! Critic Server - HTTP API for the Critic code review service
//!
//! Routes, all JSON and nested under `/api`:
//! - `GET /health` (no auth)
//! - `POST /review` multipart upload in field `file`
//! - `GET /reports` the caller's reviews, newest first
//! - `GET /reports/{id}` one review, if the caller may read it

pub mod auth;
pub mod error;
pub mod handlers;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::{middleware, Router};
use critic_core::{Config, RetrievalWorkflow, Secrets, SubmissionWorkflow};
use critic_db::Database;
use critic_llm::GroqClient;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use auth::{AuthUser, Claims, TokenAuthority};
pub use error::{ApiError, ErrorBody, Operation};
pub use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/review",
            post(handlers::submit_review).layer(DefaultBodyLimit::max(state.max_upload_bytes)),
        )
        .route("/reports", get(handlers::list_reports))
        .route("/reports/{id}", get(handlers::get_report))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    let api = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Wire the database, generator and token authority into handler state
pub async fn build_state(config: &Config, secrets: &Secrets) -> anyhow::Result<AppState> {
    let jwt_secret = secrets.jwt_secret().context(
        "Token signing secret not found. Set CRITIC_JWT_SECRET or add [auth] jwt_secret \
         to ~/.config/critic/secrets.toml",
    )?;

    let db = Database::connect(&config.database)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.path.display()))?;

    if !config.database.auto_migrate {
        let status = db.verify_schema().await?;
        if !status.table_exists {
            status.ensure_ready()?;
        } else if let Err(e) = status.ensure_ready() {
            warn!(error = %e, "Review database schema is incomplete");
        }
    }

    let generator = GroqClient::from_secrets(&config.generation, secrets)?;
    let store = Arc::new(db.reviews());

    let submission = SubmissionWorkflow::new(store.clone(), Arc::new(generator), config.retry)
        .with_generation_timeout(config.generation.timeout);
    let retrieval = RetrievalWorkflow::new(store, config.retry);
    let authority = TokenAuthority::new(&jwt_secret, config.auth.issuer.clone());

    Ok(AppState::new(submission, retrieval, Arc::new(authority))
        .with_environment(config.server.environment)
        .with_max_upload_bytes(config.server.max_upload_bytes)
        .with_cors_origins(config.server.cors_origins.clone()))
}

/// Run the server until `shutdown` resolves.
pub async fn run_with_shutdown<F>(config: Config, secrets: Secrets, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let state = build_state(&config, &secrets).await?;
    let app = create_router(state);

    let addr: SocketAddr = config
        .server
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server.listen_addr))?;

    let listener = TcpListener::bind(addr).await?;
    info!(
        addr = %addr,
        environment = %config.server.environment,
        "Critic server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped");
    Ok(())
}
