/*
 * Responsibility
 * - Config → dependency wiring → Router assembly
 * - Middleware application (HTTP / CORS / security headers)
 * - axum::serve() with graceful shutdown
 */
use std::{net::SocketAddr, panic, process, sync::Arc};

use anyhow::Context;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware;
use crate::services::access::AccessService;
use crate::services::audit::{AuditSink, TracingAuditSink};
use crate::services::auth::{ClaimsExtractor, build_token_verifier};
use crate::services::authz::Gate;
use crate::services::jobs::{InMemoryOrchestrator, JobOrchestrator};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // RUST_LOG=info,runbook_gate=debug,audit=info cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched
        tracing::error!(?info, "panic");

        // Development: fail fast. Production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env().context("loading configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting runbook gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("serving HTTP")?;

    tracing::info!("shut down");
    Ok(())
}

/// Process-level services, built once and shared through `AppState`.
pub fn build_state(config: &Config) -> Result<AppState, AppError> {
    let audit: Arc<dyn AuditSink> = Arc::new(TracingAuditSink::new());
    let orchestrator: Arc<dyn JobOrchestrator> =
        Arc::new(InMemoryOrchestrator::with_capacity(config.job_retention));
    build_state_with(config, orchestrator, audit)
}

pub fn build_state_with(
    config: &Config,
    orchestrator: Arc<dyn JobOrchestrator>,
    audit: Arc<dyn AuditSink>,
) -> Result<AppState, AppError> {
    let roles = Arc::new(config.load_role_table()?);
    let verifier = build_token_verifier(&config.verifier)?;
    tracing::info!(
        verifier = verifier.name(),
        verifies_signature = verifier.verifies_signature(),
        tenant = %config.expected_tenant_id,
        "token verifier ready"
    );

    let extractor = ClaimsExtractor::new(
        verifier,
        config.expected_tenant_id.clone(),
        config.max_token_length,
        audit.clone(),
    );
    let access = Arc::new(AccessService::new(extractor, Gate::new(roles), audit.clone()));

    Ok(AppState::new(
        access,
        orchestrator,
        audit,
        config.job_submit_timeout,
        config.trust_proxy,
    ))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(api::v1::handlers::health::health))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = ?err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
