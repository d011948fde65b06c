//! Quorum Server
//!
//! An async Rust server providing the Quorum organization-management API:
//! member and dues records, shared documents, notifications, and the
//! workflow, rule, and points automation engines.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quorum_actions::{ActionRegistry, LogMailer, Mailer, WebhookMailer};
use quorum_server::{
    config::{AppConfig, DatabaseConfig, StoreBackend},
    engine::RuleEngine,
    handlers,
    nats::ChangePublisher,
    services::{
        AutomationService, DocumentService, DuesService, ExecutionService, MemberService,
        NotificationService,
    },
    state::AppState,
};
use quorum_store::{
    create_pool, ChangeFeed, ChangeSource, DocumentStore, MemoryStore, PostgresStore,
    WatchedStore,
};

/// Initialize tracing/logging.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,quorum_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the application router with all routes.
fn build_router(
    state: AppState,
    member_service: MemberService,
    dues_service: DuesService,
    document_service: DocumentService,
    notification_service: NotificationService,
    automation_service: AutomationService,
    execution_service: ExecutionService,
) -> Router {
    // CORS configuration - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::api_health))
        .with_state(state);

    let member_routes = Router::new()
        .route("/api/members", post(handlers::members::create))
        .route("/api/members", get(handlers::members::list))
        .route("/api/members/{id}", get(handlers::members::get))
        .route("/api/members/{id}", patch(handlers::members::update))
        .with_state(member_service);

    let dues_routes = Router::new()
        .route("/api/dues", post(handlers::dues::record))
        .route("/api/dues", get(handlers::dues::list))
        .route("/api/dues/{id}", get(handlers::dues::get))
        .with_state(dues_service);

    let document_routes = Router::new()
        .route("/api/documents", post(handlers::documents::create))
        .route("/api/documents", get(handlers::documents::list))
        .route("/api/documents/{id}", get(handlers::documents::get))
        .route("/api/documents/{id}", patch(handlers::documents::update))
        .with_state(document_service);

    let notification_routes = Router::new()
        .route("/api/notifications", post(handlers::notifications::send))
        .route("/api/notifications", get(handlers::notifications::list))
        .with_state(notification_service);

    let automation_routes = Router::new()
        .route(
            "/api/workflows/register",
            post(handlers::automation::register_workflow),
        )
        .route("/api/workflows", get(handlers::automation::list_workflows))
        .route(
            "/api/workflows/{id}/run",
            post(handlers::automation::run_workflow),
        )
        .route(
            "/api/rules/register",
            post(handlers::automation::register_rule),
        )
        .route("/api/rules", get(handlers::automation::list_rules))
        .route(
            "/api/points/rules/register",
            post(handlers::automation::register_points_rule),
        )
        .route(
            "/api/points/rules",
            get(handlers::automation::list_points_rules),
        )
        .route("/api/points/score", post(handlers::automation::score))
        .with_state(automation_service);

    let execution_routes = Router::new()
        .route("/api/executions", get(handlers::executions::list))
        .route("/api/executions/{id}", get(handlers::executions::get))
        .route(
            "/api/rule-executions",
            get(handlers::executions::list_rule_executions),
        )
        .with_state(execution_service);

    Router::new()
        .merge(health_routes)
        .merge(member_routes)
        .merge(dues_routes)
        .merge(document_routes)
        .merge(notification_routes)
        .merge(automation_routes)
        .merge(execution_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Build the document store selected by configuration.
async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.store {
        StoreBackend::Postgres => {
            let db_config = DatabaseConfig::from_env().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to load database config, using defaults");
                DatabaseConfig::default()
            });
            let pool = create_pool(&db_config.connection_url(), db_config.max_connections).await?;
            let store = PostgresStore::new(pool);
            store.init_schema().await?;
            tracing::info!(host = %db_config.host, "Using PostgreSQL store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Connect to NATS if configured.
async fn connect_nats(config: &AppConfig) -> Option<async_nats::Client> {
    if let Some(ref nats_url) = config.nats_url {
        match async_nats::connect(nats_url).await {
            Ok(client) => {
                tracing::info!(url = %nats_url, "Connected to NATS");
                Some(client)
            }
            Err(e) => {
                tracing::warn!(error = %e, url = %nats_url, "Failed to connect to NATS, continuing without it");
                None
            }
        }
    } else {
        tracing::info!("NATS not configured, running without messaging");
        None
    }
}

/// Build the mail transport selected by configuration.
fn build_mailer(config: &AppConfig) -> Arc<dyn Mailer> {
    match &config.mail_relay_url {
        Some(url) => {
            tracing::info!(url = %url, "Using HTTP mail relay");
            Arc::new(WebhookMailer::new(url))
        }
        None => {
            tracing::info!("Mail relay not configured, notifications are logged only");
            Arc::new(LogMailer)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Quorum server");

    let app_config = AppConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load app config, using defaults");
        AppConfig::default()
    });

    tracing::info!(
        host = %app_config.host,
        port = app_config.port,
        debug = app_config.debug,
        "Configuration loaded"
    );

    // Every write goes through the watched store so the rule engine sees it
    let backing = build_store(&app_config).await?;
    let feed = ChangeFeed::new();
    let store: Arc<dyn DocumentStore> = Arc::new(WatchedStore::new(backing, feed.clone()));

    let mailer = build_mailer(&app_config);
    let actions = Arc::new(ActionRegistry::builtin(store.clone(), mailer));

    // Rule engine subscribes before the server accepts writes
    let rule_engine = Arc::new(RuleEngine::new(store.clone(), actions.clone()));
    let rule_rx = feed.subscribe();
    tokio::spawn({
        let rule_engine = rule_engine.clone();
        async move { rule_engine.run(rule_rx).await }
    });

    // Optional NATS mirror of the change feed
    let nats_client = connect_nats(&app_config).await;
    if let Some(ref client) = nats_client {
        match ChangePublisher::new(Arc::new(client.clone()), None, None).await {
            Ok(publisher) => {
                let rx = feed.subscribe();
                tokio::spawn(async move { publisher.forward(rx).await });
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to set up NATS change publisher");
            }
        }
    }

    // Create services
    let member_service = MemberService::new(store.clone());
    let dues_service = DuesService::new(store.clone());
    let document_service = DocumentService::new(store.clone());
    let notification_service = NotificationService::new(store.clone(), actions.clone());
    let automation_service = AutomationService::new(store.clone(), actions.clone());
    let execution_service = ExecutionService::new(store.clone());

    let state = AppState::new(store, feed, actions, app_config.clone(), nats_client);

    let app = build_router(
        state,
        member_service,
        dues_service,
        document_service,
        notification_service,
        automation_service,
        execution_service,
    );

    let addr: SocketAddr = app_config.bind_address().parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
