use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use policr::api::routes::{create_router, AppState};
use policr::audit::{AuditStore, InMemoryAuditStore, PostgresAuditStore};
use policr::config::Config;
use policr::engine::EvaluationService;
use policr::observability::{init_tracing, MetricsRegistry};
use policr::store::{load_rule_sets, InMemoryRuleStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Initialize tracing
    init_tracing(&config.log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting policr evaluation engine"
    );

    // Load rule sets
    let file = load_rule_sets(&config.rules_path)?;
    let rule_store = Arc::new(InMemoryRuleStore::from_file(file));

    info!(
        ruleset_version = rule_store.version(),
        organizations = rule_store.organization_count(),
        "Rule sets loaded"
    );

    // Pick the audit store backend
    let audit_store: Arc<dyn AuditStore> = if let Some(ref url) = config.database_url {
        match PostgresAuditStore::connect(url, config.db_min_connections, config.db_max_connections)
            .await
        {
            Ok(store) => {
                store.run_migrations().await?;
                info!("Postgres audit store enabled");
                Arc::new(store)
            }
            Err(e) => {
                error!(
                    error = %e,
                    "Failed to connect audit database, continuing with in-memory store"
                );
                Arc::new(InMemoryAuditStore::new(config.audit_cap))
            }
        }
    } else {
        info!("In-memory audit store (no database configured)");
        Arc::new(InMemoryAuditStore::new(config.audit_cap))
    };

    // Create application state
    let metrics = Arc::new(MetricsRegistry::new());
    let service = EvaluationService::new(rule_store.clone(), audit_store.clone(), metrics.clone());

    let state = Arc::new(AppState {
        service,
        audit_store,
        rule_store,
        metrics,
        start_time: Instant::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        audit_page_size: config.audit_page_size,
    });

    // Create router
    let app = create_router(state);

    // Parse listen address
    let addr: SocketAddr = config.listen_addr.parse()?;

    info!(addr = %addr, "Starting HTTP server");

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run server with graceful shutdown
    if config.graceful_shutdown {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        axum::serve(listener, app).await?;
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
