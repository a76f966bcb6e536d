//! HTTP server lifecycle: wiring, startup and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::config::{Environment, settings::Settings};
use crate::db::{AsyncDbPool, establish_async_connection_pool, run_pending_migrations};
use crate::jobs::JobScheduler;
use crate::repositories::Repositories;
use crate::services::{
    DatabaseEventRecorder, DeliveryGateway, EventRecorder, MemoryEventRecorder, Services,
    WhatsAppGateway,
};
use crate::state::AppState;

pub struct Server {
    settings: Settings,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Start the server and run until shutdown signal
    ///
    /// This method:
    /// 1. Opens the database pool (optional) and picks the event recorder
    /// 2. Builds the WhatsApp gateway and the service graph
    /// 3. Starts the cron scheduler
    /// 4. Serves HTTP until Ctrl+C or SIGTERM
    /// 5. Stops the scheduler and waits for background sends to finish
    ///
    /// # Errors
    /// - Database pool or migration errors
    /// - Invalid recipients, time zone or cron expressions
    /// - Address binding errors
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = self.settings;

        tracing::info!(
            app_name = %settings.application.name,
            app_version = %settings.application.version,
            environment = %Environment::from_env().as_str(),
            "Application starting"
        );
        tracing::info!(
            host = %settings.server.host,
            port = settings.server.port,
            request_timeout = settings.server.request_timeout,
            "Server configuration loaded"
        );

        let db_pool = open_database(&settings).await?;
        let recorder: Arc<dyn EventRecorder> = match &db_pool {
            Some(pool) => Arc::new(DatabaseEventRecorder::new(
                Repositories::new(pool.clone()).events,
            )),
            None => {
                tracing::warn!("No database configured, readings are kept in memory only");
                Arc::new(MemoryEventRecorder::new())
            }
        };
        tracing::info!(recorder = recorder.name(), "Event recorder ready");

        let gateway: Arc<dyn DeliveryGateway> = Arc::new(WhatsAppGateway::new(
            &settings.whatsapp,
            Arc::new(settings.menu.clone()),
            Arc::new(settings.messages.clone()),
        )?);
        let services = Services::new(&settings, gateway, recorder)?;
        tracing::info!(
            caregivers = settings.recipients.caregivers.len(),
            sender_policy = ?settings.security.sender_policy,
            signature_check = settings.whatsapp.app_secret.is_some(),
            "Services wired"
        );

        let scheduler = JobScheduler::from_config(&settings.schedule, &services).await?;
        scheduler.start().await?;

        let background = services.background.clone();
        let settings = Arc::new(settings);
        let state = AppState::new(services, db_pool, settings.clone());
        let router = create_router(state);

        let address = settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;
        tracing::info!(address = %address, "Server listening");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        if let Err(e) = scheduler.stop().await {
            tracing::warn!(error = %e, "Scheduler did not stop cleanly");
        }
        tracing::info!(in_flight = background.len(), "Waiting for background tasks");
        background.drain().await;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

async fn open_database(settings: &Settings) -> anyhow::Result<Option<AsyncDbPool>> {
    let config = &settings.database;
    if !config.is_enabled() {
        return Ok(None);
    }

    if config.auto_migrate {
        let applied = run_pending_migrations(&config.url).await?;
        tracing::info!(applied = applied.len(), "Database migrations checked");
    }

    let pool = establish_async_connection_pool(config).await?;
    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database connection pool initialized"
    );
    Ok(Some(pool))
}

/// Resolves on Ctrl+C or SIGTERM. A handler that fails to install is logged
/// and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
