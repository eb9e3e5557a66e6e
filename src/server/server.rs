//! HTTP server implementation
//!
//! Builds the axum router and runs it in the background until the returned
//! [`ServerHandle`] is shut down or dropped.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::auth;
use super::config::ServerConfig;
use super::handlers::{self, analytics, entries, jobs, AppState, Settings};
use crate::error::AppError;
use crate::storage::Database;

/// Server control handle
pub struct ServerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    local_addr: SocketAddr,
}

impl ServerHandle {
    /// Address the server is listening on (resolves port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight requests
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        info!(addr = %self.local_addr, "Server stopped");
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Builds the application router
pub fn router(state: Arc<AppState>) -> Router {
    let user_routes = Router::new()
        .route("/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route(
            "/jobs/{job_id}",
            get(jobs::get_job).put(jobs::update_job).delete(jobs::delete_job),
        )
        .route("/entries", get(entries::list_entries).post(entries::create_entry))
        .route(
            "/entries/{entry_id}",
            get(entries::get_entry)
                .put(entries::update_entry)
                .delete(entries::delete_entry),
        )
        .route("/entries/{entry_id}/stop", post(entries::stop_entry))
        .route("/analytics/summary", get(analytics::summary))
        .route("/analytics/earnings-trend", get(analytics::earnings_trend))
        .route("/analytics/job-distribution", get(analytics::job_distribution))
        .route("/analytics/weekly-pattern", get(analytics::weekly_pattern))
        .route("/analytics/compare", get(analytics::compare))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ));

    Router::new()
        .route("/api/health", get(handlers::health_check))
        .nest("/api/users/{user_id}", user_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Wagebook HTTP server
pub struct Server {
    config: ServerConfig,
    db: Arc<Mutex<Database>>,
}

impl Server {
    /// Create a server owning `db`
    pub fn new(config: ServerConfig, db: Database) -> Self {
        Self::with_database(config, Arc::new(Mutex::new(db)))
    }

    /// Create a server over a shared database
    pub fn with_database(config: ServerConfig, db: Arc<Mutex<Database>>) -> Self {
        Self { config, db }
    }

    /// Bind and start serving in the background
    ///
    /// # Returns
    /// ServerHandle used to stop the server
    pub async fn start(&self) -> Result<ServerHandle, AppError> {
        self.config.validate()?;

        let state = Arc::new(AppState {
            db: self.db.clone(),
            settings: Settings::from_config(&self.config)?,
        });
        let app = router(state);

        let listener = tokio::net::TcpListener::bind(self.config.socket_addr()).await?;
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let graceful = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });

            if let Err(e) = graceful.await {
                error!("Server error: {}", e);
            }
        });

        info!(addr = %local_addr, "Wagebook API listening");
        Ok(ServerHandle {
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
            local_addr,
        })
    }
}
