//! Router assembly and the listening server.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::{self, AppState};
use axum::routing::get;
use axum::Router;
use rollcall_core::DocumentStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Builds the application router:
/// - `/api`      generic collections plus `/api/health`
/// - `/students` student directory
/// - `/reports`  student report
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handler::health))
        .route(
            "/{collection}",
            get(handler::list_records).post(handler::create_record),
        )
        .route(
            "/{collection}/{id}",
            get(handler::get_record)
                .patch(handler::update_record)
                .delete(handler::delete_record),
        );

    Router::new()
        .nest("/api", api)
        .route(
            "/students",
            get(handler::search_students).post(handler::add_student),
        )
        .route(
            "/students/{id}",
            get(handler::get_student)
                .put(handler::update_student)
                .delete(handler::delete_student),
        )
        .route("/reports/students", get(handler::student_report))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// The Rollcall HTTP server.
///
/// # Example
///
/// ```no_run
/// use rollcall_server::{RollcallServer, ServerConfig};
///
/// # async fn run() -> rollcall_server::ServerResult<()> {
/// let server = RollcallServer::new(ServerConfig::from_env());
/// server.serve().await
/// # }
/// ```
#[derive(Debug)]
pub struct RollcallServer {
    config: ServerConfig,
    state: AppState,
}

impl RollcallServer {
    /// Creates a server over the file named in `config.store`.
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(DocumentStore::open(config.store.clone()));
        Self::with_store(config, store)
    }

    /// Creates a server over an existing store.
    pub fn with_store(config: ServerConfig, store: Arc<DocumentStore>) -> Self {
        Self {
            state: AppState::new(store),
            config,
        }
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the application router.
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Binds and serves until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or serving fails.
    pub async fn serve(self) -> ServerResult<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(
            addr = %listener.local_addr()?,
            db = %self.state.resources().store().location(),
            exclusive_writes = self.config.store.exclusive_writes,
            "server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
