use std::time::Duration;

use axum::Router;
use tokio::signal;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::app::AppState;
use crate::config::Config;
use crate::error::{DeskError, Result};
use crate::health::HealthModule;
use crate::http::{PaymentConfigModule, RouteModule, SupportModule, TablesModule};

/// Tags every request with a UUID `x-request-id`.
#[derive(Clone, Copy, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// The back-office HTTP application.
pub struct App {
    router: Router<AppState>,
    config: Config,
    state: AppState,
}

impl App {
    /// App with the health, table, payment-configuration and support routes.
    pub fn new(config: Config, state: AppState) -> Self {
        Self::empty(config, state)
            .register_module(HealthModule)
            .register_module(TablesModule)
            .register_module(PaymentConfigModule)
            .register_module(SupportModule)
    }

    /// App without any routes.
    pub fn empty(config: Config, state: AppState) -> Self {
        Self {
            router: Router::new(),
            config,
            state,
        }
    }

    pub fn register_module<M: RouteModule>(mut self, module: M) -> Self {
        self.router = module.register(self.router);
        self
    }

    fn with_middleware(mut self) -> Self {
        self.router = self
            .router
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        self
    }

    /// Router with middleware and state applied, ready to serve or test.
    pub fn into_router(self) -> Router {
        let app = self.with_middleware();
        app.router.with_state(app.state)
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.addr().map_err(|e| {
            DeskError::bad_request(format!("Invalid server address: {}", e))
        })?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| DeskError::internal(format!("failed to bind {}: {}", addr, e)))?;

        tracing::info!("Server starting on http://{}", addr);
        tracing::info!("Health check available at http://{}/health", addr);

        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DeskError::internal(format!("server error: {}", e)))
    }
}

/// Complete application router for `state` with default configuration.
pub fn router(state: AppState) -> Router {
    App::new(Config::default(), state).into_router()
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Grace period for in-flight requests
    tokio::time::sleep(Duration::from_secs(1)).await;
    tracing::info!("Shutdown complete");
}
