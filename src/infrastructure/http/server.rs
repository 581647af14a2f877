use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use super::routes::create_router;
use super::state::AppState;
use crate::application::errors::AppError;

pub struct Server {
    state: AppState,
    addr: String,
}

impl Server {
    pub fn new(state: AppState, addr: impl Into<String>) -> Self {
        Self {
            state,
            addr: addr.into(),
        }
    }

    pub async fn run(self) -> Result<(), AppError> {
        let router = create_router(self.state);

        let listener = TcpListener::bind(&self.addr)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to bind {}: {}", self.addr, e)))?;

        info!("AgroBot API listening on http://{}", self.addr);
        info!("  GET  /api - Service banner");
        info!("  POST /api/chat - Chat with the assistant");
        info!("  POST /api/predict - Yield prediction");
        info!("  GET  /api/weather/{{location}} - Weather advisory");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
