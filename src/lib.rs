//! Attendance tracking service.
//!
//! Keeps a roster of students and one attendance record per student per
//! day in SQLite, and serves them as JSON:
//!
//! - `GET|POST /api/students`, `DELETE /api/students/:id`
//! - `POST /api/attendance`, `GET /api/attendance/:date`
//! - `GET /api/student-attendance/:student_id`
//! - `GET /api/reports`, `GET /api/health`

use tokio::{net::TcpListener, signal};
use tracing::info;

pub mod api;
pub mod calc;
pub mod config;
pub mod db;

use api::{build_router, AppState};
use config::Config;
use db::Database;

pub async fn start_server(config: Config) -> anyhow::Result<()> {
    info!(data_dir = %config.data_dir.display(), "Opening database...");
    let db = Database::open(&config.data_dir)?;
    let app = build_router(AppState::new(db));

    let address = config.address();
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
