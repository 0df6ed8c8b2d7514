//! Server startup and shutdown.

use std::sync::Arc;

use thiserror::Error;

use super::{router, signal::shutdown_signal, state::AppState};
use crate::{
    config::Config,
    domain::GatewayError,
    infrastructure::{db, mailer::SmtpMailer, storage::LocalImageStore},
};

/// Fatal startup or serving failures
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Mailer configuration error: {0}")]
    Mailer(#[from] GatewayError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the server until a shutdown signal arrives
pub async fn run(config: Config) -> Result<(), ServerError> {
    let pool = db::init(&config.database_url).await?;
    tracing::info!("Database ready at {}", config.database_url);

    let mailer = SmtpMailer::new(&config.smtp_settings())?;
    if config.email_verification && !mailer.is_enabled() {
        tracing::warn!("Email verification is on but SMTP is not configured; codes are only logged");
    }
    let images = LocalImageStore::new(&config.upload_dir);

    let state = Arc::new(AppState::new(
        pool.clone(),
        Arc::new(mailer),
        Arc::new(images),
        config.email_verification,
    ));
    let cors = router::cors_layer(&config.cors_origin).map_err(ServerError::Config)?;
    let app = router::build_router(state, &config.upload_dir, cors);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}
