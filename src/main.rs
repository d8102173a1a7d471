//! algodesk - a terminal dashboard for a hosted trading-algorithm API.

use algodesk::api::{ApiClientBuilder, Session};
use algodesk::config::{self, Config};
use algodesk::App;
use anyhow::Context;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to a file, the terminal belongs to the UI
    let log_dir = config::log_dir()?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;
    let (log_writer, _log_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, "algodesk.log"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "algodesk=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(log_writer),
        )
        .init();

    let config = Config::load_or_default().context("loading configuration")?;

    let session_path = match &config.api.session_path {
        Some(path) => path.clone(),
        None => Session::default_path()?,
    };
    let session = Arc::new(Session::load(session_path));

    let mut sign_in_error = None;
    if !session.is_authenticated()
        && let Some((email, password)) = config.auth.credentials()
    {
        // Silent client: no terminal yet to show toasts on
        let client = ApiClientBuilder::new()
            .config(config.api.clone())
            .requests(&config.requests)
            .session(session.clone())
            .build()?;
        if let Err(e) = client
            .login(email, password, &CancellationToken::new())
            .await
        {
            tracing::warn!(error = %e, "Sign-in failed");
            sign_in_error = Some(e.user_message());
        }
    }

    tracing::info!(base_url = %config.api.base_url, "Starting algodesk");

    let mut app = App::new(config, session)?.with_sign_in_error(sign_in_error);
    app.run().await?;

    Ok(())
}
