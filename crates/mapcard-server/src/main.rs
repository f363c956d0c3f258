mod api;
mod middleware;
mod settings_store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::AuthState,
    settings_store::SettingsStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(mapcard_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let settings = Arc::new(SettingsStore::open(&config.settings_path).await?);
    let geocoder = Arc::new(mapcard_geocode::GeocodeClient::with_base_url(
        config.geocoder_timeout_secs,
        &config.geocoder_base_url,
    )?);

    let auth = AuthState::from_env(matches!(config.env, mapcard_core::Environment::Development))?;

    tracing::info!(
        env = %config.env,
        bind_addr = %config.bind_addr,
        settings_path = %config.settings_path.display(),
        auth_enabled = auth.enabled,
        "starting mapcard server"
    );

    let app = build_app(
        AppState {
            config: Arc::clone(&config),
            settings,
            geocoder,
        },
        auth,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
