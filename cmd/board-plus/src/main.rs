//! # board-plus
//!
//! Composition root: loads settings, installs logging, picks the document
//! store backend and serves the web app until Ctrl-C.

use std::sync::Arc;

use anyhow::{bail, Context};
use api_adapters::{router, AppState, WebSettings};
use auth_adapters::JwtSessionProvider;
use configs::{LogFormat, LogSettings, Settings, StoreBackend, StoreSettings};
use domains::DocumentStore;
use secrecy::ExposeSecret;
use storage_adapters::MemoryDocumentStore;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "db-postgres")]
const PG_MAX_CONNECTIONS: u32 = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log);

    let store = open_store(&settings.store).await?;
    let sessions = Arc::new(JwtSessionProvider::new(
        settings.auth.session_secret.expose_secret().as_bytes(),
        settings.auth.session_ttl(),
    ));
    let web = WebSettings {
        public_origin: settings.server.origin().to_string(),
        cookie_name: settings.auth.cookie_name.clone(),
        session_ttl: settings.auth.session_ttl(),
        dev_login: settings.auth.dev_login,
    };
    if web.dev_login {
        tracing::warn!("development sign-in is enabled; do not expose this instance");
    }
    let state = Arc::new(AppState::new(store, sessions, web, settings.home.revalidate()));

    let addr = settings.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, origin = %settings.server.origin(), "board-plus listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("board-plus stopped");
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn open_store(settings: &StoreSettings) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match settings.backend {
        StoreBackend::Memory => {
            tracing::info!(backend = "memory", "document store ready; data is lost on exit");
            Ok(Arc::new(MemoryDocumentStore::default()))
        }
        StoreBackend::Postgres => open_postgres(settings).await,
    }
}

#[cfg(feature = "db-postgres")]
async fn open_postgres(settings: &StoreSettings) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let Some(url) = settings.database_url.as_ref() else {
        bail!("store.database_url is required for the postgres backend");
    };
    let store = storage_adapters::PgDocumentStore::connect(url.expose_secret(), PG_MAX_CONNECTIONS)
        .await
        .context("connecting to postgres")?;
    store.migrate().await.context("running migrations")?;
    tracing::info!(backend = "postgres", "document store ready");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "db-postgres"))]
async fn open_postgres(_settings: &StoreSettings) -> anyhow::Result<Arc<dyn DocumentStore>> {
    bail!("this build has no postgres support; rebuild with the `db-postgres` feature")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
