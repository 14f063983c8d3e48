//! Invoice dashboard server
//!
//! Usage: `invoice-dashboard [config.yaml]`. Without an argument the path
//! is read from `DASHBOARD_CONFIG`; without either, defaults and
//! environment overrides apply.

use anyhow::Result;
use chrono::Duration;
use dashboard::auth::CredentialsProvider;
use dashboard::config::{AppConfig, CONFIG_ENV, StorageBackend};
use dashboard::core::invoice::User;
use dashboard::server::ServerBuilder;
use dashboard::storage::{InMemoryInvoiceStore, InMemoryUserStore};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok());

    let config = match AppConfig::load(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let ttl = i64::try_from(config.auth.session_ttl_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| anyhow::anyhow!("auth.session_ttl_secs is out of range"))?;
    let builder = ServerBuilder::new()
        .with_login_path(config.auth.login_path.clone())
        .with_page_size(config.server.page_size);

    let builder = match config.storage.backend {
        StorageBackend::Memory => {
            let users = config.auth.users.iter().map(|u| User {
                id: Uuid::new_v4().to_string(),
                name: u.name.clone(),
                email: u.email.clone(),
                password_hash: u.password_hash.clone(),
            });
            let users = Arc::new(InMemoryUserStore::new(users));
            tracing::info!(
                customers = config.storage.customers.len(),
                users = config.auth.users.len(),
                "using in-memory storage"
            );
            builder
                .with_invoice_store(InMemoryInvoiceStore::with_customers(
                    config.storage.customers.clone(),
                ))
                .with_session_provider(CredentialsProvider::new(users, ttl))
        }
        StorageBackend::Postgres => postgres_stores(builder, &config, ttl).await?,
    };

    builder.serve(&config.server.bind).await
}

#[cfg(feature = "postgres")]
async fn postgres_stores(
    builder: ServerBuilder,
    config: &AppConfig,
    ttl: Duration,
) -> Result<ServerBuilder> {
    use dashboard::storage::{PostgresInvoiceStore, PostgresUserStore, postgres};

    let url = config.storage.url.as_deref().unwrap_or_default();
    let pool = postgres::connect(url, config.storage.max_connections).await?;
    postgres::ensure_schema(&pool).await?;
    tracing::info!("connected to PostgreSQL");

    let users = Arc::new(PostgresUserStore::new(pool.clone()));
    Ok(builder
        .with_invoice_store(PostgresInvoiceStore::new(pool))
        .with_session_provider(CredentialsProvider::new(users, ttl)))
}

#[cfg(not(feature = "postgres"))]
async fn postgres_stores(
    _builder: ServerBuilder,
    _config: &AppConfig,
    _ttl: Duration,
) -> Result<ServerBuilder> {
    anyhow::bail!("storage backend 'postgres' requires the `postgres` feature")
}
