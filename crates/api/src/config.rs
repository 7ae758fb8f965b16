//! Environment-driven configuration for the API binary.

use std::net::SocketAddr;

use anyhow::{bail, Context};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8081";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_DB_PORT: &str = "5432";

/// Which [`InventoryStore`](stockroom_infra::InventoryStore) backs the API.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Postgres { .. } => "postgres",
        }
    }
}

// The database URL carries a password; keep it out of logs.
impl std::fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => f.write_str("Memory"),
            StoreBackend::Postgres {
                max_connections, ..
            } => f
                .debug_struct("Postgres")
                .field("database_url", &"<redacted>")
                .field("max_connections", max_connections)
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub backend: StoreBackend,
}

impl ApiConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key/value source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:8081")?;

        let backend = match var("STORE_BACKEND").as_deref().map(str::to_ascii_lowercase) {
            None => StoreBackend::Memory,
            Some(kind) if kind == "memory" => StoreBackend::Memory,
            Some(kind) if kind == "postgres" => {
                let database_url = match var("DATABASE_URL") {
                    Some(url) => url,
                    None => database_url_from_parts(&var)?,
                };
                let max_connections = match var("DB_MAX_CONNECTIONS") {
                    Some(raw) => raw
                        .parse::<u32>()
                        .context("DB_MAX_CONNECTIONS must be a positive integer")?,
                    None => DEFAULT_MAX_CONNECTIONS,
                };
                if max_connections == 0 {
                    bail!("DB_MAX_CONNECTIONS must be a positive integer");
                }
                StoreBackend::Postgres {
                    database_url,
                    max_connections,
                }
            }
            Some(other) => bail!("unknown STORE_BACKEND {other:?} (expected memory or postgres)"),
        };

        Ok(Self { bind_addr, backend })
    }
}

fn database_url_from_parts(var: &impl Fn(&str) -> Option<String>) -> anyhow::Result<String> {
    let required = |key: &str| {
        var(key).with_context(|| format!("{key} must be set when DATABASE_URL is not"))
    };

    let user = required("DB_USERNAME")?;
    let password = var("DB_PASSWORD").unwrap_or_default();
    let host = required("DB_HOST")?;
    let port = var("DB_PORT").unwrap_or_else(|| DEFAULT_DB_PORT.to_string());
    let name = required("DB_NAME")?;

    Ok(format!(
        "postgres://{user}:{password}@{host}:{port}/{name}?sslmode=disable"
    ))
}
