//! Process startup: tracing and backend selection.
//!
//! The backend is chosen once. A database that cannot be reached or
//! migrated downgrades the process to the in-memory backend and leaves the
//! failure in a side-channel log file next to the working directory.

use std::path::Path;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::config::{AppConfig, StorageConfig};
use crate::domain::TariffRepository;
use crate::infrastructure::database::{connect_and_migrate, DatabaseConfig, SeaOrmTariffRepository};
use crate::infrastructure::storage::InMemoryTariffRepository;
use crate::shared::errors::InfraError;

/// Which backend the process ended up with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Database,
    Memory,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database => write!(f, "database"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

pub struct SelectedBackend {
    pub repository: Arc<dyn TariffRepository>,
    pub kind: BackendKind,
    /// Set when the database probe failed.
    pub probe_error: Option<String>,
}

impl SelectedBackend {
    /// Whether writes survive the end of the process.
    pub fn is_persistent(&self) -> bool {
        self.kind == BackendKind::Database
    }

    fn memory(probe_error: Option<String>) -> Self {
        Self {
            repository: Arc::new(InMemoryTariffRepository::new()),
            kind: BackendKind::Memory,
            probe_error,
        }
    }
}

pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Make sure the database directory exists, connect, and migrate.
pub async fn probe_database(storage: &StorageConfig) -> Result<DatabaseConnection, InfraError> {
    if let Some(parent) = storage.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let db = connect_and_migrate(&DatabaseConfig::sqlite(&storage.database_path)).await?;
    Ok(db)
}

/// Pick the repository for this process.
pub async fn select_repository(config: &AppConfig) -> SelectedBackend {
    let storage = &config.storage;
    if !storage.use_database {
        info!("Database disabled by configuration, using in-memory storage");
        return SelectedBackend::memory(None);
    }

    match probe_database(storage).await {
        Ok(db) => {
            remove_stale_error_log(&storage.error_log_path).await;
            info!("Using database at {}", storage.database_path.display());
            SelectedBackend {
                repository: Arc::new(SeaOrmTariffRepository::new(db)),
                kind: BackendKind::Database,
                probe_error: None,
            }
        }
        Err(e) => {
            warn!("Database unavailable ({}), falling back to in-memory storage", e);
            if let Err(log_err) =
                write_probe_failure(&storage.error_log_path, &storage.database_path, &e).await
            {
                warn!(
                    "Could not write {}: {}",
                    storage.error_log_path.display(),
                    log_err
                );
            }
            SelectedBackend::memory(Some(e.to_string()))
        }
    }
}

async fn write_probe_failure(
    log_path: &Path,
    database_path: &Path,
    error: &InfraError,
) -> std::io::Result<()> {
    let entry = format!(
        "{}: database connection failed\npath: {}\nerror: {}\n",
        chrono::Local::now().to_rfc3339(),
        database_path.display(),
        error
    );
    tokio::fs::write(log_path, entry).await
}

async fn remove_stale_error_log(log_path: &Path) {
    match tokio::fs::remove_file(log_path).await {
        Ok(()) => info!("Removed stale {}", log_path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove {}: {}", log_path.display(), e),
    }
}
