//! Journal HTTP server.
//!
//! # Responsibility
//! - Wire configuration, logging, storage and the API router together.
//! - Serve until Ctrl-C or SIGTERM, then drain in-flight requests.

mod config;

use config::{ConfigError, ServerConfig};
use journal_api::{router, AppState, HeaderIdentityResolver};
use journal_core::db::{open_db, DbError};
use journal_core::{SqliteEntryStore, StoreError};
use log::{error, info, warn};
use std::fmt::{Display, Formatter};
use std::process::ExitCode;
use tokio::net::TcpListener;
use tokio::signal;

#[derive(Debug)]
enum StartupError {
    Config(ConfigError),
    Logging(String),
    Db(DbError),
    Schema(StoreError),
    UserHeader(String),
    Io(std::io::Error),
}

impl Display for StartupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Logging(err) => write!(f, "logging init failed: {err}"),
            Self::Db(err) => write!(f, "database open failed: {err}"),
            Self::Schema(err) => write!(f, "database schema check failed: {err}"),
            Self::UserHeader(err) => write!(f, "invalid user header: {err}"),
            Self::Io(err) => write!(f, "server io failed: {err}"),
        }
    }
}

impl From<ConfigError> for StartupError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for StartupError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<std::io::Error> for StartupError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_start module=server status=error error={err}");
            eprintln!("journal_server: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env()?;
    journal_core::init_logging(&config.log_level, config.log_dir.as_deref())
        .map_err(StartupError::Logging)?;

    let conn = open_db(&config.db_path)?;
    SqliteEntryStore::try_new(&conn).map_err(StartupError::Schema)?;

    let identity = HeaderIdentityResolver::new(&config.user_header, config.auth_secret.clone())
        .map_err(|err| StartupError::UserHeader(err.to_string()))?;
    let app = router(AppState::new(conn, identity));

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(
        "event=server_start module=server status=ok addr={} db_path={} auth_secret={} version={}",
        config.bind_addr,
        config.db_path.display(),
        config.auth_secret.is_some(),
        journal_core::core_version()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("event=signal_install module=server status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("event=signal_install module=server status=error signal=sigterm error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("event=server_shutdown module=server status=ok signal=ctrl_c"),
        _ = terminate => info!("event=server_shutdown module=server status=ok signal=sigterm"),
    }
}
