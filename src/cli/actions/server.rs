use crate::{
    api, short_commit,
    users::{MemoryUserStore, PgUserStore, SignupGuard, UserService, UserStore},
};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::info;
use url::Url;

#[derive(Debug)]
pub enum StoreBackend {
    Postgres { dsn: String, max_connections: u32 },
    /// Seeded in-process store; data is lost on exit.
    Memory,
}

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub store: StoreBackend,
    pub signup_window: Duration,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let store: Arc<dyn UserStore> = match &args.store {
        StoreBackend::Postgres {
            dsn,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .min_connections(1)
                .max_connections(*max_connections)
                .max_lifetime(Duration::from_secs(60 * 2))
                .test_before_acquire(true)
                .connect(dsn)
                .await
                .context("Failed to connect to database")?;
            Arc::new(PgUserStore::new(pool))
        }
        StoreBackend::Memory => Arc::new(MemoryUserStore::seeded()),
    };

    let service = UserService::new(store, SignupGuard::new(args.signup_window));

    let result = api::new(args.port, service).await;
    crate::cli::telemetry::shutdown_tracer();
    result
}

fn log_startup_args(args: &Args) {
    let (store, dsn, pool) = match &args.store {
        StoreBackend::Postgres {
            dsn,
            max_connections,
        } => ("postgres", redact_dsn(dsn), max_connections.to_string()),
        StoreBackend::Memory => ("memory", "n/a".to_string(), "n/a".to_string()),
    };
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("store", store.to_string()),
        ("dsn", dsn),
        ("max_connections", pool),
        (
            "signup_window_ms",
            args.signup_window.as_millis().to_string(),
        ),
    ];
    log_entries("Startup configuration", &entries);
}

fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-dsn".to_string(),
    }
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\n{title}:", banner());
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn banner() -> String {
    BANNER.replace(
        "{VERSION}",
        &format!(
            " - {} - {}",
            env!("CARGO_PKG_VERSION"),
            short_commit(crate::GIT_COMMIT_HASH)
        ),
    )
}

const BANNER: &str = r"
   o   o   o
  /|\ /|\ /|\
  / \ / \ / \   U S E R H U B {VERSION}";
