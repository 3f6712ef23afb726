//! Map parsed CLI arguments to an [`Action`].

use crate::cli::{
    actions::{
        Action,
        server::{Args, StoreBackend},
    },
    commands::{
        ARG_DSN, ARG_MAX_CONNECTIONS, ARG_PORT, ARG_SIGNUP_WINDOW_MS, ARG_STORE, STORE_MEMORY,
    },
};
use anyhow::{Context, Result};
use std::time::Duration;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let signup_window = Duration::from_millis(
        matches
            .get_one::<u64>(ARG_SIGNUP_WINDOW_MS)
            .copied()
            .unwrap_or(5000),
    );

    let store = if matches.get_one::<String>(ARG_STORE).map(String::as_str) == Some(STORE_MEMORY)
    {
        StoreBackend::Memory
    } else {
        let dsn = matches
            .get_one::<String>(ARG_DSN)
            .cloned()
            .context("missing required argument: --dsn")?;
        let max_connections = matches
            .get_one::<u32>(ARG_MAX_CONNECTIONS)
            .copied()
            .unwrap_or(5);
        StoreBackend::Postgres {
            dsn,
            max_connections,
        }
    };

    Ok(Action::Server(Args {
        port,
        store,
        signup_window,
    }))
}
