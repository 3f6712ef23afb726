//! Helpers shared by the userhub integration tests.
//!
//! Tests start a throwaway Postgres container, apply the service schema and
//! hand the DSN to the code under test. When no container runtime is
//! reachable, [`runtime::ensure_container_runtime`] returns an error and the
//! caller skips the test.

pub mod postgres;
pub mod runtime;

use uuid::Uuid;

pub(crate) fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Split a SQL script into executable statements.
///
/// Statements end with `;` at the end of a line. Comment-only lines and psql
/// meta commands (`\ir`, `\c`) are dropped.
#[must_use]
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('\\') || trimmed.starts_with("--") {
            continue;
        }
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            let statement = current.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}
