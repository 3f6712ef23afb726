//! # Userhub (user accounts, groups and states)
//!
//! `userhub` is a small REST service over three tables: `users`, `user_group`
//! and `user_state`. Every user belongs to a group (`Admin` or `User`) and is
//! either `Active` or `Blocked`.
//!
//! ## Rules
//!
//! - **Single admin:** at most one active user may be in the `Admin` group.
//! - **Unique logins:** a login is never reused, even by a blocked user.
//! - **Soft deletes:** `DELETE /api/users/{id}` moves the user to `Blocked`;
//!   rows are never removed.
//! - **Signup guard:** creating a user holds its login for a short window
//!   (5 s by default). Two creates for the same login inside the window both
//!   fail, so a double submit never yields two accounts.
//!
//! ## Pagination
//!
//! `/api/users/{limit}/{offset}` selects by id range rather than by row
//! position; see [`users::pagination`].
//!
//! The Postgres schema and seed rows live in `sql/schema.sql`. The same seed
//! data backs the in-memory store used by `--store memory`.

pub mod api;
pub mod cli;
pub mod users;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

/// First seven characters of a commit hash, or the whole (trimmed) input if shorter.
#[must_use]
pub fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
