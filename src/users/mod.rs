//! User accounts, their group (`Admin`/`User`) and state (`Active`/`Blocked`).
//!
//! [`UserService`] holds the rules: one active admin at a time, unique
//! logins, soft delete by blocking, and the signup guard around creation.
//! Storage sits behind [`UserStore`], with a Postgres and an in-memory
//! implementation.

mod error;
pub mod memory;
pub mod models;
pub mod pagination;
mod password;
pub mod postgres;
mod service;
pub mod signup_guard;
pub mod store;

pub use error::UserError;
pub use memory::MemoryUserStore;
pub use models::{CreatedUser, GroupCode, NewUser, StateCode, UserSummary};
pub use postgres::PgUserStore;
pub use service::{MAX_LOGIN_LEN, MAX_PASSWORD_LEN, UserService};
pub use signup_guard::SignupGuard;
pub use store::{StoreError, UserStore};
