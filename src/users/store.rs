//! Persistence seam for the user service.

use async_trait::async_trait;
use thiserror::Error;

use super::{
    models::{Group, GroupCode, NewUserRow, State, StateCode, UnknownCode, UserRecord},
    pagination::IdWindow,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("login {0} is already taken")]
    DuplicateLogin(String),
    #[error("stored row has an {0}")]
    UnknownCode(#[from] UnknownCode),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Queries the user service runs. Joined reads return users with their group
/// and state rows attached, ordered by id.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_users(&self) -> StoreResult<Vec<UserRecord>>;

    async fn list_users_in(&self, window: IdWindow) -> StoreResult<Vec<UserRecord>>;

    async fn find_user(&self, id: i32) -> StoreResult<Option<UserRecord>>;

    async fn login_exists(&self, login: &str) -> StoreResult<bool>;

    /// Whether any user is both in the `Admin` group and `Active`.
    async fn active_admin_exists(&self) -> StoreResult<bool>;

    async fn find_group(&self, code: GroupCode) -> StoreResult<Option<Group>>;

    async fn find_state(&self, code: StateCode) -> StoreResult<Option<State>>;

    /// Insert a user and return its id.
    ///
    /// A login collision must surface as [`StoreError::DuplicateLogin`].
    async fn insert_user(&self, row: NewUserRow) -> StoreResult<i32>;

    /// Point a user at another state. Returns `false` if the user is missing.
    async fn set_user_state(&self, id: i32, state_id: i32) -> StoreResult<bool>;

    /// Cheap liveness probe for `/health`.
    async fn ping(&self) -> StoreResult<()>;
}
