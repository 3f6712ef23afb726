use super::{pagination::PageError, signup_guard::GuardError, store::StoreError};
use thiserror::Error;

/// Failure of a user operation, carrying the message shown to API clients.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error("User with id {0} is not exists!")]
    NotFound(i32),
    #[error("User with id {0} is already deleted!")]
    AlreadyBlocked(i32),
    #[error("User with login {0} already exists!")]
    LoginTaken(String),
    #[error("Cannot add another admin!")]
    AdminExists,
    #[error(transparent)]
    Guard(#[from] GuardError),
    #[error("missing lookup row: {0}")]
    MissingLookup(&'static str),
    #[error("failed to hash password: {0}")]
    Password(#[from] bcrypt::BcryptError),
    #[error("password hashing task failed: {0}")]
    HashTask(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for UserError {
    fn from(err: StoreError) -> Self {
        match err {
            // The unique index caught a race the pre-insert check missed.
            StoreError::DuplicateLogin(login) => Self::LoginTaken(login),
            other => Self::Store(other),
        }
    }
}

impl UserError {
    /// Errors caused by the server rather than the request.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::MissingLookup(_) | Self::Password(_) | Self::HashTask(_) | Self::Store(_)
        )
    }
}
