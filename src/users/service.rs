//! User operations on top of a [`UserStore`].

use chrono::Utc;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    error::UserError,
    models::{CreatedUser, GroupCode, NewUser, NewUserRow, StateCode, UserSummary},
    pagination::IdWindow,
    password::hash_password,
    signup_guard::SignupGuard,
    store::UserStore,
};

/// Width of `users.login`.
pub const MAX_LOGIN_LEN: usize = 16;
/// Longest plaintext password accepted before hashing.
pub const MAX_PASSWORD_LEN: usize = 16;

/// Service for user management operations.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    guard: SignupGuard,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

impl UserService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, guard: SignupGuard) -> Self {
        Self { store, guard }
    }

    #[must_use]
    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    /// All users ordered by id.
    ///
    /// # Errors
    /// Returns [`UserError::Store`] if the store fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<UserSummary>, UserError> {
        let records = self.store.list_users().await?;
        Ok(records.into_iter().map(UserSummary::from).collect())
    }

    /// Users whose id falls in the window described by `limit` and `offset`.
    ///
    /// # Errors
    /// Returns [`UserError::Page`] for an invalid limit or offset.
    #[instrument(skip(self))]
    pub async fn page(&self, limit: i64, offset: i64) -> Result<Vec<UserSummary>, UserError> {
        let window = IdWindow::new(limit, offset)?;
        let records = self.store.list_users_in(window).await?;
        Ok(records.into_iter().map(UserSummary::from).collect())
    }

    /// # Errors
    /// Returns [`UserError::NotFound`] if no user has this id.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<UserSummary, UserError> {
        self.store
            .find_user(id)
            .await?
            .map(UserSummary::from)
            .ok_or(UserError::NotFound(id))
    }

    /// Create a user in the `Active` state.
    ///
    /// The login is claimed on the signup guard before any check runs and is
    /// held until the row is written, so two creates for one login inside
    /// the guard window both fail.
    ///
    /// # Errors
    /// Returns a validation, conflict or guard error; see [`UserError`].
    #[instrument(skip(self, request), fields(login = %request.login))]
    pub async fn create(&self, request: NewUser) -> Result<CreatedUser, UserError> {
        let group_code = validate(&request)?;
        let login = request.login.trim().to_string();

        let ticket = self.guard.claim(&login)?;

        if self.store.login_exists(&login).await? {
            return Err(UserError::LoginTaken(login));
        }

        if group_code == GroupCode::Admin && self.store.active_admin_exists().await? {
            return Err(UserError::AdminExists);
        }

        let state = self
            .store
            .find_state(StateCode::Active)
            .await?
            .ok_or(UserError::MissingLookup("user_state Active"))?;
        let group = self
            .store
            .find_group(group_code)
            .await?
            .ok_or(UserError::MissingLookup("user_group"))?;

        let password = request.password;
        // bcrypt is CPU bound; keep it off the async workers.
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password(&password)).await??;
        let created_date = Utc::now().date_naive();

        ticket.wait().await?;

        let id = self
            .store
            .insert_user(NewUserRow {
                login: login.clone(),
                password_hash,
                created_date,
                user_group_id: group.id,
                user_state_id: state.id,
            })
            .await?;
        drop(ticket);

        info!(user_id = id, login = %login, group = %group.code, "Created new user");

        Ok(CreatedUser {
            id,
            login,
            created_date,
            user_group_code: group.code,
            user_state_code: state.code,
        })
    }

    /// Soft delete: move the user to `Blocked`.
    ///
    /// # Errors
    /// Returns [`UserError::NotFound`] or [`UserError::AlreadyBlocked`].
    #[instrument(skip(self))]
    pub async fn block(&self, id: i32) -> Result<bool, UserError> {
        let record = self
            .store
            .find_user(id)
            .await?
            .ok_or(UserError::NotFound(id))?;
        if record.state.code == StateCode::Blocked {
            return Err(UserError::AlreadyBlocked(id));
        }

        let blocked = self
            .store
            .find_state(StateCode::Blocked)
            .await?
            .ok_or(UserError::MissingLookup("user_state Blocked"))?;

        if !self.store.set_user_state(id, blocked.id).await? {
            return Err(UserError::NotFound(id));
        }

        info!(user_id = id, login = %record.login, "Blocked user");
        Ok(true)
    }
}

fn validate(request: &NewUser) -> Result<GroupCode, UserError> {
    let login = request.login.trim();
    if login.is_empty() {
        return Err(UserError::InvalidInput("Login is required.".to_string()));
    }
    if login.chars().count() > MAX_LOGIN_LEN {
        return Err(UserError::InvalidInput(format!(
            "Login cannot be longer than {MAX_LOGIN_LEN} characters!"
        )));
    }
    if login.chars().any(char::is_whitespace) {
        return Err(UserError::InvalidInput(
            "Login cannot contain whitespace!".to_string(),
        ));
    }

    let password = request.password.expose_secret();
    if password.is_empty() {
        return Err(UserError::InvalidInput("Password is required.".to_string()));
    }
    if password.chars().count() > MAX_PASSWORD_LEN {
        return Err(UserError::InvalidInput(format!(
            "Password cannot be longer than {MAX_PASSWORD_LEN} characters!"
        )));
    }

    request
        .user_group_code
        .parse()
        .map_err(|_| {
            UserError::InvalidInput(format!(
                "Unknown user group code: {}",
                request.user_group_code.trim()
            ))
        })
}
