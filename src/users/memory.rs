//! In-process [`UserStore`] seeded with the same rows as `sql/schema.sql`.
//!
//! Backs `--store memory` for running without Postgres and the service and
//! handler tests. Data lives as long as the process.

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::{
    models::{Group, GroupCode, NewUserRow, State, StateCode, UserRecord},
    pagination::IdWindow,
    store::{StoreError, StoreResult, UserStore},
};

#[derive(Debug, Clone)]
struct StoredUser {
    id: i32,
    login: String,
    // Mirrors the SQL column; never returned to callers.
    _password_hash: String,
    created_date: NaiveDate,
    user_group_id: i32,
    user_state_id: i32,
}

#[derive(Debug, Default)]
struct Tables {
    groups: Vec<Group>,
    states: Vec<State>,
    users: Vec<StoredUser>,
    next_id: i32,
}

impl Tables {
    fn record(&self, user: &StoredUser) -> Option<UserRecord> {
        let group = self.groups.iter().find(|g| g.id == user.user_group_id)?;
        let state = self.states.iter().find(|s| s.id == user.user_state_id)?;
        Some(UserRecord {
            id: user.id,
            login: user.login.clone(),
            created_date: user.created_date,
            group: group.clone(),
            state: state.clone(),
        })
    }

    // Users are kept in id order, so no sort is needed here.
    fn records(&self, keep: impl Fn(&StoredUser) -> bool) -> Vec<UserRecord> {
        self.users
            .iter()
            .filter(|user| keep(user))
            .filter_map(|user| self.record(user))
            .collect()
    }
}

#[derive(Debug)]
pub struct MemoryUserStore {
    tables: RwLock<Tables>,
}

impl MemoryUserStore {
    /// Empty lookup tables and no users.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tables: RwLock::new(Tables {
                next_id: 1,
                ..Tables::default()
            }),
        }
    }

    /// Groups, states and the three seed users (`admin`, `Alex`, `Jon`).
    #[must_use]
    pub fn seeded() -> Self {
        let seeded_on = NaiveDate::from_ymd_opt(2023, 5, 7).unwrap_or_default();
        let users = [
            (1, "admin", 1, 1),
            (2, "Alex", 2, 1),
            (3, "Jon", 2, 2),
        ]
        .into_iter()
        .map(|(id, login, user_group_id, user_state_id)| StoredUser {
            id,
            login: login.to_string(),
            _password_hash: String::new(),
            created_date: seeded_on,
            user_group_id,
            user_state_id,
        })
        .collect();

        Self {
            tables: RwLock::new(Tables {
                groups: vec![
                    Group {
                        id: 1,
                        code: GroupCode::Admin,
                        description: Some("I am admin!".to_string()),
                    },
                    Group {
                        id: 2,
                        code: GroupCode::User,
                        description: Some("I am default user!".to_string()),
                    },
                ],
                states: vec![
                    State {
                        id: 1,
                        code: StateCode::Active,
                        description: Some("This user is active!".to_string()),
                    },
                    State {
                        id: 2,
                        code: StateCode::Blocked,
                        description: Some("This user is blocked!".to_string()),
                    },
                ],
                users,
                next_id: 4,
            }),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        Ok(self.tables.read().await.records(|_| true))
    }

    async fn list_users_in(&self, window: IdWindow) -> StoreResult<Vec<UserRecord>> {
        Ok(self
            .tables
            .read()
            .await
            .records(move |user| window.contains(user.id)))
    }

    async fn find_user(&self, id: i32) -> StoreResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|user| user.id == id)
            .and_then(|user| tables.record(user)))
    }

    async fn login_exists(&self, login: &str) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().any(|user| user.login == login))
    }

    async fn active_admin_exists(&self) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.records(|_| true).iter().any(|record| {
            record.group.code == GroupCode::Admin && record.state.code == StateCode::Active
        }))
    }

    async fn find_group(&self, code: GroupCode) -> StoreResult<Option<Group>> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.code == code).cloned())
    }

    async fn find_state(&self, code: StateCode) -> StoreResult<Option<State>> {
        let tables = self.tables.read().await;
        Ok(tables.states.iter().find(|s| s.code == code).cloned())
    }

    async fn insert_user(&self, row: NewUserRow) -> StoreResult<i32> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|user| user.login == row.login) {
            return Err(StoreError::DuplicateLogin(row.login));
        }

        let id = tables.next_id;
        tables.next_id += 1;
        tables.users.push(StoredUser {
            id,
            login: row.login,
            _password_hash: row.password_hash,
            created_date: row.created_date,
            user_group_id: row.user_group_id,
            user_state_id: row.user_state_id,
        });
        Ok(id)
    }

    async fn set_user_state(&self, id: i32, state_id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.users.iter_mut().find(|user| user.id == id) {
            Some(user) => {
                user.user_state_id = state_id;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
