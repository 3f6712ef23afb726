use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row, postgres::PgRow};
use tracing::{Instrument, info_span};

use super::{
    models::{Group, GroupCode, NewUserRow, State, StateCode, UserRecord},
    pagination::IdWindow,
    store::{StoreError, StoreResult, UserStore},
};

const SELECT_USERS: &str = r"
    SELECT
        u.id,
        u.login,
        u.created_date,
        g.id AS group_id,
        g.code AS group_code,
        g.description AS group_description,
        s.id AS state_id,
        s.code AS state_code,
        s.description AS state_description
    FROM users u
    JOIN user_group g ON g.id = u.user_group_id
    JOIN user_state s ON s.id = u.user_state_id
";

/// [`UserStore`] backed by the Postgres schema in `sql/schema.sql`.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

macro_rules! db_span {
    ($operation:expr, $statement:expr) => {
        info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = $operation,
            db.statement = $statement
        )
    };
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        let query = format!("{SELECT_USERS} ORDER BY u.id");
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .instrument(db_span!("SELECT", query.as_str()))
            .await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn list_users_in(&self, window: IdWindow) -> StoreResult<Vec<UserRecord>> {
        let query = format!("{SELECT_USERS} WHERE u.id BETWEEN $1 AND $2 ORDER BY u.id");
        let rows = sqlx::query(&query)
            .bind(window.first())
            .bind(window.last())
            .fetch_all(&self.pool)
            .instrument(db_span!("SELECT", query.as_str()))
            .await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn find_user(&self, id: i32) -> StoreResult<Option<UserRecord>> {
        let query = format!("{SELECT_USERS} WHERE u.id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(db_span!("SELECT", query.as_str()))
            .await?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn login_exists(&self, login: &str) -> StoreResult<bool> {
        let query = "SELECT EXISTS (SELECT 1 FROM users WHERE login = $1) AS found";
        let row = sqlx::query(query)
            .bind(login)
            .fetch_one(&self.pool)
            .instrument(db_span!("SELECT", query))
            .await?;
        Ok(row.try_get("found")?)
    }

    async fn active_admin_exists(&self) -> StoreResult<bool> {
        let query = r"
            SELECT EXISTS (
                SELECT 1
                FROM users u
                JOIN user_group g ON g.id = u.user_group_id
                JOIN user_state s ON s.id = u.user_state_id
                WHERE g.code = $1 AND s.code = $2
            ) AS found
        ";
        let row = sqlx::query(query)
            .bind(GroupCode::Admin.as_str())
            .bind(StateCode::Active.as_str())
            .fetch_one(&self.pool)
            .instrument(db_span!("SELECT", query))
            .await?;
        Ok(row.try_get("found")?)
    }

    async fn find_group(&self, code: GroupCode) -> StoreResult<Option<Group>> {
        let query = "SELECT id, code, description FROM user_group WHERE code = $1";
        let row = sqlx::query(query)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .instrument(db_span!("SELECT", query))
            .await?;
        row.map(|row| -> StoreResult<Group> {
            Ok(Group {
                id: row.try_get("id")?,
                code: row.try_get::<String, _>("code")?.parse()?,
                description: row.try_get("description")?,
            })
        })
        .transpose()
    }

    async fn find_state(&self, code: StateCode) -> StoreResult<Option<State>> {
        let query = "SELECT id, code, description FROM user_state WHERE code = $1";
        let row = sqlx::query(query)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .instrument(db_span!("SELECT", query))
            .await?;
        row.map(|row| -> StoreResult<State> {
            Ok(State {
                id: row.try_get("id")?,
                code: row.try_get::<String, _>("code")?.parse()?,
                description: row.try_get("description")?,
            })
        })
        .transpose()
    }

    async fn insert_user(&self, row: NewUserRow) -> StoreResult<i32> {
        let query = r"
            INSERT INTO users (login, password_hash, created_date, user_group_id, user_state_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
        ";
        let result = sqlx::query(query)
            .bind(&row.login)
            .bind(&row.password_hash)
            .bind(row.created_date)
            .bind(row.user_group_id)
            .bind(row.user_state_id)
            .fetch_one(&self.pool)
            .instrument(db_span!("INSERT", query))
            .await;

        match result {
            Ok(inserted) => Ok(inserted.try_get("id")?),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                Err(StoreError::DuplicateLogin(row.login))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn set_user_state(&self, id: i32, state_id: i32) -> StoreResult<bool> {
        let query = "UPDATE users SET user_state_id = $1 WHERE id = $2";
        let result = sqlx::query(query)
            .bind(state_id)
            .bind(id)
            .execute(&self.pool)
            .instrument(db_span!("UPDATE", query))
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;
        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;
        Ok(())
    }
}

fn record_from_row(row: &PgRow) -> StoreResult<UserRecord> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        login: row.try_get("login")?,
        created_date: row.try_get("created_date")?,
        group: Group {
            id: row.try_get("group_id")?,
            code: row.try_get::<String, _>("group_code")?.parse()?,
            description: row.try_get("group_description")?,
        },
        state: State {
            id: row.try_get("state_id")?,
            code: row.try_get::<String, _>("state_code")?.parse()?,
            description: row.try_get("state_description")?,
        },
    })
}
