use chrono::NaiveDate;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

/// Group a user belongs to. Only one active `Admin` may exist at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum GroupCode {
    Admin,
    User,
}

impl GroupCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::User => "User",
        }
    }
}

impl fmt::Display for GroupCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupCode {
    type Err = UnknownCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Admin" => Ok(Self::Admin),
            "User" => Ok(Self::User),
            other => Err(UnknownCode(other.to_string())),
        }
    }
}

/// Lifecycle state. Deleting a user moves it to `Blocked`; rows are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum StateCode {
    Active,
    Blocked,
}

impl StateCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Blocked => "Blocked",
        }
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateCode {
    type Err = UnknownCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Active" => Ok(Self::Active),
            "Blocked" => Ok(Self::Blocked),
            other => Err(UnknownCode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCode(pub String);

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown code: {}", self.0)
    }
}

impl std::error::Error for UnknownCode {}

/// Row of `user_group`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: i32,
    pub code: GroupCode,
    pub description: Option<String>,
}

/// Row of `user_state`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub id: i32,
    pub code: StateCode,
    pub description: Option<String>,
}

/// A user joined with its group and state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i32,
    pub login: String,
    pub created_date: NaiveDate,
    pub group: Group,
    pub state: State,
}

/// Row handed to the store on create; ids are already resolved.
#[derive(Debug, Clone)]
pub struct NewUserRow {
    pub login: String,
    pub password_hash: String,
    pub created_date: NaiveDate,
    pub user_group_id: i32,
    pub user_state_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub login: String,
    #[schema(value_type = String, format = Date, example = "2023-05-07")]
    pub created_date: NaiveDate,
    pub user_group_id: i32,
    pub user_group_code: GroupCode,
    pub user_group_description: Option<String>,
    pub user_state_id: i32,
    pub user_state_code: StateCode,
    pub user_state_description: Option<String>,
}

impl From<UserRecord> for UserSummary {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            login: record.login,
            created_date: record.created_date,
            user_group_id: record.group.id,
            user_group_code: record.group.code,
            user_group_description: record.group.description,
            user_state_id: record.state.id,
            user_state_code: record.state.code,
            user_state_description: record.state.description,
        }
    }
}

/// Signup payload for `POST /api/users`.
///
/// The group code stays a string here so an unknown code is reported through
/// the response envelope instead of a JSON rejection.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    pub login: String,
    #[schema(value_type = String, format = Password)]
    pub password: SecretString,
    pub user_group_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedUser {
    pub id: i32,
    pub login: String,
    #[schema(value_type = String, format = Date, example = "2023-05-07")]
    pub created_date: NaiveDate,
    pub user_group_code: GroupCode,
    pub user_state_code: StateCode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_code_round_trips_through_str() {
        assert_eq!("Admin".parse::<GroupCode>(), Ok(GroupCode::Admin));
        assert_eq!(" User ".parse::<GroupCode>(), Ok(GroupCode::User));
        assert_eq!(GroupCode::Admin.to_string(), "Admin");
    }

    #[test]
    fn codes_are_case_sensitive() {
        assert_eq!(
            "admin".parse::<GroupCode>(),
            Err(UnknownCode("admin".to_string()))
        );
        assert!("blocked".parse::<StateCode>().is_err());
        assert_eq!("Blocked".parse::<StateCode>(), Ok(StateCode::Blocked));
    }

    #[test]
    fn summary_flattens_group_and_state() {
        let record = UserRecord {
            id: 7,
            login: "alice".to_string(),
            created_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap_or_default(),
            group: Group {
                id: 2,
                code: GroupCode::User,
                description: Some("I am default user!".to_string()),
            },
            state: State {
                id: 1,
                code: StateCode::Active,
                description: None,
            },
        };

        let summary = UserSummary::from(record);
        assert_eq!(summary.user_group_id, 2);
        assert_eq!(summary.user_group_code, GroupCode::User);
        assert_eq!(
            summary.user_group_description.as_deref(),
            Some("I am default user!")
        );
        assert_eq!(summary.user_state_code, StateCode::Active);
        assert_eq!(summary.user_state_description, None);
    }

    #[test]
    fn summary_serializes_date_and_codes() {
        let summary = UserSummary {
            id: 1,
            login: "admin".to_string(),
            created_date: NaiveDate::from_ymd_opt(2023, 5, 7).unwrap_or_default(),
            user_group_id: 1,
            user_group_code: GroupCode::Admin,
            user_group_description: Some("I am admin!".to_string()),
            user_state_id: 1,
            user_state_code: StateCode::Active,
            user_state_description: Some("This user is active!".to_string()),
        };

        let value = serde_json::to_value(&summary).unwrap_or_default();
        assert_eq!(value["created_date"], "2023-05-07");
        assert_eq!(value["user_group_code"], "Admin");
        assert_eq!(value["user_state_code"], "Active");
        assert!(value.get("password").is_none());
    }

    #[test]
    fn new_user_rejects_unknown_fields() {
        let result = serde_json::from_str::<NewUser>(
            r#"{"login":"bob","password":"pw","user_group_code":"User","role":"root"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn new_user_debug_redacts_password() {
        let user: Result<NewUser, _> = serde_json::from_str(
            r#"{"login":"bob","password":"hunter2","user_group_code":"User"}"#,
        );
        assert!(user.is_ok());
        if let Ok(user) = user {
            assert!(!format!("{user:?}").contains("hunter2"));
        }
    }
}
