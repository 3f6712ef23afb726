//! Router tests against the seeded in-memory store.

use crate::{
    api::app,
    users::{
        MemoryUserStore, SignupGuard, StoreError, UserService, UserStore,
        models::{Group, GroupCode, NewUserRow, State, StateCode, UserRecord},
        pagination::IdWindow,
        store::StoreResult,
    },
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

fn test_app() -> Router {
    app(UserService::new(
        Arc::new(MemoryUserStore::seeded()),
        SignupGuard::disabled(),
    ))
}

/// Store whose every call fails like a dropped database connection.
struct UnreachableStore;

fn unreachable() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl UserStore for UnreachableStore {
    async fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        Err(unreachable())
    }

    async fn list_users_in(&self, _window: IdWindow) -> StoreResult<Vec<UserRecord>> {
        Err(unreachable())
    }

    async fn find_user(&self, _id: i32) -> StoreResult<Option<UserRecord>> {
        Err(unreachable())
    }

    async fn login_exists(&self, _login: &str) -> StoreResult<bool> {
        Err(unreachable())
    }

    async fn active_admin_exists(&self) -> StoreResult<bool> {
        Err(unreachable())
    }

    async fn find_group(&self, _code: GroupCode) -> StoreResult<Option<Group>> {
        Err(unreachable())
    }

    async fn find_state(&self, _code: StateCode) -> StoreResult<Option<State>> {
        Err(unreachable())
    }

    async fn insert_user(&self, _row: NewUserRow) -> StoreResult<i32> {
        Err(unreachable())
    }

    async fn set_user_state(&self, _id: i32, _state_id: i32) -> StoreResult<bool> {
        Err(unreachable())
    }

    async fn ping(&self) -> StoreResult<()> {
        Err(unreachable())
    }
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let value = serde_json::from_slice(&bytes)
        .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?;
    Ok((status, value))
}

fn result_ids(body: &Value) -> Vec<i64> {
    body["result"]
        .as_array()
        .map(|users| users.iter().filter_map(|user| user["id"].as_i64()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn list_users_wraps_result_in_envelope() -> Result<()> {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/users", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_success"], true);
    assert_eq!(body["message"], "");
    assert_eq!(body["error_messages"], json!([]));
    assert_eq!(result_ids(&body), vec![1, 2, 3]);
    assert_eq!(body["result"][0]["user_group_code"], "Admin");
    assert!(body["result"][0].get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn page_users_uses_id_window() -> Result<()> {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/users/3/0", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result_ids(&body), vec![1, 2]);

    let (_, body) = send(&app, Method::GET, "/api/users/3/2", None).await?;
    assert_eq!(result_ids(&body), vec![3]);

    let (status, body) = send(&app, Method::GET, "/api/users/3444/21221", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!([]));
    Ok(())
}

#[tokio::test]
async fn page_users_rejects_bad_window() -> Result<()> {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/users/0/1", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["is_success"], false);
    assert!(body["result"].is_null());
    assert_eq!(
        body["error_messages"],
        json!(["Limit cannot be less than or equal to zero!"])
    );

    let (status, body) = send(&app, Method::GET, "/api/users/2/-3", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error_messages"],
        json!(["Offset cannot be less than zero!"])
    );
    Ok(())
}

#[tokio::test]
async fn get_user_found_and_missing() -> Result<()> {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/users/2", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["login"], "Alex");
    assert_eq!(body["result"]["created_date"], "2023-05-07");

    let (status, body) = send(&app, Method::GET, "/api/users/77", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error_messages"],
        json!(["User with id 77 is not exists!"])
    );
    Ok(())
}

#[tokio::test]
async fn non_numeric_id_is_a_bad_request_envelope() -> Result<()> {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/users/abc", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["is_success"], false);
    assert_eq!(body["error_messages"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn create_user_then_fetch() -> Result<()> {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({"login": "bob", "password": "secret", "user_group_code": "User"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["id"], 4);
    assert_eq!(body["result"]["user_state_code"], "Active");
    assert!(body["result"].get("password").is_none());

    let (status, body) = send(&app, Method::GET, "/api/users/4", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["login"], "bob");
    Ok(())
}

#[tokio::test]
async fn create_conflicts_are_409() -> Result<()> {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({"login": "Alex", "password": "pw", "user_group_code": "User"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error_messages"],
        json!(["User with login Alex already exists!"])
    );

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({"login": "root", "password": "pw", "user_group_code": "Admin"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_messages"], json!(["Cannot add another admin!"]));
    Ok(())
}

#[tokio::test]
async fn create_rejects_malformed_body() -> Result<()> {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({"login": "carol", "user_group_code": "User"})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["is_success"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({"login": "carol", "password": "pw", "user_group_code": "Root"})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error_messages"],
        json!(["Unknown user group code: Root"])
    );
    Ok(())
}

#[tokio::test]
async fn delete_blocks_once() -> Result<()> {
    let app = test_app();
    let (status, body) = send(&app, Method::DELETE, "/api/users/2", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], true);

    let (status, body) = send(&app, Method::DELETE, "/api/users/2", None).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error_messages"],
        json!(["User with id 2 is already deleted!"])
    );

    let (status, _) = send(&app, Method::DELETE, "/api/users/99", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/api/users/2", None).await?;
    assert_eq!(body["result"]["user_state_code"], "Blocked");
    Ok(())
}

#[tokio::test]
async fn health_reports_store_and_x_app() -> Result<()> {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let x_app = response
        .headers()
        .get("X-App")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_default();
    assert!(x_app.starts_with(concat!(
        env!("CARGO_PKG_NAME"),
        ":",
        env!("CARGO_PKG_VERSION"),
        ":"
    )));

    let bytes = response.into_body().collect().await?.to_bytes();
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["store"], "ok");
    assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
    Ok(())
}

#[tokio::test]
async fn options_health_has_empty_body() -> Result<()> {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/health")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("X-App"));
    let bytes = response.into_body().collect().await?.to_bytes();
    assert!(bytes.is_empty());
    Ok(())
}

#[tokio::test]
async fn responses_carry_a_request_id() -> Result<()> {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let generated = response
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(str::len);
    assert_eq!(generated, Some(26));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header("x-request-id", "req-123")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok()),
        Some("req-123")
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn concurrent_creates_for_one_login_are_409() -> Result<()> {
    let app = app(UserService::new(
        Arc::new(MemoryUserStore::seeded()),
        SignupGuard::new(Duration::from_secs(5)),
    ));
    let dave = json!({"login": "dave", "password": "pw", "user_group_code": "User"});

    let first = {
        let app = app.clone();
        let dave = dave.clone();
        tokio::spawn(async move { send(&app, Method::POST, "/api/users", Some(dave)).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (status, body) = send(&app, Method::POST, "/api/users", Some(dave.clone())).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["is_success"], false);
    assert_eq!(
        body["error_messages"],
        json!([
            "Failed to create user with login dave because someone tried to do it too in the last 5000 ms!"
        ])
    );

    let (status, body) = first.await??;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error_messages"],
        json!([
            "Failed to create user with login dave because someone tried to do it too in the next 5000 ms!"
        ])
    );

    let (status, body) = send(&app, Method::POST, "/api/users", Some(dave)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["id"], 4);
    Ok(())
}

#[tokio::test]
async fn store_failures_are_masked_as_500() -> Result<()> {
    let app = app(UserService::new(
        Arc::new(UnreachableStore),
        SignupGuard::disabled(),
    ));

    let (status, body) = send(&app, Method::GET, "/api/users", None).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["is_success"], false);
    assert_eq!(body["error_messages"], json!(["Internal server error"]));

    let (status, body) = send(&app, Method::DELETE, "/api/users/2", None).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_messages"], json!(["Internal server error"]));

    let (status, body) = send(&app, Method::GET, "/health", None).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["store"], "error");
    Ok(())
}

#[tokio::test]
async fn serves_openapi_document() -> Result<()> {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], env!("CARGO_PKG_NAME"));
    for path in [
        "/api/users",
        "/api/users/{limit}/{offset}",
        "/api/users/{id}",
        "/health",
    ] {
        assert!(body["paths"].get(path).is_some(), "missing {path}");
    }
    Ok(())
}
