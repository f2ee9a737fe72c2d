//! Test utilities for database and HTTP testing.
//!
//! Sets up an in-memory SQLite database with migrations applied, an
//! application router on top of it, and helpers for authenticated requests.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::Value;
use timetable::{
    config::AppConfig,
    models::user::Model as UserModel,
    repositories::{NewUser, UserRepository},
    server::{AppState, create_app},
};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-tests-secret-32-bytes!!";
pub const ADMIN_EMAIL: &str = "admin@univ.mg";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// A single pooled connection keeps every query on the same in-memory store.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await?;

    Migrator::up(&db, None).await?;

    // Restrict-on-delete is enforced by the repositories; turning SQLite's own
    // FK checks off lets tests plant dangling references on purpose.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = OFF".to_string(),
    ))
    .await?;

    Ok(db)
}

/// Configuration with a cheap hashing cost for fast tests.
pub fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        jwt_secret: Some(TEST_SECRET.to_string()),
        password_hash_iterations: 1000,
        ..Default::default()
    }
}

/// Router and state over a fresh database.
pub async fn setup_app() -> Result<(Router, AppState)> {
    let db = setup_test_db().await?;
    let state = AppState::new(Arc::new(test_config()), db)?;
    Ok((create_app(state.clone()), state))
}

/// Inserts a user straight through the repository.
pub async fn seed_user(
    state: &AppState,
    email: &str,
    password: &str,
    role: &str,
) -> Result<UserModel> {
    let user = UserRepository::new(&state.db)
        .create_user(
            &state.hasher,
            NewUser {
                last_name: "Rabe".to_string(),
                first_name: "Admin".to_string(),
                email: email.to_string(),
                password: password.to_string(),
                role: Some(role.to_string()),
            },
        )
        .await?;
    Ok(user)
}

/// Seeds the admin account and returns a bearer token for it.
pub async fn admin_token(state: &AppState) -> Result<String> {
    let admin = seed_user(state, ADMIN_EMAIL, ADMIN_PASSWORD, "admin").await?;
    Ok(state.tokens.issue(admin.id)?.token)
}

/// Builds a request with an optional bearer token and JSON body.
pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

/// Sends a request and returns the status and the JSON body (`Null` if empty).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Executes raw SQL against the test store.
pub async fn execute_sql(db: &DatabaseConnection, sql: &str) -> Result<()> {
    db.execute(Statement::from_string(db.get_database_backend(), sql.to_string()))
        .await?;
    Ok(())
}
