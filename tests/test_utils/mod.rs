//! Test utilities for database and HTTP testing.
//!
//! Provides an in-memory SQLite database with migrations and reference data
//! applied, a matching configuration, and helpers that mint user and admin
//! bearer tokens signed with the test secrets.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use directory::auth::{Claims, issue_admin_token};
use directory::config::AppConfig;
use directory::seeds::seed_reference_data;
use directory::workflow::SubmissionPayload;
use jsonwebtoken::{EncodingKey, Header, encode};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

#[allow(dead_code)]
pub const ADMIN_PASSWORD: &str = "back-office-password";
const ADMIN_SESSION_SECRET: &str = "test-admin-session-secret-0123456789";
const USER_JWT_SECRET: &str = "test-user-jwt-secret-0123456789abcdef";

/// Configuration used by every integration test.
#[allow(dead_code)]
pub fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        admin_session_secret: Some(ADMIN_SESSION_SECRET.to_string()),
        user_jwt_secret: Some(USER_JWT_SECRET.to_string()),
        ..Default::default()
    }
}

/// Sets up an in-memory SQLite database with migrations and seeded reference data.
///
/// The pool is pinned to a single connection; every new SQLite memory
/// connection would otherwise open its own empty database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;
    seed_reference_data(&db).await?;

    Ok(db)
}

#[allow(dead_code)]
pub async fn setup_test_db_arc() -> Result<Arc<DatabaseConnection>> {
    Ok(Arc::new(setup_test_db().await?))
}

/// Mints an end-user token for `user_id`, valid for one hour.
#[allow(dead_code)]
pub fn user_token(user_id: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + 3600,
        iat: Some(now),
        iss: None,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(USER_JWT_SECRET.as_bytes()),
    )
    .expect("user token encodes")
}

/// Issues an admin session token the same way `POST /api/admin/auth` does.
#[allow(dead_code)]
pub fn admin_token() -> String {
    issue_admin_token(&test_config(), Utc::now())
        .expect("admin token issues")
        .token
}

/// A payload that passes every validation rule against the seeded lists.
#[allow(dead_code)]
pub fn valid_payload(name: &str) -> SubmissionPayload {
    SubmissionPayload {
        name: Some(name.to_string()),
        name_ar: Some("المستقبل الأخضر".to_string()),
        org_type: Some("Non-Profit Organization".to_string()),
        description: Some("Environmental education and urban greening".to_string()),
        website: Some("https://greenfuture.org.sa".to_string()),
        contact_email: Some("hello@greenfuture.org.sa".to_string()),
        region: Some("Riyadh".to_string()),
        sdg_focus: Some(vec!["4".to_string(), "13".to_string()]),
        services: Some(vec!["Community Engagement".to_string()]),
        ..Default::default()
    }
}
