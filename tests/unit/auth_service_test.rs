//! Unit tests for the AuthService public API.
//!
//! These tests exercise signup validation, credential verification, session
//! lifecycle and expiry, and the login-redirect return path.

use std::sync::Arc;

use footnotes::database::Database;
use footnotes::services::auth_service::{login_redirect, AuthService, AuthServiceTrait};
use footnotes::types::errors::AuthError;

fn setup() -> (Arc<Database>, AuthService) {
    let db = Arc::new(Database::open_in_memory().expect("open_in_memory failed"));
    let auth = AuthService::new(db.clone());
    (db, auth)
}

#[test]
fn test_signup_returns_identity() {
    let (_db, auth) = setup();

    let user = auth
        .signup("a@example.com", "demo", "Demo Author", "password123")
        .expect("signup should succeed");

    assert_eq!(user.email, "a@example.com");
    assert_eq!(user.handle, "demo");
    assert_eq!(user.display_name, "Demo Author");
}

#[test]
fn test_signup_display_name_falls_back_to_handle() {
    let (_db, auth) = setup();

    let user = auth
        .signup("a@example.com", "demo", "   ", "password123")
        .expect("signup should succeed");
    assert_eq!(user.display_name, "demo");
}

#[test]
fn test_signup_rejects_duplicate_email_and_handle() {
    let (_db, auth) = setup();
    auth.signup("a@example.com", "demo", "Demo", "password123").unwrap();

    assert!(matches!(
        auth.signup("a@example.com", "other", "Other", "password123"),
        Err(AuthError::EmailTaken(_))
    ));
    assert!(matches!(
        auth.signup("b@example.com", "demo", "Other", "password123"),
        Err(AuthError::HandleTaken(_))
    ));
}

#[test]
fn test_signup_validates_input() {
    let (_db, auth) = setup();

    assert!(matches!(
        auth.signup("not-an-email", "demo", "Demo", "password123"),
        Err(AuthError::InvalidInput(_))
    ));
    assert!(matches!(
        auth.signup("a@example.com", "De Mo!", "Demo", "password123"),
        Err(AuthError::InvalidInput(_))
    ));
    assert!(matches!(
        auth.signup("a@example.com", "ab", "Demo", "password123"),
        Err(AuthError::InvalidInput(_))
    ));
    assert!(matches!(
        auth.signup("a@example.com", "demo", "Demo", "short"),
        Err(AuthError::InvalidInput(_))
    ));
}

#[test]
fn test_login_round_trip() {
    let (_db, auth) = setup();
    let user = auth
        .signup("a@example.com", "demo", "Demo", "password123")
        .unwrap();

    let token = auth.login("a@example.com", "password123").expect("login");
    assert_eq!(token.len(), 64, "session token is 64 hex chars");

    let current = auth.current_user(&token).unwrap().expect("session valid");
    assert_eq!(current.id, user.id);
}

#[test]
fn test_login_rejects_bad_credentials() {
    let (_db, auth) = setup();
    auth.signup("a@example.com", "demo", "Demo", "password123").unwrap();

    assert!(matches!(
        auth.login("a@example.com", "wrong password"),
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        auth.login("nobody@example.com", "password123"),
        Err(AuthError::InvalidCredentials)
    ));
}

#[test]
fn test_logout_invalidates_session() {
    let (_db, auth) = setup();
    auth.signup("a@example.com", "demo", "Demo", "password123").unwrap();
    let token = auth.login("a@example.com", "password123").unwrap();

    auth.logout(&token).expect("logout");
    assert!(auth.current_user(&token).unwrap().is_none());
}

#[test]
fn test_unknown_token_resolves_to_anonymous() {
    let (_db, auth) = setup();
    assert!(auth.current_user("deadbeef").unwrap().is_none());
}

#[test]
fn test_expired_session_is_deleted_and_anonymous() {
    let (db, auth) = setup();
    auth.signup("a@example.com", "demo", "Demo", "password123").unwrap();
    let token = auth.login("a@example.com", "password123").unwrap();

    // Age the session past its expiry.
    db.connection()
        .execute(
            "UPDATE sessions SET expires_at = 1000 WHERE token = ?1",
            [token.as_str()],
        )
        .unwrap();

    assert!(auth.current_user(&token).unwrap().is_none());

    let remaining: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0, "expired session should be deleted on lookup");
}

#[test]
fn test_user_lookups() {
    let (_db, auth) = setup();
    let user = auth
        .signup("a@example.com", "demo", "Demo", "password123")
        .unwrap();

    let by_id = auth.user_by_id(&user.id).unwrap().expect("found by id");
    assert_eq!(by_id.handle, "demo");
    let by_handle = auth.user_by_handle("demo").unwrap().expect("found by handle");
    assert_eq!(by_handle.id, user.id);
    assert!(auth.user_by_handle("nobody").unwrap().is_none());
}

#[test]
fn test_login_redirect_encodes_return_path() {
    assert_eq!(
        login_redirect("/demo/on-writing"),
        "/login?next=%2Fdemo%2Fon-writing"
    );
    assert_eq!(
        login_redirect("/demo/my post?x=1"),
        "/login?next=%2Fdemo%2Fmy%20post%3Fx%3D1"
    );
}
