//! Unit tests for the SubscriberManager public API.
//!
//! These tests exercise the double-opt-in flow: subscribe, token rotation,
//! confirm, unsubscribe, and the confirmed-only listing.

use std::sync::Arc;

use footnotes::database::Database;
use footnotes::managers::subscriber_manager::{SubscriberManager, SubscriberManagerTrait};
use footnotes::services::auth_service::{AuthService, AuthServiceTrait};
use footnotes::types::errors::SubscriberError;

fn setup() -> (Arc<Database>, String) {
    let db = Arc::new(Database::open_in_memory().expect("open_in_memory failed"));
    let auth = AuthService::new(db.clone());
    let author = auth
        .signup("author@example.com", "demo", "Demo Author", "password123")
        .expect("signup author");
    (db, author.id)
}

#[test]
fn test_subscribe_creates_unconfirmed_with_tokens() {
    let (db, author_id) = setup();
    let mut mgr = SubscriberManager::new(db.connection());

    let subscriber = mgr
        .subscribe(&author_id, "reader@example.com")
        .expect("subscribe should succeed");

    assert!(!subscriber.confirmed);
    assert!(subscriber.confirmed_at.is_none());
    assert_eq!(subscriber.confirm_token.len(), 64);
    assert_eq!(subscriber.unsubscribe_token.len(), 64);
    assert_ne!(subscriber.confirm_token, subscriber.unsubscribe_token);
}

#[test]
fn test_subscribe_rejects_invalid_email() {
    let (db, author_id) = setup();
    let mut mgr = SubscriberManager::new(db.connection());

    assert!(matches!(
        mgr.subscribe(&author_id, "not-an-email"),
        Err(SubscriberError::InvalidEmail(_))
    ));
}

#[test]
fn test_resubscribe_rotates_confirm_token_while_pending() {
    let (db, author_id) = setup();
    let mut mgr = SubscriberManager::new(db.connection());

    let first = mgr.subscribe(&author_id, "reader@example.com").unwrap();
    let second = mgr.subscribe(&author_id, "reader@example.com").unwrap();

    assert_eq!(first.id, second.id, "still one subscription row");
    assert_ne!(first.confirm_token, second.confirm_token);
    assert_eq!(first.unsubscribe_token, second.unsubscribe_token);
}

#[test]
fn test_confirm_marks_subscription_confirmed() {
    let (db, author_id) = setup();
    let mut mgr = SubscriberManager::new(db.connection());

    let pending = mgr.subscribe(&author_id, "reader@example.com").unwrap();
    let confirmed = mgr.confirm(&pending.confirm_token).expect("confirm");

    assert!(confirmed.confirmed);
    assert!(confirmed.confirmed_at.is_some());
}

#[test]
fn test_confirm_with_unknown_token_fails() {
    let (db, _author_id) = setup();
    let mut mgr = SubscriberManager::new(db.connection());

    assert!(matches!(
        mgr.confirm("deadbeef"),
        Err(SubscriberError::InvalidToken(_))
    ));
}

#[test]
fn test_resubscribe_after_confirmation_is_stable() {
    let (db, author_id) = setup();
    let mut mgr = SubscriberManager::new(db.connection());

    let pending = mgr.subscribe(&author_id, "reader@example.com").unwrap();
    mgr.confirm(&pending.confirm_token).unwrap();

    let again = mgr.subscribe(&author_id, "reader@example.com").unwrap();
    assert!(again.confirmed, "confirmed subscription is returned as-is");
    assert_eq!(again.confirm_token, pending.confirm_token);
}

#[test]
fn test_unsubscribe_removes_subscription() {
    let (db, author_id) = setup();
    let mut mgr = SubscriberManager::new(db.connection());

    let subscriber = mgr.subscribe(&author_id, "reader@example.com").unwrap();
    mgr.unsubscribe(&subscriber.unsubscribe_token).expect("unsubscribe");

    assert!(mgr.list_confirmed(&author_id).unwrap().is_empty());
    assert!(matches!(
        mgr.unsubscribe(&subscriber.unsubscribe_token),
        Err(SubscriberError::InvalidToken(_))
    ));
}

#[test]
fn test_list_confirmed_excludes_pending() {
    let (db, author_id) = setup();
    let mut mgr = SubscriberManager::new(db.connection());

    let confirmed = mgr.subscribe(&author_id, "confirmed@example.com").unwrap();
    mgr.confirm(&confirmed.confirm_token).unwrap();
    mgr.subscribe(&author_id, "pending@example.com").unwrap();

    let listed = mgr.list_confirmed(&author_id).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].email, "confirmed@example.com");
}

#[test]
fn test_subscriptions_are_per_author() {
    let (db, author_id) = setup();
    let auth = AuthService::new(db.clone());
    let other = auth
        .signup("other@example.com", "other", "Other Author", "password123")
        .expect("signup other");

    let mut mgr = SubscriberManager::new(db.connection());
    let a = mgr.subscribe(&author_id, "reader@example.com").unwrap();
    let b = mgr.subscribe(&other.id, "reader@example.com").unwrap();
    assert_ne!(a.id, b.id, "same email may follow two authors");

    mgr.confirm(&a.confirm_token).unwrap();
    assert_eq!(mgr.list_confirmed(&author_id).unwrap().len(), 1);
    assert!(mgr.list_confirmed(&other.id).unwrap().is_empty());
}
