//! Unit tests for the RPC handler — JSON-RPC methods dispatched by `handle_method`.
//!
//! These tests exercise the same code path used by the real `footnotes-rpc`
//! binary: session resolution, the publish → announce flow, and the dog-ear
//! endpoints, using an in-memory SQLite database and a recording mailer.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use footnotes::app::App;
use footnotes::rpc_handler::handle_method;
use footnotes::services::email_service::{EmailMessage, Mailer};
use footnotes::types::errors::EmailError;

/// Mailer that records messages into a shared vector the test can inspect
/// after the App has taken ownership.
#[derive(Clone, Default)]
struct SharedMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl Mailer for SharedMailer {
    fn send(&mut self, message: &EmailMessage) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Create a fresh App with an in-memory DB and a recording mailer.
fn setup() -> (Mutex<App>, SharedMailer) {
    let mailer = SharedMailer::default();
    let app = App::open_in_memory(Box::new(mailer.clone())).expect("Failed to init App");
    (Mutex::new(app), mailer)
}

/// Signs up a user and returns (token, user id).
fn signup(app: &Mutex<App>, email: &str, handle: &str) -> (String, String) {
    let res = handle_method(
        app,
        "auth.signup",
        &json!({"email": email, "handle": handle, "password": "password123"}),
    )
    .expect("signup should succeed");
    (
        res["token"].as_str().unwrap().to_string(),
        res["user"]["id"].as_str().unwrap().to_string(),
    )
}

/// Creates and publishes a footnote, returning its id.
fn publish_footnote(app: &Mutex<App>, token: &str, body: &str) -> String {
    let created = handle_method(
        app,
        "footnote.create",
        &json!({"token": token, "title": "On writing", "body": body}),
    )
    .expect("create should succeed");
    let id = created["id"].as_str().unwrap().to_string();
    handle_method(
        app,
        "footnote.publish",
        &json!({"token": token, "id": id}),
    )
    .expect("publish should succeed");
    id
}

// ─── Ping ───

#[test]
fn test_ping() {
    let (app, _mailer) = setup();
    let res = handle_method(&app, "ping", &json!({})).unwrap();
    assert_eq!(res, json!({"pong": true}));
}

#[test]
fn test_unknown_method() {
    let (app, _mailer) = setup();
    let err = handle_method(&app, "nope.nothing", &json!({})).unwrap_err();
    assert!(err.contains("unknown method"));
}

// ─── Auth ───

#[test]
fn test_signup_login_me_logout() {
    let (app, _mailer) = setup();
    let (token, user_id) = signup(&app, "a@example.com", "demo");

    let me = handle_method(&app, "auth.me", &json!({"token": token})).unwrap();
    assert_eq!(me["user"]["id"].as_str().unwrap(), user_id);

    handle_method(&app, "auth.logout", &json!({"token": token})).unwrap();
    let me = handle_method(&app, "auth.me", &json!({"token": token})).unwrap();
    assert_eq!(me["user"], Value::Null);

    let login = handle_method(
        &app,
        "auth.login",
        &json!({"email": "a@example.com", "password": "password123"}),
    )
    .unwrap();
    assert!(login["token"].as_str().is_some());
}

#[test]
fn test_login_with_bad_password_fails() {
    let (app, _mailer) = setup();
    signup(&app, "a@example.com", "demo");

    let err = handle_method(
        &app,
        "auth.login",
        &json!({"email": "a@example.com", "password": "wrong"}),
    )
    .unwrap_err();
    assert!(err.contains("Invalid email or password"));
}

// ─── Footnotes ───

#[test]
fn test_footnote_create_requires_session() {
    let (app, _mailer) = setup();
    let err = handle_method(
        &app,
        "footnote.create",
        &json!({"body": "No session."}),
    )
    .unwrap_err();
    assert_eq!(err, "not authenticated");
}

#[test]
fn test_footnote_get_serves_published_only() {
    let (app, _mailer) = setup();
    let (token, _) = signup(&app, "a@example.com", "demo");

    let created = handle_method(
        &app,
        "footnote.create",
        &json!({"token": token, "title": "Hidden", "body": "Draft body."}),
    )
    .unwrap();
    let slug = created["slug"].as_str().unwrap().to_string();

    let err = handle_method(
        &app,
        "footnote.get",
        &json!({"handle": "demo", "slug": slug}),
    )
    .unwrap_err();
    assert!(err.contains("not found"));

    handle_method(
        &app,
        "footnote.publish",
        &json!({"token": token, "id": created["id"]}),
    )
    .unwrap();
    let got = handle_method(
        &app,
        "footnote.get",
        &json!({"handle": "demo", "slug": slug}),
    )
    .unwrap();
    assert_eq!(got["body"].as_str().unwrap(), "Draft body.");
}

#[test]
fn test_footnote_list_and_mine() {
    let (app, _mailer) = setup();
    let (token, _) = signup(&app, "a@example.com", "demo");
    publish_footnote(&app, &token, "Public body.");
    handle_method(
        &app,
        "footnote.create",
        &json!({"token": token, "body": "Draft body."}),
    )
    .unwrap();

    let listed = handle_method(&app, "footnote.list", &json!({})).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let mine = handle_method(&app, "footnote.mine", &json!({"token": token})).unwrap();
    assert_eq!(mine.as_array().unwrap().len(), 2);
}

// ─── Dog-ears ───

#[test]
fn test_dogear_save_requires_session() {
    let (app, _mailer) = setup();
    let (token, _) = signup(&app, "a@example.com", "demo");
    let footnote_id = publish_footnote(&app, &token, "Body.");

    let err = handle_method(
        &app,
        "dogear.save",
        &json!({"footnote_id": footnote_id}),
    )
    .unwrap_err();
    assert_eq!(err, "not authenticated");

    let err = handle_method(
        &app,
        "dogear.save",
        &json!({"token": "bogus", "footnote_id": footnote_id}),
    )
    .unwrap_err();
    assert_eq!(err, "not authenticated");
}

#[test]
fn test_dogear_save_get_remove_round_trip() {
    let (app, _mailer) = setup();
    let (author_token, _) = signup(&app, "a@example.com", "demo");
    let footnote_id = publish_footnote(&app, &author_token, "A passage worth keeping.");
    let (reader_token, _) = signup(&app, "r@example.com", "reader");

    let saved = handle_method(
        &app,
        "dogear.save",
        &json!({
            "token": reader_token,
            "footnote_id": footnote_id,
            "selected_text": "worth keeping"
        }),
    )
    .unwrap();
    assert_eq!(saved["selected_text"].as_str().unwrap(), "worth keeping");

    let got = handle_method(
        &app,
        "dogear.get",
        &json!({"token": reader_token, "footnote_id": footnote_id}),
    )
    .unwrap();
    assert_eq!(
        got["dog_ear"]["selected_text"].as_str().unwrap(),
        "worth keeping"
    );

    handle_method(
        &app,
        "dogear.remove",
        &json!({"token": reader_token, "footnote_id": footnote_id}),
    )
    .unwrap();
    let got = handle_method(
        &app,
        "dogear.get",
        &json!({"token": reader_token, "footnote_id": footnote_id}),
    )
    .unwrap();
    assert_eq!(got["dog_ear"], Value::Null);
}

#[test]
fn test_dogear_save_on_draft_is_not_found() {
    let (app, _mailer) = setup();
    let (token, _) = signup(&app, "a@example.com", "demo");
    let created = handle_method(
        &app,
        "footnote.create",
        &json!({"token": token, "body": "Draft."}),
    )
    .unwrap();

    let err = handle_method(
        &app,
        "dogear.save",
        &json!({"token": token, "footnote_id": created["id"]}),
    )
    .unwrap_err();
    assert!(err.contains("not found"));
}

#[test]
fn test_dogear_status_for_anonymous_is_empty() {
    let (app, _mailer) = setup();
    let res = handle_method(
        &app,
        "dogear.status",
        &json!({"footnote_ids": ["f-1", "f-2"]}),
    )
    .unwrap();
    assert_eq!(res, json!({"dog_ears": []}));
}

#[test]
fn test_dogear_status_lists_bookmarked_ids() {
    let (app, _mailer) = setup();
    let (author_token, _) = signup(&app, "a@example.com", "demo");
    let first = publish_footnote(&app, &author_token, "First body.");
    let second = publish_footnote(&app, &author_token, "Second body.");
    let (reader_token, _) = signup(&app, "r@example.com", "reader");

    handle_method(
        &app,
        "dogear.save",
        &json!({"token": reader_token, "footnote_id": first}),
    )
    .unwrap();

    let res = handle_method(
        &app,
        "dogear.status",
        &json!({"token": reader_token, "footnote_ids": [first, second]}),
    )
    .unwrap();
    assert_eq!(res["dog_ears"], json!([first]));
}

// ─── Subscriptions ───

#[test]
fn test_subscribe_confirm_and_announce_flow() {
    let (app, mailer) = setup();
    let (author_token, author_id) = signup(&app, "a@example.com", "demo");

    handle_method(
        &app,
        "subscribe.request",
        &json!({"handle": "demo", "email": "reader@example.com"}),
    )
    .unwrap();

    // The confirmation email carries the confirm link.
    let confirm_token = {
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "reader@example.com");
        assert!(sent[0].subject.contains("Confirm"));
        let app = app.lock().unwrap();
        let token: String = app
            .db
            .connection()
            .query_row(
                "SELECT confirm_token FROM subscribers WHERE author_id = ?1",
                [author_id.as_str()],
                |row| row.get(0),
            )
            .unwrap();
        token
    };

    handle_method(&app, "subscribe.confirm", &json!({"token": confirm_token})).unwrap();

    // Publishing with email_subscribers announces to confirmed readers.
    let created = handle_method(
        &app,
        "footnote.create",
        &json!({"token": author_token, "title": "News", "body": "Fresh words."}),
    )
    .unwrap();
    handle_method(
        &app,
        "footnote.publish",
        &json!({"token": author_token, "id": created["id"], "email_subscribers": true}),
    )
    .unwrap();

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].subject.contains("News"));
    assert!(sent[1].text.contains("/demo/news"));
}

#[test]
fn test_subscribe_to_unknown_author_fails() {
    let (app, _mailer) = setup();
    let err = handle_method(
        &app,
        "subscribe.request",
        &json!({"handle": "nobody", "email": "reader@example.com"}),
    )
    .unwrap_err();
    assert!(err.contains("author not found"));
}

#[test]
fn test_unsubscribe_stops_announcements() {
    let (app, mailer) = setup();
    let (author_token, author_id) = signup(&app, "a@example.com", "demo");

    handle_method(
        &app,
        "subscribe.request",
        &json!({"handle": "demo", "email": "reader@example.com"}),
    )
    .unwrap();

    let (confirm_token, unsubscribe_token) = {
        let app = app.lock().unwrap();
        app.db
            .connection()
            .query_row(
                "SELECT confirm_token, unsubscribe_token FROM subscribers WHERE author_id = ?1",
                [author_id.as_str()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .unwrap()
    };
    handle_method(&app, "subscribe.confirm", &json!({"token": confirm_token})).unwrap();
    handle_method(
        &app,
        "subscribe.unsubscribe",
        &json!({"token": unsubscribe_token}),
    )
    .unwrap();

    let created = handle_method(
        &app,
        "footnote.create",
        &json!({"token": author_token, "body": "Quiet words."}),
    )
    .unwrap();
    handle_method(
        &app,
        "footnote.publish",
        &json!({"token": author_token, "id": created["id"], "email_subscribers": true}),
    )
    .unwrap();

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1, "only the original confirmation email");
}
