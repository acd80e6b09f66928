//! RPC method handler for the Footnotes JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! The `handle_method` function dispatches JSON-RPC method calls to the
//! appropriate managers and services via the `App` struct.
//!
//! Sessions are cookie-style bearer tokens passed as a `token` param and
//! resolved per call; bookmark and authoring methods answer
//! "not authenticated" for a missing or expired session.

use std::sync::Mutex;

use crate::app::App;
use crate::managers::dogear_manager::{DogEarManager, DogEarManagerTrait};
use crate::managers::footnote_manager::{parse_tags, FootnoteManager, FootnoteManagerTrait};
use crate::managers::subscriber_manager::{SubscriberManager, SubscriberManagerTrait};
use crate::services::auth_service::AuthServiceTrait;
use crate::types::footnote::{Footnote, FootnoteInput};
use crate::types::user::UserIdentity;

use serde_json::{json, Value};

/// Resolves the caller's session token to an identity.
fn require_user(app: &App, params: &Value) -> Result<UserIdentity, String> {
    let token = params
        .get("token")
        .and_then(|v| v.as_str())
        .ok_or("not authenticated")?;
    app.auth_service
        .current_user(token)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "not authenticated".to_string())
}

/// Reads the shared footnote input fields (title, body, tags) from params.
fn footnote_input(params: &Value) -> Result<FootnoteInput, String> {
    let body = params
        .get("body")
        .and_then(|v| v.as_str())
        .ok_or("missing body")?;
    let title = params
        .get("title")
        .and_then(|v| v.as_str())
        .map(|t| t.to_string());
    let tags = match params.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect(),
        Some(Value::String(csv)) => parse_tags(csv),
        _ => Vec::new(),
    };
    Ok(FootnoteInput {
        title,
        body: body.to_string(),
        tags,
    })
}

fn footnote_json(footnote: &Footnote) -> Value {
    json!({
        "id": footnote.id,
        "author_id": footnote.author_id,
        "title": footnote.title,
        "slug": footnote.slug,
        "body": footnote.body,
        "status": footnote.status.as_str(),
        "published_at": footnote.published_at,
        "created_at": footnote.created_at,
        "updated_at": footnote.updated_at,
    })
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Auth ───
        "auth.signup" => {
            let email = params.get("email").and_then(|v| v.as_str()).ok_or("missing email")?;
            let handle = params.get("handle").and_then(|v| v.as_str()).ok_or("missing handle")?;
            let display_name = params.get("display_name").and_then(|v| v.as_str()).unwrap_or("");
            let password = params.get("password").and_then(|v| v.as_str()).ok_or("missing password")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let user = a
                .auth_service
                .signup(email, handle, display_name, password)
                .map_err(|e| e.to_string())?;
            let token = a.auth_service.create_session(&user.id).map_err(|e| e.to_string())?;
            Ok(json!({"token": token, "user": user}))
        }
        "auth.login" => {
            let email = params.get("email").and_then(|v| v.as_str()).ok_or("missing email")?;
            let password = params.get("password").and_then(|v| v.as_str()).ok_or("missing password")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let token = a.auth_service.login(email, password).map_err(|e| e.to_string())?;
            Ok(json!({"token": token}))
        }
        "auth.logout" => {
            let token = params.get("token").and_then(|v| v.as_str()).ok_or("missing token")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            a.auth_service.logout(token).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "auth.me" => {
            let token = params.get("token").and_then(|v| v.as_str()).ok_or("missing token")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let user = a.auth_service.current_user(token).map_err(|e| e.to_string())?;
            Ok(json!({"user": user}))
        }

        // ─── Footnotes ───
        "footnote.create" => {
            let input = footnote_input(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let user = require_user(&a, params)?;
            let db = a.db.clone();
            let mut mgr = FootnoteManager::new(db.connection());
            let footnote = mgr.create(&user.id, &input).map_err(|e| e.to_string())?;
            Ok(footnote_json(&footnote))
        }
        "footnote.update" => {
            let id = params.get("id").and_then(|v| v.as_str()).ok_or("missing id")?;
            let input = footnote_input(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let user = require_user(&a, params)?;
            let db = a.db.clone();
            let mut mgr = FootnoteManager::new(db.connection());
            let footnote = mgr.update(&user.id, id, &input).map_err(|e| e.to_string())?;
            Ok(footnote_json(&footnote))
        }
        "footnote.publish" => {
            let id = params.get("id").and_then(|v| v.as_str()).ok_or("missing id")?;
            let email_subscribers = params
                .get("email_subscribers")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let user = require_user(&a, params)?;
            let db = a.db.clone();
            let mut mgr = FootnoteManager::new(db.connection());
            let footnote = mgr.publish(&user.id, id).map_err(|e| e.to_string())?;

            if email_subscribers {
                let subscribers = SubscriberManager::new(db.connection())
                    .list_confirmed(&user.id)
                    .map_err(|e| e.to_string())?;
                for subscriber in &subscribers {
                    // A failed announcement never fails the publish.
                    let _ = a.email_service.send_new_footnote(
                        subscriber,
                        &user.display_name,
                        &user.handle,
                        &footnote,
                    );
                }
            }
            Ok(footnote_json(&footnote))
        }
        "footnote.delete" => {
            let id = params.get("id").and_then(|v| v.as_str()).ok_or("missing id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let user = require_user(&a, params)?;
            let db = a.db.clone();
            let mut mgr = FootnoteManager::new(db.connection());
            mgr.delete(&user.id, id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "footnote.get" => {
            let handle = params.get("handle").and_then(|v| v.as_str()).ok_or("missing handle")?;
            let slug = params.get("slug").and_then(|v| v.as_str()).ok_or("missing slug")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db.clone();
            let mgr = FootnoteManager::new(db.connection());
            let footnote = mgr
                .get_by_slug(handle, slug)
                .map_err(|e| e.to_string())?
                .filter(Footnote::is_published)
                .ok_or("footnote not found")?;
            let tags = mgr.tags_for(&footnote.id).map_err(|e| e.to_string())?;
            let mut value = footnote_json(&footnote);
            value["tags"] = json!(tags.iter().map(|t| t.name.clone()).collect::<Vec<_>>());
            Ok(value)
        }
        "footnote.list" => {
            let handle = params.get("handle").and_then(|v| v.as_str());
            let tag = params.get("tag").and_then(|v| v.as_str());
            let a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db.clone();
            let mgr = FootnoteManager::new(db.connection());
            let footnotes = mgr.list_published(handle, tag).map_err(|e| e.to_string())?;
            let arr: Vec<Value> = footnotes.iter().map(footnote_json).collect();
            Ok(json!(arr))
        }
        "footnote.mine" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let user = require_user(&a, params)?;
            let db = a.db.clone();
            let mgr = FootnoteManager::new(db.connection());
            let footnotes = mgr.list_for_author(&user.id).map_err(|e| e.to_string())?;
            let arr: Vec<Value> = footnotes.iter().map(footnote_json).collect();
            Ok(json!(arr))
        }

        // ─── Dog-ears ───
        "dogear.save" => {
            let footnote_id = params
                .get("footnote_id")
                .and_then(|v| v.as_str())
                .ok_or("missing footnote_id")?;
            let selected_text = params.get("selected_text").and_then(|v| v.as_str());
            let a = app.lock().map_err(|e| e.to_string())?;
            let user = require_user(&a, params)?;
            let db = a.db.clone();
            let mut mgr = DogEarManager::new(db.connection());
            let dogear = mgr
                .upsert(&user.id, footnote_id, selected_text)
                .map_err(|e| e.to_string())?;
            Ok(json!({"id": dogear.id, "selected_text": dogear.selected_text}))
        }
        "dogear.remove" => {
            let footnote_id = params
                .get("footnote_id")
                .and_then(|v| v.as_str())
                .ok_or("missing footnote_id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let user = require_user(&a, params)?;
            let db = a.db.clone();
            let mut mgr = DogEarManager::new(db.connection());
            mgr.remove(&user.id, footnote_id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "dogear.get" => {
            let footnote_id = params
                .get("footnote_id")
                .and_then(|v| v.as_str())
                .ok_or("missing footnote_id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let user = require_user(&a, params)?;
            let db = a.db.clone();
            let mgr = DogEarManager::new(db.connection());
            let dogear = mgr.get(&user.id, footnote_id).map_err(|e| e.to_string())?;
            match dogear {
                Some(d) => Ok(json!({"dog_ear": {"selected_text": d.selected_text}})),
                None => Ok(json!({"dog_ear": null})),
            }
        }
        "dogear.status" => {
            let footnote_ids: Vec<String> = params
                .get("footnote_ids")
                .and_then(|v| v.as_array())
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|v| v.as_str())
                        .map(|s| s.to_string())
                        .collect()
                })
                .unwrap_or_default();
            let a = app.lock().map_err(|e| e.to_string())?;
            // An anonymous reader simply has no dog-ears.
            let Ok(user) = require_user(&a, params) else {
                return Ok(json!({"dog_ears": []}));
            };
            let db = a.db.clone();
            let mgr = DogEarManager::new(db.connection());
            let marked = mgr
                .list_for_user(&user.id, &footnote_ids)
                .map_err(|e| e.to_string())?;
            let mut ids: Vec<&String> = marked.iter().collect();
            ids.sort();
            Ok(json!({"dog_ears": ids}))
        }

        // ─── Subscriptions ───
        "subscribe.request" => {
            let handle = params.get("handle").and_then(|v| v.as_str()).ok_or("missing handle")?;
            let email = params.get("email").and_then(|v| v.as_str()).ok_or("missing email")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let author = a
                .auth_service
                .user_by_handle(handle)
                .map_err(|e| e.to_string())?
                .ok_or("author not found")?;
            let db = a.db.clone();
            let subscriber = SubscriberManager::new(db.connection())
                .subscribe(&author.id, email)
                .map_err(|e| e.to_string())?;
            if !subscriber.confirmed {
                a.email_service
                    .send_confirmation(&subscriber, &author.display_name)
                    .map_err(|e| e.to_string())?;
            }
            Ok(json!({"ok": true}))
        }
        "subscribe.confirm" => {
            let token = params.get("token").and_then(|v| v.as_str()).ok_or("missing token")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db.clone();
            SubscriberManager::new(db.connection())
                .confirm(token)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "subscribe.unsubscribe" => {
            let token = params.get("token").and_then(|v| v.as_str()).ok_or("missing token")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db.clone();
            SubscriberManager::new(db.connection())
                .unsubscribe(token)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
