//! Subscriber management for Footnotes.
//!
//! Implements `SubscriberManagerTrait` — double-opt-in email subscriptions
//! to an author, backed by SQLite via `rusqlite`. Confirm and unsubscribe
//! tokens come from CryptoService.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::services::crypto_service::{CryptoService, CryptoServiceTrait};
use crate::types::errors::SubscriberError;
use crate::types::subscriber::Subscriber;

/// Trait defining subscriber management operations.
pub trait SubscriberManagerTrait {
    /// Registers an email for an author's footnotes. Re-subscribing an
    /// unconfirmed address rotates its confirm token; a confirmed
    /// subscription is returned as-is.
    fn subscribe(&mut self, author_id: &str, email: &str) -> Result<Subscriber, SubscriberError>;
    fn confirm(&mut self, token: &str) -> Result<Subscriber, SubscriberError>;
    fn unsubscribe(&mut self, token: &str) -> Result<(), SubscriberError>;
    fn list_confirmed(&self, author_id: &str) -> Result<Vec<Subscriber>, SubscriberError>;
}

/// Subscriber manager backed by a SQLite connection.
pub struct SubscriberManager<'a> {
    conn: &'a Connection,
    crypto: CryptoService,
}

impl<'a> SubscriberManager<'a> {
    /// Creates a new `SubscriberManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            crypto: CryptoService::new(),
        }
    }

    /// Returns the current UNIX timestamp in seconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn token(&self) -> Result<String, SubscriberError> {
        self.crypto
            .generate_token()
            .map_err(|e| SubscriberError::CryptoError(e.to_string()))
    }

    /// Reads a single subscriber row into a struct.
    fn row_to_subscriber(row: &rusqlite::Row) -> rusqlite::Result<Subscriber> {
        Ok(Subscriber {
            id: row.get(0)?,
            author_id: row.get(1)?,
            email: row.get(2)?,
            confirmed: row.get::<_, i64>(3)? != 0,
            confirm_token: row.get(4)?,
            unsubscribe_token: row.get(5)?,
            created_at: row.get(6)?,
            confirmed_at: row.get(7)?,
        })
    }

    const SELECT: &'static str = "SELECT id, author_id, email, confirmed, confirm_token, \
                                  unsubscribe_token, created_at, confirmed_at FROM subscribers";

    fn by_id(&self, id: &str) -> Result<Subscriber, SubscriberError> {
        let sql = format!("{} WHERE id = ?1", Self::SELECT);
        self.conn
            .query_row(&sql, params![id], Self::row_to_subscriber)
            .map_err(|e| SubscriberError::DatabaseError(e.to_string()))
    }
}

impl<'a> SubscriberManagerTrait for SubscriberManager<'a> {
    fn subscribe(&mut self, author_id: &str, email: &str) -> Result<Subscriber, SubscriberError> {
        let email = email.trim();
        if !email.contains('@') || email.len() > 254 {
            return Err(SubscriberError::InvalidEmail(email.to_string()));
        }

        let sql = format!(
            "{} WHERE author_id = ?1 AND email = ?2",
            Self::SELECT
        );
        let existing = match self
            .conn
            .query_row(&sql, params![author_id, email], Self::row_to_subscriber)
        {
            Ok(subscriber) => Some(subscriber),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(SubscriberError::DatabaseError(e.to_string())),
        };

        if let Some(subscriber) = existing {
            if subscriber.confirmed {
                return Ok(subscriber);
            }
            // Pending subscription: rotate the confirm token so the newest
            // email always carries a working link.
            let confirm_token = self.token()?;
            self.conn
                .execute(
                    "UPDATE subscribers SET confirm_token = ?1 WHERE id = ?2",
                    params![confirm_token, subscriber.id],
                )
                .map_err(|e| SubscriberError::DatabaseError(e.to_string()))?;
            return self.by_id(&subscriber.id);
        }

        let id = Uuid::new_v4().to_string();
        let confirm_token = self.token()?;
        let unsubscribe_token = self.token()?;
        let now = Self::now();

        self.conn
            .execute(
                "INSERT INTO subscribers (id, author_id, email, confirmed, confirm_token, \
                 unsubscribe_token, created_at, confirmed_at) \
                 VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6, NULL)",
                params![id, author_id, email, confirm_token, unsubscribe_token, now],
            )
            .map_err(|e| SubscriberError::DatabaseError(e.to_string()))?;

        self.by_id(&id)
    }

    fn confirm(&mut self, token: &str) -> Result<Subscriber, SubscriberError> {
        let now = Self::now();
        let affected = self
            .conn
            .execute(
                "UPDATE subscribers SET confirmed = 1, confirmed_at = COALESCE(confirmed_at, ?1) \
                 WHERE confirm_token = ?2",
                params![now, token],
            )
            .map_err(|e| SubscriberError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(SubscriberError::InvalidToken(token.to_string()));
        }

        let sql = format!("{} WHERE confirm_token = ?1", Self::SELECT);
        self.conn
            .query_row(&sql, params![token], Self::row_to_subscriber)
            .map_err(|e| SubscriberError::DatabaseError(e.to_string()))
    }

    fn unsubscribe(&mut self, token: &str) -> Result<(), SubscriberError> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM subscribers WHERE unsubscribe_token = ?1",
                params![token],
            )
            .map_err(|e| SubscriberError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(SubscriberError::InvalidToken(token.to_string()));
        }
        Ok(())
    }

    fn list_confirmed(&self, author_id: &str) -> Result<Vec<Subscriber>, SubscriberError> {
        let sql = format!(
            "{} WHERE author_id = ?1 AND confirmed = 1 ORDER BY created_at",
            Self::SELECT
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| SubscriberError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map(params![author_id], Self::row_to_subscriber)
            .map_err(|e| SubscriberError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| SubscriberError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }
}
