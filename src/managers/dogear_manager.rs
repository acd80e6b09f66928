//! Dog-ear store for Footnotes.
//!
//! Implements `DogEarManagerTrait` — one optional record per (user,
//! footnote) pair holding the selected passage, backed by SQLite via
//! `rusqlite`. The composite UNIQUE constraint on (user_id, footnote_id) is
//! the sole consistency mechanism: rapid repeated saves by the same user
//! resolve last-write-wins, which is acceptable for a personal,
//! single-writer annotation.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::types::dogear::DogEar;
use crate::types::errors::DogEarError;
use crate::types::footnote::FootnoteStatus;

/// Trait defining dog-ear persistence operations.
pub trait DogEarManagerTrait {
    /// Creates or replaces the caller's dog-ear on a footnote. `None` (or a
    /// passage that trims to empty) means a whole-footnote bookmark.
    fn upsert(
        &mut self,
        user_id: &str,
        footnote_id: &str,
        selected_text: Option<&str>,
    ) -> Result<DogEar, DogEarError>;
    /// Removes the caller's dog-ear. Succeeds even if none exists.
    fn remove(&mut self, user_id: &str, footnote_id: &str) -> Result<(), DogEarError>;
    fn get(&self, user_id: &str, footnote_id: &str) -> Result<Option<DogEar>, DogEarError>;
    /// Which of the given footnotes the user has dog-eared — bulk check for
    /// listing pages.
    fn list_for_user(
        &self,
        user_id: &str,
        footnote_ids: &[String],
    ) -> Result<HashSet<String>, DogEarError>;
}

/// Dog-ear manager backed by a SQLite connection.
pub struct DogEarManager<'a> {
    conn: &'a Connection,
}

impl<'a> DogEarManager<'a> {
    /// Creates a new `DogEarManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Returns the current UNIX timestamp in seconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    /// Verifies the footnote exists and is published.
    fn check_published(&self, footnote_id: &str) -> Result<(), DogEarError> {
        let status: String = match self.conn.query_row(
            "SELECT status FROM footnotes WHERE id = ?1",
            params![footnote_id],
            |row| row.get(0),
        ) {
            Ok(status) => status,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(DogEarError::NotFound(footnote_id.to_string()))
            }
            Err(e) => return Err(DogEarError::DatabaseError(e.to_string())),
        };

        if FootnoteStatus::parse(&status) != Some(FootnoteStatus::Published) {
            return Err(DogEarError::NotFound(footnote_id.to_string()));
        }
        Ok(())
    }

    /// Reads a single dog-ear row into a struct.
    fn row_to_dogear(row: &rusqlite::Row) -> rusqlite::Result<DogEar> {
        Ok(DogEar {
            id: row.get(0)?,
            user_id: row.get(1)?,
            footnote_id: row.get(2)?,
            selected_text: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

impl<'a> DogEarManagerTrait for DogEarManager<'a> {
    fn upsert(
        &mut self,
        user_id: &str,
        footnote_id: &str,
        selected_text: Option<&str>,
    ) -> Result<DogEar, DogEarError> {
        self.check_published(footnote_id)?;

        // An empty-after-trim passage degrades to a whole-footnote bookmark.
        let selected_text = selected_text
            .map(|s| s.trim())
            .filter(|s| !s.is_empty());

        let id = Uuid::new_v4().to_string();
        let now = Self::now();

        self.conn
            .execute(
                "INSERT INTO dog_ears (id, user_id, footnote_id, selected_text, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT(user_id, footnote_id) DO UPDATE SET \
                 selected_text = excluded.selected_text, updated_at = excluded.updated_at",
                params![id, user_id, footnote_id, selected_text, now, now],
            )
            .map_err(|e| DogEarError::DatabaseError(e.to_string()))?;

        self.get(user_id, footnote_id)?
            .ok_or_else(|| DogEarError::DatabaseError("upserted dog-ear missing".to_string()))
    }

    fn remove(&mut self, user_id: &str, footnote_id: &str) -> Result<(), DogEarError> {
        self.conn
            .execute(
                "DELETE FROM dog_ears WHERE user_id = ?1 AND footnote_id = ?2",
                params![user_id, footnote_id],
            )
            .map_err(|e| DogEarError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn get(&self, user_id: &str, footnote_id: &str) -> Result<Option<DogEar>, DogEarError> {
        let result = self.conn.query_row(
            "SELECT id, user_id, footnote_id, selected_text, created_at, updated_at \
             FROM dog_ears WHERE user_id = ?1 AND footnote_id = ?2",
            params![user_id, footnote_id],
            Self::row_to_dogear,
        );
        match result {
            Ok(dogear) => Ok(Some(dogear)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DogEarError::DatabaseError(e.to_string())),
        }
    }

    fn list_for_user(
        &self,
        user_id: &str,
        footnote_ids: &[String],
    ) -> Result<HashSet<String>, DogEarError> {
        if footnote_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let placeholders = (0..footnote_ids.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT footnote_id FROM dog_ears WHERE user_id = ?1 AND footnote_id IN ({})",
            placeholders
        );

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| DogEarError::DatabaseError(e.to_string()))?;

        let mut bound: Vec<&dyn rusqlite::types::ToSql> =
            Vec::with_capacity(footnote_ids.len() + 1);
        bound.push(&user_id);
        for id in footnote_ids {
            bound.push(id);
        }

        let rows = stmt
            .query_map(&bound[..], |row| row.get::<_, String>(0))
            .map_err(|e| DogEarError::DatabaseError(e.to_string()))?;

        let mut results = HashSet::new();
        for row in rows {
            results.insert(row.map_err(|e| DogEarError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }
}
