//! Footnote authoring for Footnotes.
//!
//! Implements `FootnoteManagerTrait` — draft/publish lifecycle, per-author
//! slug generation, and tag association, backed by SQLite via `rusqlite`.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::types::errors::FootnoteError;
use crate::types::footnote::{
    Footnote, FootnoteInput, FootnoteStatus, Tag, BODY_MAX_CHARS, MAX_TAGS, TAG_MAX_CHARS,
    TITLE_MAX_CHARS,
};

/// Generates a URL-safe slug from text: lowercase, word characters only,
/// spaces collapsed to single hyphens. May come out empty (e.g. a title of
/// pure punctuation); callers fall back to a date slug.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_hyphen = true; // swallow leading hyphens
    for ch in text.trim().chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() || lower == '_' {
            out.push(lower);
            last_hyphen = false;
        } else if (ch.is_whitespace() || ch == '-') && !last_hyphen {
            out.push('-');
            last_hyphen = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Generates a slug for a tag name, falling back to a crude replacement when
/// slugify strips everything.
pub fn tag_slug(name: &str) -> String {
    let slug = slugify(name);
    if slug.is_empty() {
        name.trim().to_lowercase().replace(char::is_whitespace, "-")
    } else {
        slug
    }
}

/// Parses a comma-separated tag string into trimmed, lowercased, non-empty
/// tags, capped at the per-footnote maximum.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .take(MAX_TAGS)
        .collect()
}

/// Trait defining footnote authoring operations.
pub trait FootnoteManagerTrait {
    fn create(&mut self, author_id: &str, input: &FootnoteInput) -> Result<Footnote, FootnoteError>;
    fn update(
        &mut self,
        author_id: &str,
        id: &str,
        input: &FootnoteInput,
    ) -> Result<Footnote, FootnoteError>;
    fn publish(&mut self, author_id: &str, id: &str) -> Result<Footnote, FootnoteError>;
    fn delete(&mut self, author_id: &str, id: &str) -> Result<(), FootnoteError>;
    fn get(&self, id: &str) -> Result<Option<Footnote>, FootnoteError>;
    fn get_by_slug(&self, handle: &str, slug: &str) -> Result<Option<Footnote>, FootnoteError>;
    /// Published footnotes, newest first, optionally filtered by author
    /// handle and/or tag slug.
    fn list_published(
        &self,
        handle: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Vec<Footnote>, FootnoteError>;
    /// Everything by one author, drafts included, newest first.
    fn list_for_author(&self, author_id: &str) -> Result<Vec<Footnote>, FootnoteError>;
    fn tags_for(&self, footnote_id: &str) -> Result<Vec<Tag>, FootnoteError>;
}

/// Footnote manager backed by a SQLite connection.
pub struct FootnoteManager<'a> {
    conn: &'a Connection,
}

impl<'a> FootnoteManager<'a> {
    /// Creates a new `FootnoteManager` using the provided database connection.
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

    /// YYYY-MM-DD slug for untitled footnotes.
    fn date_slug(timestamp: i64) -> String {
        let date = time::OffsetDateTime::from_unix_timestamp(timestamp)
            .unwrap_or(time::OffsetDateTime::UNIX_EPOCH)
            .date();
        format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            u8::from(date.month()),
            date.day()
        )
    }

    fn validate(input: &FootnoteInput) -> Result<(), FootnoteError> {
        if let Some(title) = &input.title {
            if title.chars().count() > TITLE_MAX_CHARS {
                return Err(FootnoteError::InvalidInput("title too long".to_string()));
            }
        }
        if input.body.trim().is_empty() {
            return Err(FootnoteError::InvalidInput("body is required".to_string()));
        }
        if input.body.chars().count() > BODY_MAX_CHARS {
            return Err(FootnoteError::InvalidInput("body too long".to_string()));
        }
        if input.tags.len() > MAX_TAGS {
            return Err(FootnoteError::InvalidInput("too many tags".to_string()));
        }
        if input.tags.iter().any(|t| t.chars().count() > TAG_MAX_CHARS) {
            return Err(FootnoteError::InvalidInput("tag too long".to_string()));
        }
        Ok(())
    }

    /// Generates a slug unique within the author's footnotes, appending a
    /// numeric suffix on collision.
    fn unique_slug(&self, author_id: &str, title: Option<&str>) -> Result<String, FootnoteError> {
        let base = title.map(slugify).filter(|s| !s.is_empty());
        let base = base.unwrap_or_else(|| Self::date_slug(Self::now()));

        let mut slug = base.clone();
        let mut suffix = 1;
        loop {
            let taken: i64 = self
                .conn
                .query_row(
                    "SELECT COUNT(*) FROM footnotes WHERE author_id = ?1 AND slug = ?2",
                    params![author_id, slug],
                    |row| row.get(0),
                )
                .map_err(|e| FootnoteError::DatabaseError(e.to_string()))?;
            if taken == 0 {
                return Ok(slug);
            }
            suffix += 1;
            slug = format!("{}-{}", base, suffix);
        }
    }

    /// Verifies the footnote exists and belongs to the author. Foreign
    /// content answers `NotFound` so ids don't leak.
    fn check_author(&self, author_id: &str, id: &str) -> Result<(), FootnoteError> {
        let owner: String = match self.conn.query_row(
            "SELECT author_id FROM footnotes WHERE id = ?1",
            params![id],
            |row| row.get(0),
        ) {
            Ok(owner) => owner,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(FootnoteError::NotFound(id.to_string()))
            }
            Err(e) => return Err(FootnoteError::DatabaseError(e.to_string())),
        };
        if owner != author_id {
            return Err(FootnoteError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Replaces the footnote's tag associations, creating tags on demand.
    fn set_tags(&mut self, footnote_id: &str, tags: &[String]) -> Result<(), FootnoteError> {
        self.conn
            .execute(
                "DELETE FROM footnote_tags WHERE footnote_id = ?1",
                params![footnote_id],
            )
            .map_err(|e| FootnoteError::DatabaseError(e.to_string()))?;

        for name in tags {
            let slug = tag_slug(name);
            let existing: Option<String> = match self.conn.query_row(
                "SELECT id FROM tags WHERE slug = ?1",
                params![slug],
                |row| row.get(0),
            ) {
                Ok(id) => Some(id),
                Err(rusqlite::Error::QueryReturnedNoRows) => None,
                Err(e) => return Err(FootnoteError::DatabaseError(e.to_string())),
            };

            let tag_id = match existing {
                Some(id) => id,
                None => {
                    let id = Uuid::new_v4().to_string();
                    self.conn
                        .execute(
                            "INSERT INTO tags (id, name, slug) VALUES (?1, ?2, ?3)",
                            params![id, name, slug],
                        )
                        .map_err(|e| FootnoteError::DatabaseError(e.to_string()))?;
                    id
                }
            };

            self.conn
                .execute(
                    "INSERT OR IGNORE INTO footnote_tags (footnote_id, tag_id) VALUES (?1, ?2)",
                    params![footnote_id, tag_id],
                )
                .map_err(|e| FootnoteError::DatabaseError(e.to_string()))?;
        }
        Ok(())
    }

    /// Reads a single footnote row into a struct.
    fn row_to_footnote(row: &rusqlite::Row) -> rusqlite::Result<Footnote> {
        let status: String = row.get(5)?;
        Ok(Footnote {
            id: row.get(0)?,
            author_id: row.get(1)?,
            title: row.get(2)?,
            slug: row.get(3)?,
            body: row.get(4)?,
            status: FootnoteStatus::parse(&status).unwrap_or(FootnoteStatus::Draft),
            published_at: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    const SELECT: &'static str = "SELECT id, author_id, title, slug, body, status, \
                                  published_at, created_at, updated_at FROM footnotes";

    fn fetch(&self, id: &str) -> Result<Footnote, FootnoteError> {
        self.get(id)?
            .ok_or_else(|| FootnoteError::NotFound(id.to_string()))
    }
}

impl<'a> FootnoteManagerTrait for FootnoteManager<'a> {
    /// Creates a draft footnote. Returns the stored footnote.
    fn create(&mut self, author_id: &str, input: &FootnoteInput) -> Result<Footnote, FootnoteError> {
        Self::validate(input)?;

        let id = Uuid::new_v4().to_string();
        let now = Self::now();
        let title = input
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let slug = self.unique_slug(author_id, title)?;

        self.conn
            .execute(
                "INSERT INTO footnotes (id, author_id, title, slug, body, status, published_at, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, 'draft', NULL, ?6, ?7)",
                params![id, author_id, title, slug, input.body, now, now],
            )
            .map_err(|e| FootnoteError::DatabaseError(e.to_string()))?;

        self.set_tags(&id, &input.tags)?;
        self.fetch(&id)
    }

    /// Updates title, body, and tags. The slug is stable across edits.
    fn update(
        &mut self,
        author_id: &str,
        id: &str,
        input: &FootnoteInput,
    ) -> Result<Footnote, FootnoteError> {
        Self::validate(input)?;
        self.check_author(author_id, id)?;

        let title = input
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let now = Self::now();

        self.conn
            .execute(
                "UPDATE footnotes SET title = ?1, body = ?2, updated_at = ?3 WHERE id = ?4",
                params![title, input.body, now, id],
            )
            .map_err(|e| FootnoteError::DatabaseError(e.to_string()))?;

        self.set_tags(id, &input.tags)?;
        self.fetch(id)
    }

    /// Publishes a draft. Publishing an already-published footnote keeps its
    /// original publication time.
    fn publish(&mut self, author_id: &str, id: &str) -> Result<Footnote, FootnoteError> {
        self.check_author(author_id, id)?;
        let now = Self::now();

        self.conn
            .execute(
                "UPDATE footnotes SET status = 'published', \
                 published_at = COALESCE(published_at, ?1), updated_at = ?1 WHERE id = ?2",
                params![now, id],
            )
            .map_err(|e| FootnoteError::DatabaseError(e.to_string()))?;

        self.fetch(id)
    }

    /// Deletes a footnote; dog-ears and tag links cascade with it.
    fn delete(&mut self, author_id: &str, id: &str) -> Result<(), FootnoteError> {
        self.check_author(author_id, id)?;
        self.conn
            .execute("DELETE FROM footnotes WHERE id = ?1", params![id])
            .map_err(|e| FootnoteError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Footnote>, FootnoteError> {
        let sql = format!("{} WHERE id = ?1", Self::SELECT);
        let result = self
            .conn
            .query_row(&sql, params![id], Self::row_to_footnote);
        match result {
            Ok(footnote) => Ok(Some(footnote)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(FootnoteError::DatabaseError(e.to_string())),
        }
    }

    fn get_by_slug(&self, handle: &str, slug: &str) -> Result<Option<Footnote>, FootnoteError> {
        let result = self.conn.query_row(
            "SELECT f.id, f.author_id, f.title, f.slug, f.body, f.status, \
             f.published_at, f.created_at, f.updated_at \
             FROM footnotes f JOIN users u ON u.id = f.author_id \
             WHERE u.handle = ?1 AND f.slug = ?2",
            params![handle, slug],
            Self::row_to_footnote,
        );
        match result {
            Ok(footnote) => Ok(Some(footnote)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(FootnoteError::DatabaseError(e.to_string())),
        }
    }

    fn list_published(
        &self,
        handle: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Vec<Footnote>, FootnoteError> {
        let mut sql = String::from(
            "SELECT f.id, f.author_id, f.title, f.slug, f.body, f.status, \
             f.published_at, f.created_at, f.updated_at FROM footnotes f",
        );
        if handle.is_some() {
            sql.push_str(" JOIN users u ON u.id = f.author_id");
        }
        if tag.is_some() {
            sql.push_str(
                " JOIN footnote_tags ft ON ft.footnote_id = f.id \
                 JOIN tags t ON t.id = ft.tag_id",
            );
        }
        sql.push_str(" WHERE f.status = 'published'");

        let mut bound: Vec<&dyn rusqlite::types::ToSql> = Vec::new();
        if let Some(handle) = &handle {
            bound.push(handle);
            sql.push_str(&format!(" AND u.handle = ?{}", bound.len()));
        }
        if let Some(tag) = &tag {
            bound.push(tag);
            sql.push_str(&format!(" AND t.slug = ?{}", bound.len()));
        }
        sql.push_str(" ORDER BY f.published_at DESC");

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| FootnoteError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map(&bound[..], Self::row_to_footnote)
            .map_err(|e| FootnoteError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| FootnoteError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }

    fn list_for_author(&self, author_id: &str) -> Result<Vec<Footnote>, FootnoteError> {
        let sql = format!(
            "{} WHERE author_id = ?1 ORDER BY created_at DESC",
            Self::SELECT
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| FootnoteError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map(params![author_id], Self::row_to_footnote)
            .map_err(|e| FootnoteError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| FootnoteError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }

    fn tags_for(&self, footnote_id: &str) -> Result<Vec<Tag>, FootnoteError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT t.id, t.name, t.slug FROM tags t \
                 JOIN footnote_tags ft ON ft.tag_id = t.id \
                 WHERE ft.footnote_id = ?1 ORDER BY t.name",
            )
            .map_err(|e| FootnoteError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map(params![footnote_id], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    slug: row.get(2)?,
                })
            })
            .map_err(|e| FootnoteError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| FootnoteError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }
}
