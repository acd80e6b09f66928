use serde::{Deserialize, Serialize};

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 200;

/// Maximum body length in characters.
pub const BODY_MAX_CHARS: usize = 50_000;

/// Maximum length of a single tag.
pub const TAG_MAX_CHARS: usize = 50;

/// Maximum number of tags per footnote.
pub const MAX_TAGS: usize = 10;

/// Publication state of a footnote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FootnoteStatus {
    Draft,
    Published,
}

impl FootnoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FootnoteStatus::Draft => "draft",
            FootnoteStatus::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(FootnoteStatus::Draft),
            "published" => Some(FootnoteStatus::Published),
            _ => None,
        }
    }
}

/// A single short-form post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Footnote {
    pub id: String,
    pub author_id: String,
    pub title: Option<String>,
    pub slug: String,
    pub body: String,
    pub status: FootnoteStatus,
    pub published_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Footnote {
    pub fn is_published(&self) -> bool {
        self.status == FootnoteStatus::Published
    }
}

/// Author-supplied fields for creating or updating a footnote.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FootnoteInput {
    pub title: Option<String>,
    pub body: String,
    pub tags: Vec<String>,
}

/// A tag attached to footnotes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub slug: String,
}
