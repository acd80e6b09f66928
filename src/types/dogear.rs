use serde::{Deserialize, Serialize};

/// A reader's private bookmark of a footnote.
///
/// At most one exists per (user, footnote) pair; `selected_text` holds the
/// exact passage the reader selected, or `None` for a whole-footnote
/// bookmark. Re-bookmarking the same footnote replaces the passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DogEar {
    pub id: String,
    pub user_id: String,
    pub footnote_id: String,
    pub selected_text: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
