use serde::{Deserialize, Serialize};

/// An email subscription to one author's published footnotes.
///
/// Created unconfirmed; the reader proves ownership of the address by
/// following the confirm-token link. The unsubscribe token is embedded in
/// every announcement email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: String,
    pub author_id: String,
    pub email: String,
    pub confirmed: bool,
    pub confirm_token: String,
    pub unsubscribe_token: String,
    pub created_at: i64,
    pub confirmed_at: Option<i64>,
}
