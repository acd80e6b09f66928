use serde::{Deserialize, Serialize};

/// A registered account: an author (publishes footnotes under a handle)
/// and/or a reader (dog-ears footnotes, subscribes to authors).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub handle: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub created_at: i64,
}

/// The verified identity attached to a valid session.
///
/// Deliberately excludes credential material; this is what handlers and the
/// dog-ear controller see as "who is acting".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    pub handle: String,
    pub display_name: String,
}
