//! Authentication for Footnotes.
//!
//! Accounts, PBKDF2 password verification, and cookie-style session tokens
//! backed by SQLite. Handlers resolve a session token to a [`UserIdentity`]
//! per call; everything below the handler layer receives a concrete user id
//! or nothing at all.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::params;
use uuid::Uuid;

use crate::database::connection::Database;
use crate::services::crypto_service::{CryptoService, CryptoServiceTrait};
use crate::types::errors::AuthError;
use crate::types::user::{User, UserIdentity};

/// Session lifetime: 7 days.
const SESSION_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

const HANDLE_MIN_CHARS: usize = 3;
const HANDLE_MAX_CHARS: usize = 30;
const PASSWORD_MIN_CHARS: usize = 8;

/// Builds the authentication entry point carrying the current page as the
/// return destination, e.g. `/login?next=%2Fdemo%2Fon-writing`.
///
/// After authenticating, the reader lands back on the same footnote view;
/// the interrupted action is not replayed.
pub fn login_redirect(next: &str) -> String {
    format!("/login?next={}", encode_uri_component(next))
}

/// Percent-encodes everything outside the unreserved set.
fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => out.push(byte as char),
            b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' => {
                out.push(byte as char)
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{:02X}", byte));
            }
        }
    }
    out
}

/// Trait defining account and session operations.
pub trait AuthServiceTrait {
    fn signup(
        &self,
        email: &str,
        handle: &str,
        display_name: &str,
        password: &str,
    ) -> Result<UserIdentity, AuthError>;
    fn login(&self, email: &str, password: &str) -> Result<String, AuthError>;
    fn create_session(&self, user_id: &str) -> Result<String, AuthError>;
    fn current_user(&self, token: &str) -> Result<Option<UserIdentity>, AuthError>;
    fn logout(&self, token: &str) -> Result<(), AuthError>;
    fn user_by_id(&self, id: &str) -> Result<Option<User>, AuthError>;
    fn user_by_handle(&self, handle: &str) -> Result<Option<User>, AuthError>;
}

/// Authentication service backed by SQLite + CryptoService.
pub struct AuthService {
    db: Arc<Database>,
    crypto: CryptoService,
}

impl AuthService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
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

    fn validate_signup(
        email: &str,
        handle: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        if !email.contains('@') || email.len() > 254 {
            return Err(AuthError::InvalidInput("invalid email address".to_string()));
        }
        if handle.len() < HANDLE_MIN_CHARS || handle.len() > HANDLE_MAX_CHARS {
            return Err(AuthError::InvalidInput(format!(
                "handle must be {}-{} characters",
                HANDLE_MIN_CHARS, HANDLE_MAX_CHARS
            )));
        }
        if !handle
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(AuthError::InvalidInput(
                "handle may only contain lowercase letters, digits, and hyphens".to_string(),
            ));
        }
        if password.len() < PASSWORD_MIN_CHARS {
            return Err(AuthError::InvalidInput(format!(
                "password must be at least {} characters",
                PASSWORD_MIN_CHARS
            )));
        }
        Ok(())
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            handle: row.get(2)?,
            display_name: row.get(3)?,
            bio: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

impl AuthServiceTrait for AuthService {
    /// Creates an account. Email and handle must both be unused.
    fn signup(
        &self,
        email: &str,
        handle: &str,
        display_name: &str,
        password: &str,
    ) -> Result<UserIdentity, AuthError> {
        Self::validate_signup(email, handle, password)?;

        let conn = self.db.connection();

        let email_taken: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        if email_taken > 0 {
            return Err(AuthError::EmailTaken(email.to_string()));
        }

        let handle_taken: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE handle = ?1",
                params![handle],
                |row| row.get(0),
            )
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        if handle_taken > 0 {
            return Err(AuthError::HandleTaken(handle.to_string()));
        }

        let salt = self
            .crypto
            .generate_salt()
            .map_err(|e| AuthError::CryptoError(e.to_string()))?;
        let mut hash = self
            .crypto
            .derive_password_hash(password, &salt)
            .map_err(|e| AuthError::CryptoError(e.to_string()))?;

        let id = Uuid::new_v4().to_string();
        let display_name = if display_name.trim().is_empty() {
            handle
        } else {
            display_name.trim()
        };
        let now = Self::now();

        let inserted = conn.execute(
            "INSERT INTO users (id, email, handle, display_name, bio, password_salt, password_hash, created_at) \
             VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, ?7)",
            params![id, email, handle, display_name, salt, hash, now],
        );
        self.crypto.zeroize_memory(&mut hash);
        inserted.map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(UserIdentity {
            id,
            email: email.to_string(),
            handle: handle.to_string(),
            display_name: display_name.to_string(),
        })
    }

    /// Verifies credentials and opens a session. Returns the session token.
    fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let conn = self.db.connection();

        let result = conn.query_row(
            "SELECT id, password_salt, password_hash FROM users WHERE email = ?1",
            params![email],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Vec<u8>>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                ))
            },
        );

        let (user_id, salt, mut expected) = match result {
            Ok(found) => found,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(AuthError::InvalidCredentials)
            }
            Err(e) => return Err(AuthError::DatabaseError(e.to_string())),
        };

        let matches = self.crypto.verify_password(password, &salt, &expected);
        self.crypto.zeroize_memory(&mut expected);
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        self.create_session(&user_id)
    }

    /// Opens a session for the given user. Returns the session token.
    fn create_session(&self, user_id: &str) -> Result<String, AuthError> {
        let token = self
            .crypto
            .generate_token()
            .map_err(|e| AuthError::CryptoError(e.to_string()))?;
        let now = Self::now();

        self.db
            .connection()
            .execute(
                "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
                params![token, user_id, now, now + SESSION_MAX_AGE_SECS],
            )
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(token)
    }

    /// Resolves a session token to its user. Expired sessions are deleted
    /// and resolve to `None`, same as a token that never existed.
    fn current_user(&self, token: &str) -> Result<Option<UserIdentity>, AuthError> {
        let conn = self.db.connection();

        let result = conn.query_row(
            "SELECT u.id, u.email, u.handle, u.display_name, s.expires_at \
             FROM sessions s JOIN users u ON u.id = s.user_id WHERE s.token = ?1",
            params![token],
            |row| {
                Ok((
                    UserIdentity {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        handle: row.get(2)?,
                        display_name: row.get(3)?,
                    },
                    row.get::<_, i64>(4)?,
                ))
            },
        );

        match result {
            Ok((identity, expires_at)) => {
                if expires_at <= Self::now() {
                    let _ = conn.execute("DELETE FROM sessions WHERE token = ?1", params![token]);
                    return Ok(None);
                }
                Ok(Some(identity))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AuthError::DatabaseError(e.to_string())),
        }
    }

    /// Ends a session. Unknown tokens are a no-op.
    fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.db
            .connection()
            .execute("DELETE FROM sessions WHERE token = ?1", params![token])
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn user_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
        let result = self.db.connection().query_row(
            "SELECT id, email, handle, display_name, bio, created_at FROM users WHERE id = ?1",
            params![id],
            Self::row_to_user,
        );
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AuthError::DatabaseError(e.to_string())),
        }
    }

    fn user_by_handle(&self, handle: &str) -> Result<Option<User>, AuthError> {
        let result = self.db.connection().query_row(
            "SELECT id, email, handle, display_name, bio, created_at FROM users WHERE handle = ?1",
            params![handle],
            Self::row_to_user,
        );
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AuthError::DatabaseError(e.to_string())),
        }
    }
}
