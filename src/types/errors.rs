use std::fmt;

// === CryptoError ===

/// Errors related to cryptographic operations.
#[derive(Debug)]
pub enum CryptoError {
    /// Failed to derive a password hash.
    KeyDerivation(String),
    /// Failed to generate random bytes.
    RandomGeneration(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::KeyDerivation(msg) => write!(f, "Key derivation failed: {}", msg),
            CryptoError::RandomGeneration(msg) => {
                write!(f, "Random generation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for CryptoError {}

// === AuthError ===

/// Errors related to accounts and sessions.
#[derive(Debug)]
pub enum AuthError {
    /// An account with this email already exists.
    EmailTaken(String),
    /// An account with this handle already exists.
    HandleTaken(String),
    /// Email/password pair did not match an account.
    InvalidCredentials,
    /// Signup or login input failed validation.
    InvalidInput(String),
    /// Database operation failed.
    DatabaseError(String),
    /// Cryptographic operation failed during hashing or token generation.
    CryptoError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::EmailTaken(email) => write!(f, "Email already in use: {}", email),
            AuthError::HandleTaken(handle) => write!(f, "Handle already in use: {}", handle),
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AuthError::DatabaseError(msg) => write!(f, "Auth database error: {}", msg),
            AuthError::CryptoError(msg) => write!(f, "Auth crypto error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

// === FootnoteError ===

/// Errors related to footnote authoring operations.
#[derive(Debug)]
pub enum FootnoteError {
    /// Footnote with the given ID was not found (or is not visible to the caller).
    NotFound(String),
    /// Title, body, or tags failed validation.
    InvalidInput(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for FootnoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FootnoteError::NotFound(id) => write!(f, "Footnote not found: {}", id),
            FootnoteError::InvalidInput(msg) => write!(f, "Invalid footnote input: {}", msg),
            FootnoteError::DatabaseError(msg) => {
                write!(f, "Footnote database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for FootnoteError {}

// === DogEarError ===

/// Errors related to dog-ear (bookmark) persistence.
#[derive(Debug)]
pub enum DogEarError {
    /// The footnote does not exist or is not published.
    NotFound(String),
    /// The caller has no verified identity.
    Unauthorized,
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for DogEarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DogEarError::NotFound(id) => write!(f, "Footnote not found: {}", id),
            DogEarError::Unauthorized => write!(f, "Not authenticated"),
            DogEarError::DatabaseError(msg) => write!(f, "Dog-ear database error: {}", msg),
        }
    }
}

impl std::error::Error for DogEarError {}

// === SubscriberError ===

/// Errors related to email subscription management.
#[derive(Debug)]
pub enum SubscriberError {
    /// The provided email address is not valid.
    InvalidEmail(String),
    /// No subscription matches the given confirm/unsubscribe token.
    InvalidToken(String),
    /// Database operation failed.
    DatabaseError(String),
    /// Token generation failed.
    CryptoError(String),
}

impl fmt::Display for SubscriberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriberError::InvalidEmail(email) => write!(f, "Invalid email address: {}", email),
            SubscriberError::InvalidToken(token) => {
                write!(f, "Unknown subscription token: {}", token)
            }
            SubscriberError::DatabaseError(msg) => {
                write!(f, "Subscriber database error: {}", msg)
            }
            SubscriberError::CryptoError(msg) => write!(f, "Subscriber crypto error: {}", msg),
        }
    }
}

impl std::error::Error for SubscriberError {}

// === EmailError ===

/// Errors related to email delivery.
#[derive(Debug)]
pub enum EmailError {
    /// The transport rejected or failed to deliver the message.
    DeliveryFailed(String),
}

impl fmt::Display for EmailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmailError::DeliveryFailed(msg) => write!(f, "Email delivery failed: {}", msg),
        }
    }
}

impl std::error::Error for EmailError {}
