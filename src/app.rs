//! App Core for Footnotes.
//!
//! Central struct holding the database and long-lived services.

use std::sync::Arc;

use crate::database::connection::Database;
use crate::services::auth_service::AuthService;
use crate::services::email_service::{ConsoleMailer, EmailService, Mailer};

/// Base URL used in subscription links when none is configured.
const DEFAULT_BASE_URL: &str = "http://localhost:4050";

/// Central application struct holding the database and services.
///
/// FootnoteManager, DogEarManager, and SubscriberManager are created
/// on demand via `db.connection()` because they borrow the connection
/// with a lifetime parameter.
pub struct App {
    pub db: Arc<Database>,
    pub auth_service: AuthService,
    pub email_service: EmailService,
}

impl App {
    /// Creates a new App backed by a database file.
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(Database::open(db_path)?);
        Ok(Self::with_database(db, Box::new(ConsoleMailer)))
    }

    /// Creates a new App with an in-memory database — used by tests.
    pub fn open_in_memory(mailer: Box<dyn Mailer + Send>) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(Database::open_in_memory()?);
        Ok(Self::with_database(db, mailer))
    }

    fn with_database(db: Arc<Database>, mailer: Box<dyn Mailer + Send>) -> Self {
        let auth_service = AuthService::new(db.clone());
        let base_url = std::env::var("FOOTNOTES_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let email_service = EmailService::new(mailer, base_url);
        Self {
            db,
            auth_service,
            email_service,
        }
    }
}
