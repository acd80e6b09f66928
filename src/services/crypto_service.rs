use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::fmt::Write as _;
use std::num::NonZeroU32;
use zeroize::Zeroize;

use crate::types::errors::CryptoError;

/// PBKDF2 iteration count for password hashing.
const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes.
const SALT_LENGTH: usize = 16;

/// Derived password hash length in bytes.
const HASH_LENGTH: usize = 32;

/// Random token length in bytes (64 hex characters once encoded).
const TOKEN_LENGTH: usize = 32;

/// Trait defining cryptographic operations for the platform.
pub trait CryptoServiceTrait {
    /// Generates a cryptographically secure random salt.
    fn generate_salt(&self) -> Result<Vec<u8>, CryptoError>;

    /// Derives a password hash from a password and salt using PBKDF2.
    fn derive_password_hash(&self, password: &str, salt: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Verifies a password against a stored salt + hash in constant time.
    fn verify_password(&self, password: &str, salt: &[u8], expected: &[u8]) -> bool;

    /// Generates a random hex token for sessions and subscription links.
    fn generate_token(&self) -> Result<String, CryptoError>;

    /// Securely clears sensitive data from memory by overwriting with zeros.
    fn zeroize_memory(&self, data: &mut [u8]);
}

/// Implementation of cryptographic services using the `ring` crate.
pub struct CryptoService {
    rng: SystemRandom,
}

impl CryptoService {
    /// Creates a new CryptoService instance.
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }
}

impl Default for CryptoService {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoServiceTrait for CryptoService {
    fn generate_salt(&self) -> Result<Vec<u8>, CryptoError> {
        let mut salt = vec![0u8; SALT_LENGTH];
        self.rng
            .fill(&mut salt)
            .map_err(|_| CryptoError::RandomGeneration("Failed to generate salt".to_string()))?;
        Ok(salt)
    }

    fn derive_password_hash(&self, password: &str, salt: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let iterations = NonZeroU32::new(PBKDF2_ITERATIONS)
            .ok_or_else(|| CryptoError::KeyDerivation("Invalid iteration count".to_string()))?;

        let mut hash = vec![0u8; HASH_LENGTH];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            iterations,
            salt,
            password.as_bytes(),
            &mut hash,
        );

        Ok(hash)
    }

    fn verify_password(&self, password: &str, salt: &[u8], expected: &[u8]) -> bool {
        let Some(iterations) = NonZeroU32::new(PBKDF2_ITERATIONS) else {
            return false;
        };
        pbkdf2::verify(
            pbkdf2::PBKDF2_HMAC_SHA256,
            iterations,
            salt,
            password.as_bytes(),
            expected,
        )
        .is_ok()
    }

    fn generate_token(&self) -> Result<String, CryptoError> {
        let mut bytes = [0u8; TOKEN_LENGTH];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| CryptoError::RandomGeneration("Failed to generate token".to_string()))?;

        let mut token = String::with_capacity(TOKEN_LENGTH * 2);
        for byte in bytes {
            // Infallible for String; keeps the hex lowercase and zero-padded.
            let _ = write!(token, "{:02x}", byte);
        }
        Ok(token)
    }

    fn zeroize_memory(&self, data: &mut [u8]) {
        data.zeroize();
    }
}
