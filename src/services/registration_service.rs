//! Domain service for account registration.
//!
//! Callers validate the form first; the service only sees a [`NewUser`] whose
//! fields already satisfy the presence, email and length rules.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to registration.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("User already exists")]
    UserExists,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// A validated registration request. Holds the plaintext password until it is
/// hashed, so it is deliberately not `Debug`.
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub address: String,
    pub contact_details: String,
    pub email: String,
    pub password: String,
}

/// The persisted account, minus its password hash.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUser {
    pub id: i32,
    pub email: String,
    pub created_at: String,
}

/// Domain service trait for registration.
#[async_trait::async_trait]
pub trait RegistrationService: Send + Sync {
    /// Creates the account unless the email is already taken.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::UserExists`] when the email is registered,
    /// whether that is seen by the lookup or by the unique index on insert.
    async fn register(&self, user: NewUser) -> Result<RegisteredUser, RegistrationError>;
}
