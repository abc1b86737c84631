//! Capability traits used by the identity store

use crate::error::Result;

/// One-way password hashing
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password
    fn hash(&self, password: &str) -> Result<String>;

    /// Check a plaintext password against a stored hash
    ///
    /// A malformed hash counts as a mismatch.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
