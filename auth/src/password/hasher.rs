use hmac::Hmac;
use hmac::Mac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha512;

use super::errors::PasswordError;
use crate::crypto::constant_time_eq;

type HmacSha512 = Hmac<Sha512>;

/// Length of the random key generated for every new password.
pub const SALT_LENGTH: usize = 128;

/// Hash and salt produced together for a single password.
///
/// The two halves are only meaningful as a pair: the salt is the HMAC key the
/// hash was computed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword {
    pub hash: Vec<u8>,
    pub salt: Vec<u8>,
}

/// Password hashing implementation.
///
/// Derives an HMAC-SHA512 of the UTF-8 password keyed with a fresh random salt.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Create a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password with a newly generated salt.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// Hash and salt pair to be stored together
    ///
    /// # Errors
    /// * `EmptyPassword` - Password is the empty string
    /// * `HashingFailed` - Random salt could not be generated
    pub fn hash(&self, password: &str) -> Result<HashedPassword, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::EmptyPassword);
        }

        let mut salt = vec![0u8; SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        let hash = Self::keyed_hash(password, &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword { hash, salt })
    }

    /// Verify a password against a stored hash and salt.
    ///
    /// Malformed stored material never errors, it simply does not match.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Hash recorded when the password was set
    /// * `stored_salt` - Salt recorded alongside `stored_hash`
    ///
    /// # Returns
    /// True only if the recomputed hash equals `stored_hash` over its full length
    pub fn verify(&self, password: &str, stored_hash: &[u8], stored_salt: &[u8]) -> bool {
        if stored_hash.is_empty() || stored_salt.is_empty() {
            return false;
        }

        match Self::keyed_hash(password, stored_salt) {
            Ok(computed) => constant_time_eq(&computed, stored_hash),
            Err(_) => false,
        }
    }

    fn keyed_hash(password: &str, key: &[u8]) -> Result<Vec<u8>, hmac::digest::InvalidLength> {
        let mut mac = HmacSha512::new_from_slice(key)?;
        mac.update(password.as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
