//! Passwords and their Argon2id hashes.
//!
//! Hashes are stored in PHC string format (`$argon2id$v=19$m=...`), so the
//! parameters used at signup travel with the hash and verification keeps
//! working after [`PasswordHashing`] is retuned.

use std::fmt;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::Deserialize;

use crate::error::{LedgerError, Result};

/// Shortest password accepted at signup or on a profile change.
pub const MIN_PASSWORD_LEN: usize = 8;

/// A plaintext password. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    /// Wraps a plaintext password.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// The plaintext, for hashing.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Checks the length policy.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if shorter than [`MIN_PASSWORD_LEN`] characters.
    pub fn validate(&self) -> Result<()> {
        if self.0.chars().count() < MIN_PASSWORD_LEN {
            return Err(LedgerError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Argon2id hashing with configurable cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordHashing {
    params: Params,
}

impl Default for PasswordHashing {
    fn default() -> Self {
        Self {
            params: Params::DEFAULT,
        }
    }
}

impl PasswordHashing {
    /// Argon2id with `memory_kib` of memory and `iterations` passes.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if Argon2 rejects the parameters.
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| LedgerError::Validation(format!("Invalid password hashing cost: {e}")))?;
        Ok(Self { params })
    }

    /// The cheapest parameters Argon2 accepts. Only for tests.
    #[must_use]
    pub fn minimal() -> Self {
        Self::new(Params::MIN_M_COST, Params::MIN_T_COST).unwrap_or_default()
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes `password` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] if hashing fails.
    pub fn hash(&self, password: &Password) -> Result<String> {
        let salt = SaltString::generate(&mut rand::rngs::OsRng);
        self.argon2()
            .hash_password(password.expose().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| LedgerError::Database(format!("Failed to hash password: {e}")))
    }

    /// Checks `password` against a stored PHC hash.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] if the stored hash is malformed.
    pub fn verify(&self, password: &Password, stored: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| LedgerError::Database(format!("Malformed password hash: {e}")))?;
        match self.argon2().verify_password(password.expose().as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(LedgerError::Database(format!("Failed to verify password: {e}"))),
        }
    }
}
