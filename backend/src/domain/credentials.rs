//! Password digests.
//!
//! Digests are a deterministic function of `(account, password)`: login looks
//! up the row whose stored digest equals the freshly computed one. The
//! account name is the only per-user input, so it feeds the salt; Argon2id
//! supplies the work factor that a bare fast hash lacks.

use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::Error;
use super::auth::Password;

/// Hex-encoded password digest as stored in the `users.password` column.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a digest read back from storage.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Hex digest as stored in the `password` column.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

/// Derive password digests from account credentials.
///
/// Implementations must be deterministic: identical inputs yield identical
/// digests, and different accounts with the same password yield different
/// digests.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, passport: &str, password: &Password) -> Result<PasswordDigest, Error>;
}

const SALT_CONTEXT: &[u8] = b"focus.credential-salt.v1";
const OUTPUT_LEN: usize = 32;

/// Argon2id hasher with an account-derived salt.
///
/// # Examples
/// ```
/// use focus::domain::{Argon2CredentialHasher, CredentialHasher, Password};
///
/// let hasher = Argon2CredentialHasher::with_cost(8, 1, 1).unwrap();
/// let pw = Password::new("pw123").unwrap();
/// let a = hasher.hash("alice", &pw).unwrap();
/// let b = hasher.hash("alice", &pw).unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Clone)]
pub struct Argon2CredentialHasher {
    params: Params,
}

impl Argon2CredentialHasher {
    /// Hasher using the `argon2` crate's recommended cost.
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Hasher with an explicit memory (KiB), iteration and lane cost.
    pub fn with_cost(memory_kib: u32, iterations: u32, lanes: u32) -> Result<Self, Error> {
        let params = Params::new(memory_kib, iterations, lanes, Some(OUTPUT_LEN))
            .map_err(|err| Error::internal(format!("invalid argon2 parameters: {err}")))?;
        Ok(Self { params })
    }

    fn salt_for(passport: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(SALT_CONTEXT);
        hasher.update(passport.as_bytes());
        hasher.finalize().into()
    }
}

impl Default for Argon2CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, passport: &str, password: &Password) -> Result<PasswordDigest, Error> {
        let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let salt = Self::salt_for(passport);
        let mut output = Zeroizing::new([0_u8; OUTPUT_LEN]);
        argon
            .hash_password_into(password.expose().as_bytes(), &salt, output.as_mut_slice())
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;
        Ok(PasswordDigest(hex::encode(output.as_slice())))
    }
}
