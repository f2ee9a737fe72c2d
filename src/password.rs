//! Salted one-way credential hashing.
//!
//! Hashes are PBKDF2-HMAC-SHA256 and stored as
//! `pbkdf2:sha256:<iterations>$<salt hex>$<hash hex>`. The iteration count
//! travels with the hash, so raising it in configuration only affects new
//! credentials.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

const SCHEME: &str = "pbkdf2:sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Errors raised while parsing a stored credential.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordHashError {
    #[error("unsupported password hash scheme")]
    UnsupportedScheme,
    #[error("malformed password hash")]
    Malformed,
}

/// Hashes and verifies user passwords.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);

        let digest = derive(password, &salt, self.iterations);
        format!(
            "{SCHEME}:{}${}${}",
            self.iterations,
            hex::encode(salt),
            hex::encode(digest)
        )
    }

    /// Check `password` against a stored hash in constant time.
    ///
    /// An unparsable stored value never verifies.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        match parse(stored) {
            Ok(parsed) => {
                let digest = derive(password, &parsed.salt, parsed.iterations);
                digest.as_slice().ct_eq(parsed.hash.as_slice()).into()
            }
            Err(err) => {
                tracing::warn!(error = %err, "Stored password hash could not be parsed");
                false
            }
        }
    }
}

struct ParsedHash {
    iterations: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

fn parse(stored: &str) -> Result<ParsedHash, PasswordHashError> {
    let rest = stored
        .strip_prefix(SCHEME)
        .and_then(|rest| rest.strip_prefix(':'))
        .ok_or(PasswordHashError::UnsupportedScheme)?;

    let mut parts = rest.split('$');
    let (Some(iterations), Some(salt), Some(hash), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(PasswordHashError::Malformed);
    };

    let iterations = iterations
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or(PasswordHashError::Malformed)?;
    let salt = hex::decode(salt).map_err(|_| PasswordHashError::Malformed)?;
    let hash = hex::decode(hash).map_err(|_| PasswordHashError::Malformed)?;
    if salt.is_empty() || hash.len() != HASH_LEN {
        return Err(PasswordHashError::Malformed);
    }

    Ok(ParsedHash {
        iterations,
        salt,
        hash,
    })
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}
