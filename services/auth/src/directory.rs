//! Read-only credential directory.
//!
//! Holds the registered principals keyed by login identifier. Built once at
//! startup and shared immutably; there are no mutation operations.

use session_token::TokenPayload;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Errors building a directory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Two records share a login identifier
    #[error("Duplicate login identifier in directory: {0}")]
    DuplicateIdentifier(String),
}

/// SHA-256 digest of a secret. Never printed.
#[derive(Clone, PartialEq, Eq)]
struct SecretDigest([u8; 32]);

impl SecretDigest {
    fn of(secret: &str) -> Self {
        Self(Sha256::digest(secret.as_bytes()).into())
    }

    fn matches(&self, candidate: &Self) -> bool {
        self.0[..].ct_eq(&candidate.0[..]).into()
    }
}

impl fmt::Debug for SecretDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretDigest(<redacted>)")
    }
}

/// One registered principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    /// Unique numeric identifier
    pub id: i64,
    /// Email-shaped login identifier, the lookup key
    pub login: String,
    /// Display name
    pub name: String,
    /// Paying-user entitlement
    pub is_paid: bool,
    secret: SecretDigest,
}

impl IdentityRecord {
    /// Create a record, hashing `secret` immediately.
    pub fn new(
        id: i64,
        login: impl Into<String>,
        name: impl Into<String>,
        is_paid: bool,
        secret: &str,
    ) -> Self {
        Self {
            id,
            login: login.into(),
            name: name.into(),
            is_paid,
            secret: SecretDigest::of(secret),
        }
    }

    /// Constant-time check of a candidate secret.
    #[must_use]
    pub fn verify_secret(&self, candidate: &str) -> bool {
        self.secret.matches(&SecretDigest::of(candidate))
    }

    /// The browser-safe projection of this record.
    #[must_use]
    pub fn payload(&self) -> TokenPayload {
        TokenPayload::new(self.id, self.name.clone(), self.is_paid)
    }
}

/// Immutable set of identity records keyed by login identifier.
#[derive(Debug, Clone, Default)]
pub struct CredentialDirectory {
    by_login: HashMap<String, IdentityRecord>,
}

impl CredentialDirectory {
    /// Build a directory from records.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::DuplicateIdentifier`] when two records share
    /// a login identifier.
    pub fn from_records(
        records: impl IntoIterator<Item = IdentityRecord>,
    ) -> Result<Self, DirectoryError> {
        let mut by_login = HashMap::new();
        for record in records {
            if by_login.contains_key(&record.login) {
                return Err(DirectoryError::DuplicateIdentifier(record.login));
            }
            by_login.insert(record.login.clone(), record);
        }
        Ok(Self { by_login })
    }

    /// The built-in principals.
    ///
    /// # Errors
    ///
    /// Cannot fail for the built-in set; the signature follows
    /// [`Self::from_records`].
    pub fn seeded() -> Result<Self, DirectoryError> {
        Self::from_records([
            IdentityRecord::new(1, "bob@mail.ru", "Bob", true, "god"),
            IdentityRecord::new(2, "alice@mail.ru", "Alice", false, "secret"),
        ])
    }

    /// Exact, case-sensitive lookup. `None` when no record matches.
    #[must_use]
    pub fn find_by_login_identifier(&self, identifier: &str) -> Option<&IdentityRecord> {
        self.by_login.get(identifier)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_login.len()
    }

    /// Whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_login.is_empty()
    }
}

/// Hash a secret nobody will compare against, so lookups of unknown
/// identifiers cost about as much as lookups of known ones.
pub(crate) fn burn_digest(secret: &str) {
    std::hint::black_box(SecretDigest::of(secret));
}
