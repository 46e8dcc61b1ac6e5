//! Content-derived snapshot identifiers.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length of a hex-encoded SHA-256 digest.
pub const FINGERPRINT_LEN: usize = 64;

/// Hex-encoded SHA-256 digest identifying a snapshot.
///
/// Always 64 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Parse a fingerprint, accepting either hex case.
    ///
    /// Returns `None` for anything that is not exactly 64 hex digits.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() == FINGERPRINT_LEN && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(s.to_ascii_lowercase()))
        } else {
            None
        }
    }

    /// Fingerprint of a tree with no files: the SHA-256 of zero bytes.
    pub fn empty() -> Self {
        FingerprintHasher::new().finish()
    }

    /// Get the fingerprint as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `len` characters, for compact display.
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(FINGERPRINT_LEN)]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid fingerprint: {s:?}"))
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Fingerprint> for String {
    fn from(fingerprint: Fingerprint) -> Self {
        fingerprint.0
    }
}

/// Running SHA-256 accumulator over file contents in traversal order.
///
/// File boundaries are not encoded: the digest covers the plain
/// concatenation of every file's bytes.
#[derive(Clone, Default)]
pub struct FingerprintHasher {
    inner: Sha256,
}

impl fmt::Debug for FingerprintHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FingerprintHasher").finish_non_exhaustive()
    }
}

impl FingerprintHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next file's bytes.
    pub fn update(&mut self, content: &[u8]) {
        self.inner.update(content);
    }

    pub fn finish(self) -> Fingerprint {
        Fingerprint(format!("{:x}", self.inner.finalize()))
    }
}
