//! Body content hashing (MD5 / SHA-256)

use std::fmt;
use std::str::FromStr;

use md5::Md5;
use sha2::{Digest, Sha256};

use crate::error::{FlatError, Result};

/// Hash algorithm declared by the `HASH_ALGO` header field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    /// MD5, 128-bit
    Md5,
    /// SHA-256
    #[default]
    Sha256,
}

impl HashAlgorithm {
    /// Name written to the header.
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha256 => "SHA-256",
        }
    }

    /// Compute the lowercase hex digest of `body`.
    pub fn digest_hex(&self, body: &str) -> String {
        match self {
            HashAlgorithm::Md5 => hex::encode(Md5::digest(body.as_bytes())),
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(body.as_bytes())),
        }
    }

    /// Recompute the digest of `body` and compare it with `expected`.
    pub fn verify(&self, body: &str, expected: &str) -> Result<()> {
        let actual = self.digest_hex(body);
        if actual.eq_ignore_ascii_case(expected) {
            Ok(())
        } else {
            Err(FlatError::HashMismatch {
                expected: expected.to_string(),
                actual,
            })
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = FlatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "MD5" => Ok(HashAlgorithm::Md5),
            "SHA-256" | "SHA256" => Ok(HashAlgorithm::Sha256),
            _ => Err(FlatError::UnknownHashAlgorithm(s.to_string())),
        }
    }
}
