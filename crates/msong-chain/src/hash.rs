//! Keccak-256 hashing and the 256-bit digest type.
//!
//! Every derivation in a run (collection salt, word selection, final seeds,
//! the running note digest) goes through [`keccak256`]. This is the original
//! Keccak padding used on-chain, not NIST SHA3-256; the two produce different
//! digests for the same input.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest as Sha3Digest, Keccak256};

use crate::error::ChainError;

/// Length of a digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// A 256-bit Keccak digest.
///
/// Serialized as a `0x`-prefixed lowercase hex string. Parsing accepts the
/// string with or without the prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// The all-zero digest that seeds the note chain before token 0.
    pub const ZERO: Digest = Digest([0u8; DIGEST_LEN]);

    /// Wraps raw digest bytes.
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Builds a digest from a byte slice that must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ChainError> {
        let array: [u8; DIGEST_LEN] = bytes.try_into().map_err(|_| {
            ChainError::MalformedDigestInput(format!(
                "expected {} bytes, got {}",
                DIGEST_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Parses a 64-character hex string, optionally prefixed with `0x`.
    pub fn from_hex(s: &str) -> Result<Self, ChainError> {
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if hex.len() != DIGEST_LEN * 2 {
            return Err(ChainError::MalformedDigestInput(format!(
                "expected {} hex characters, got {}",
                DIGEST_LEN * 2,
                hex.len()
            )));
        }

        let mut bytes = [0u8; DIGEST_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = hex.get(i * 2..i * 2 + 2).ok_or_else(|| {
                ChainError::MalformedDigestInput(format!("non-ASCII input at offset {}", i * 2))
            })?;
            if !pair.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(ChainError::MalformedDigestInput(format!(
                    "invalid hex pair '{}' at offset {}",
                    pair,
                    i * 2
                )));
            }
            *byte = u8::from_str_radix(pair, 16).map_err(|_| {
                ChainError::MalformedDigestInput(format!("invalid hex pair '{}'", pair))
            })?;
        }
        Ok(Self(bytes))
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex, no prefix.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(DIGEST_LEN * 2);
        for byte in &self.0 {
            out.push_str(&format!("{:02x}", byte));
        }
        out
    }

    /// Lowercase hex with a `0x` prefix.
    pub fn to_prefixed_hex(&self) -> String {
        format!("0x{}", self.to_hex())
    }

    /// First 8 hex characters (the first 4 bytes).
    pub fn preview(&self) -> String {
        self.to_hex()[..8].to_string()
    }

    /// The first 4 bytes read as a big-endian unsigned integer.
    pub fn leading_u32(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Returns true for the all-zero digest.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; DIGEST_LEN]
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_prefixed_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_prefixed_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_prefixed_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Digest::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Computes the Keccak-256 digest of `data`.
///
/// ```
/// use msong_chain::hash::keccak256;
///
/// assert_eq!(
///     keccak256(b"").to_hex(),
///     "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
/// );
/// ```
pub fn keccak256(data: &[u8]) -> Digest {
    keccak256_concat(&[data])
}

/// Computes the Keccak-256 digest of the concatenation of `parts`.
///
/// Equivalent to hashing the joined bytes without allocating the join.
pub fn keccak256_concat(parts: &[&[u8]]) -> Digest {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let out = hasher.finalize();

    let mut bytes = [0u8; DIGEST_LEN];
    bytes.copy_from_slice(&out);
    Digest(bytes)
}

/// Derives the collection salt from its human-readable phrase.
///
/// ```text
/// collection_salt = keccak256(utf8(phrase))
/// ```
pub fn collection_salt(phrase: &str) -> Digest {
    keccak256(phrase.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_known_vectors() {
        assert_eq!(
            keccak256(b"").to_hex(),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        // Not the SHA3-256 value (644bcc7e...), which would mean the wrong padding.
        assert_eq!(
            keccak256(b"hello world").to_hex(),
            "47173285a8d7341e5e972fc677286384f802f8ef42a5ec5f03bbfa254cb01fad"
        );
    }

    #[test]
    fn test_concat_matches_joined_input() {
        let joined = keccak256(b"seven_words_1000");
        let parts = keccak256_concat(&[&b"seven_"[..], &b"words_"[..], &b"1000"[..]]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn test_collection_salt() {
        assert_eq!(
            collection_salt("test phrase").to_hex(),
            "6128c713655aba794a3909bbc150458aad952069212788363db9a210b7aef6b7"
        );
    }

    #[test]
    fn test_hex_roundtrip_with_and_without_prefix() {
        let digest = keccak256(b"hello world");
        assert_eq!(Digest::from_hex(&digest.to_hex()).unwrap(), digest);
        assert_eq!(Digest::from_hex(&digest.to_prefixed_hex()).unwrap(), digest);
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        let err = Digest::from_hex("0xabcd").unwrap_err();
        assert!(matches!(err, ChainError::MalformedDigestInput(_)));
    }

    #[test]
    fn test_from_hex_rejects_non_hex() {
        let bad = "zz".repeat(32);
        let err = Digest::from_hex(&bad).unwrap_err();
        assert!(matches!(err, ChainError::MalformedDigestInput(_)));
    }

    #[test]
    fn test_from_slice_rejects_short_input() {
        let err = Digest::from_slice(&[0u8; 31]).unwrap_err();
        assert!(matches!(err, ChainError::MalformedDigestInput(_)));
        assert!(Digest::from_slice(&[7u8; 32]).is_ok());
    }

    #[test]
    fn test_preview_and_leading_u32() {
        let digest = Digest::from_hex(
            "5c92beeb907a7a18394c489539f30c4f612a1c787a0c3049a4e343dc329cfa21",
        )
        .unwrap();
        assert_eq!(digest.preview(), "5c92beeb");
        assert_eq!(digest.leading_u32(), 0x5c92beeb);
        assert_eq!(digest.leading_u32(), 1_553_121_003);
    }

    #[test]
    fn test_zero_digest() {
        assert!(Digest::ZERO.is_zero());
        assert!(!keccak256(b"").is_zero());
    }

    #[test]
    fn test_serde_as_prefixed_hex() {
        let digest = keccak256(b"");
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(
            json,
            "\"0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470\""
        );
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
        assert!(serde_json::from_str::<Digest>("\"0x1234\"").is_err());
    }
}
