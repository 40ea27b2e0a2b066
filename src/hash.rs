//! Content-addressing primitive shared by corpora and index artifacts.
//!
//! Grounded in the teacher's `cache.rs::Hash` type (hex-encoded, `Display`/
//! `FromStr`/`Serialize` round-trip), narrowed to the single algorithm this
//! system needs: BLAKE3, chosen because it's already a dependency pulled in
//! for exactly this purpose in the `ik1ne-keva` sibling example.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A BLAKE3 content hash, hex-encoded for display and storage keys.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash a single byte slice.
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Hash the concatenation of several fields, each length-prefixed so
    /// that `of_parts(&["ab", "c"]) != of_parts(&["a", "bc"])`.
    pub fn of_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }

    pub fn as_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseContentHashError(usize);

impl fmt::Display for ParseContentHashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid content hash length: expected 64 hex characters, got {}",
            self.0
        )
    }
}

impl std::error::Error for ParseContentHashError {}

impl FromStr for ContentHash {
    type Err = ParseContentHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 64 {
            return Err(ParseContentHashError(s.len()));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hex_str = std::str::from_utf8(chunk).map_err(|_| ParseContentHashError(s.len()))?;
            bytes[i] =
                u8::from_str_radix(hex_str, 16).map_err(|_| ParseContentHashError(s.len()))?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn same_input_same_hash() {
        check!(ContentHash::of(b"hello") == ContentHash::of(b"hello"));
        check!(ContentHash::of(b"hello") != ContentHash::of(b"world"));
    }

    #[test]
    fn of_parts_is_not_concatenation_ambiguous() {
        let a = ContentHash::of_parts(["ab", "c"]);
        let b = ContentHash::of_parts(["a", "bc"]);
        check!(a != b);
    }

    #[test]
    fn round_trips_through_hex() {
        let hash = ContentHash::of(b"round trip me");
        let hex = hash.to_string();
        let parsed: ContentHash = hex.parse().unwrap();
        check!(hash == parsed);
        check!(hex.len() == 64);
    }

    #[test]
    fn serde_round_trip() {
        let hash = ContentHash::of(b"serde");
        let json = serde_json::to_string(&hash).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        check!(hash == back);
    }
}
