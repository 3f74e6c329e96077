use crate::error::GitInnerError;
use crate::sha::Sha;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha1::Digest;
use std::fmt;
use std::str::FromStr;

/// A SHA-1 object id plus an attached hasher for incremental use.
#[derive(Clone)]
pub struct Sha1 {
    pub state: [u8; 20],
    buffer: sha1::Sha1,
}

impl Sha1 {
    pub fn new() -> Sha1 {
        Sha1 {
            state: [0; 20],
            buffer: sha1::Sha1::default(),
        }
    }

    pub fn digest(data: &[u8]) -> Sha1 {
        Sha1 {
            state: <[u8; 20]>::from(sha1::Sha1::digest(data)),
            buffer: sha1::Sha1::default(),
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.state)
    }
}

impl FromStr for Sha1 {
    type Err = GitInnerError;

    /// Only the canonical lowercase form is accepted, that is what goes on the wire.
    fn from_str(s: &str) -> Result<Sha1, GitInnerError> {
        if s.len() != 40 || s.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(GitInnerError::InvalidSha1String);
        }
        let mut state = [0; 20];
        hex::decode_to_slice(s, &mut state).map_err(|_| GitInnerError::InvalidSha1String)?;
        Ok(Sha1 {
            state,
            buffer: sha1::Sha1::default(),
        })
    }
}

impl Default for Sha1 {
    fn default() -> Self {
        Sha1::new()
    }
}

impl PartialEq for Sha1 {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl Eq for Sha1 {}

impl fmt::Display for Sha1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Sha1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha1({})", self.to_hex())
    }
}

impl Serialize for Sha1 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Sha1 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Sha1::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Sha for Sha1 {
    fn update(&mut self, data: &[u8]) {
        self.buffer.update(data);
    }

    fn finalize(&mut self) -> Vec<u8> {
        let result = self.buffer.clone().finalize();
        self.state.copy_from_slice(&result);
        self.state.to_vec()
    }}
