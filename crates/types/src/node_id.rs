// Path: crates/types/src/node_id.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// The textual prefix of every node id.
pub const NODE_ID_PREFIX: &str = "NodeID-";

const CHECKSUM_LEN: usize = 4;

/// A 20-byte node identifier derived from a node's staking certificate.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub [u8; 20]);

impl NodeId {
    /// Derives the node id from the DER encoding of a staking certificate:
    /// the first 20 bytes of its SHA-256 digest.
    pub fn from_cert_der(cert_der: &[u8]) -> Self {
        let digest = Sha256::digest(cert_der);
        let mut id = [0u8; 20];
        id.iter_mut().zip(digest.iter()).for_each(|(dst, src)| *dst = *src);
        NodeId(id)
    }

    fn checksum(bytes: &[u8]) -> [u8; CHECKSUM_LEN] {
        let digest = Sha256::digest(bytes);
        let mut checksum = [0u8; CHECKSUM_LEN];
        let tail = digest.iter().skip(digest.len() - CHECKSUM_LEN);
        checksum.iter_mut().zip(tail).for_each(|(dst, src)| *dst = *src);
        checksum
    }
}

impl AsRef<[u8]> for NodeId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut payload = self.0.to_vec();
        payload.extend_from_slice(&Self::checksum(&self.0));
        write!(f, "{}{}", NODE_ID_PREFIX, bs58::encode(payload).into_string())
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Errors produced when parsing a textual node id.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NodeIdParseError {
    /// The string does not start with `NodeID-`.
    #[error("missing 'NodeID-' prefix")]
    MissingPrefix,
    /// The body is not valid base58.
    #[error("invalid base58: {0}")]
    Base58(String),
    /// The decoded payload has the wrong length.
    #[error("expected 24 decoded bytes, got {0}")]
    Length(usize),
    /// The checksum does not match.
    #[error("checksum mismatch")]
    Checksum,
}

impl FromStr for NodeId {
    type Err = NodeIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix(NODE_ID_PREFIX)
            .ok_or(NodeIdParseError::MissingPrefix)?;
        let payload = bs58::decode(body)
            .into_vec()
            .map_err(|e| NodeIdParseError::Base58(e.to_string()))?;
        if payload.len() != 20 + CHECKSUM_LEN {
            return Err(NodeIdParseError::Length(payload.len()));
        }
        let (id_bytes, checksum) = payload.split_at(20);
        if checksum != Self::checksum(id_bytes) {
            return Err(NodeIdParseError::Checksum);
        }
        let mut id = [0u8; 20];
        id.copy_from_slice(id_bytes);
        Ok(NodeId(id))
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
