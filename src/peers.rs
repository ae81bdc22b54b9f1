//! Peer Contracts
//!
//! Interfaces a distributed layer implements to locate the peer that owns a
//! key and to fetch values from it. The cache never calls these itself.
//!
//! Requests and responses travel as opaque bytes; [`FetchRequest::encode`]
//! and friends give a transport a ready-made encoding without tying the
//! contracts to it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// == Peer Error ==
/// Failure of a remote fetch. Passed through to the caller untouched.
#[derive(Error, Debug)]
pub enum PeerError {
    /// The peer could not be reached or the connection failed
    #[error("transport error: {0}")]
    Transport(String),

    /// The peer answered with an error
    #[error("peer returned error: {0}")]
    Remote(String),

    /// A message could not be encoded or decoded
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

// == Wire Messages ==
/// Request for one key of a cache group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub group: String,
    pub key: String,
}

impl FetchRequest {
    pub fn new(group: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, PeerError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PeerError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Value bytes returned by a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResponse {
    pub value: Vec<u8>,
}

impl FetchResponse {
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, PeerError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PeerError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

// == Peer Traits ==
/// Fetches values from one remote peer.
pub trait PeerGetter: Send + Sync {
    fn get(&self, request: &FetchRequest) -> Result<FetchResponse, PeerError>;
}

/// Chooses the peer responsible for a key.
///
/// Must be a pure function of the key and the picker's current topology.
/// `None` means the key should be served locally.
pub trait PeerPicker: Send + Sync {
    fn pick_peer(&self, key: &str) -> Option<&dyn PeerGetter>;
}
