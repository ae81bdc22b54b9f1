//! bytecache - A byte-bounded in-memory LRU cache
//!
//! The core is [`cache::LruStore`], which evicts least recently used entries
//! once the total size of keys and values exceeds a byte budget. Around it
//! sit an owner layer with statistics, a small HTTP API and the contracts a
//! distributed layer would implement to fetch values from peers.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod peers;

pub use api::AppState;
pub use cache::{ByteLen, ByteView, LruStore};
pub use config::Config;
