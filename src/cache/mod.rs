//! Cache Module
//!
//! Byte-bounded LRU storage and the owner layer used by the server.

mod list;
mod lru;
mod stats;
mod store;
mod value;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use lru::{entry_size, EvictCallback, LruStore};
pub use stats::CacheStats;
pub use store::CacheStore;
pub use value::{ByteLen, ByteView};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
