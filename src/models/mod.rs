//! Request and Response models for the cache server API
//!
//! DTOs serialized to and from HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::SetRequest;
pub use responses::{
    DeleteResponse, ErrorResponse, EvictResponse, GetResponse, HealthResponse, SetResponse,
    StatsResponse,
};
