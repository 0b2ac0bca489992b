//! Rate Limiting Implementation
//!
//! Token bucket shared by all workers of a batch

mod limiter;
mod types;


pub use limiter::RateLimiter;
