// Rate limiting module.
// Provides the shared call limiter and the retry policies it and the clients use.

pub mod policy;
pub mod rate;

pub use policy::{MAX_BACKOFF, RetryOn, RetryPolicy};
pub use rate::RateLimiter;
