//! Retry and pacing layer
//!
//! Every higher component funnels transient failures through
//! [`RetryPolicy`] and spaces its page interactions with [`BehaviorPacer`].
//! Both draw their delays from uniform ranges so the traffic tempo never
//! settles into a fixed rhythm.

pub mod errors;
pub mod pacer;
pub mod retry;

pub use errors::RetryError;
pub use pacer::BehaviorPacer;
pub use retry::RetryPolicy;
