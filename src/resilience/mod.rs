//! Resilience helpers.
//!
//! # Data Flow
//! ```text
//! Confirmation poll fails (RPC error / timeout):
//!     → backoff.rs (jittered delay before the next poll)
//!     → after rpc.max_poll_failures consecutive failures the error surfaces
//! ```
//!
//! # Design Decisions
//! - Configuration and credential errors are never retried
//! - Provider construction is never retried here; callers decide
//! - Jittered backoff avoids hammering a struggling endpoint

pub mod backoff;
