//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Cancellation (cancel.rs):
//!     Cancellation::trigger → every CancelToken observes it → poll loops abort
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl-C) → Cancellation::trigger
//! ```
//!
//! # Design Decisions
//! - Cancellation is level-triggered: tokens created after the trigger still see it
//! - A dropped `Cancellation` never cancels anything

pub mod cancel;
pub mod signals;

pub use cancel::{CancelToken, Cancellation};
