//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stderr (fmt layer, filtered by RUST_LOG or config)
//!     → whatever metrics recorder the embedding process installs
//! ```
//!
//! # Design Decisions
//! - Structured fields (network, contract, tx_hash) instead of formatted strings
//! - Secrets and substituted endpoints are never recorded
//! - Metrics are cheap no-ops when no recorder is installed

pub mod logging;
pub mod metrics;
