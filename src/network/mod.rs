//! Network profiles and the registry that owns them.
//!
//! # Data Flow
//! ```text
//! deployer.toml [[networks]]
//!     → config::validation (NetworkConfig → NetworkProfile)
//!     → registry.rs (ordered, name-keyed, immutable)
//!     → lookup(name) by the CLI / deployment routine
//! ```
//!
//! # Design Decisions
//! - Declaration order is preserved for reproducible listings
//! - Profiles never touch the environment; secrets are resolved later by the factory
//! - Invariants are checked once, at registration

pub mod profile;
pub mod registry;

pub use profile::{Connection, ConnectionKind, NetworkProfile};
pub use registry::NetworkRegistry;
