//! Multi-network contract deployer.
//!
//! Resolves a named network profile, lazily builds an authenticated provider
//! for it, and enforces the network's completion policy (confirmations,
//! block timeout, dry run) while pushing compiled artifacts.

pub mod blockchain;
pub mod config;
pub mod deployment;
pub mod error;
pub mod lifecycle;
pub mod network;
pub mod observability;
pub mod resilience;

pub use blockchain::ProviderFactory;
pub use config::DeployerConfig;
pub use error::DeployerError;
pub use network::{NetworkProfile, NetworkRegistry};
