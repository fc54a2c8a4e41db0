//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! deployer.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, profiles registered)
//!     → LoadedConfig { settings, registry } (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is pure data; secrets are never read here
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, LoadError, LoadedConfig};
pub use schema::DeployerConfig;
pub use schema::NetworkConfig;
pub use schema::RpcConfig;
