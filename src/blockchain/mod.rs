//! Blockchain connection subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (MNEMONIC, PROJECT_ID)
//!     → credentials.rs (presence checks, signer derivation)
//!     → factory.rs (lazy, per-network, exactly-once construction)
//!     → provider.rs (RPC handle with timeouts)
//! ```
//!
//! # Security Constraints
//! - Secrets ONLY from environment variables
//! - Never log secrets or endpoints with the project id substituted
//! - All RPC calls have configurable timeouts

pub mod credentials;
pub mod factory;
pub mod provider;

pub use credentials::{CredentialSource, Credentials, EnvCredentialSource};
pub use factory::{ProviderError, ProviderFactory};
pub use provider::ProviderHandle;
