//! Deployment subsystem.
//!
//! # Data Flow
//! ```text
//! build directory
//!     → artifact.rs (contractName + bytecode)
//!     → deployer.rs (verify network id, dry run unless skipped, submit)
//!     → policy.rs (Submitted → Confirming → Confirmed | TimedOut)
//!     → DeploymentReceipt
//! ```
//!
//! # Design Decisions
//! - The chain is reached only through the `ChainClient` seam (types.rs)
//! - Polling is the only background wait and is always cancellable
//! - Timeouts are reported, never silently extended

pub mod artifact;
pub mod deployer;
pub mod policy;
pub mod types;

pub use artifact::Artifact;
pub use deployer::{DeployOptions, Deployer, DeploymentOutcome};
pub use policy::{CompletionPolicy, DeploymentPolicyEnforcer, DeploymentState};
pub use types::{ChainClient, ChainObserver, ChainSnapshot, DeployRequest, DeploymentReceipt, Inclusion, Submission};
