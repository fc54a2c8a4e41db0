//! Error taxonomy for the deployer.
//!
//! # Categories
//! - `ConfigError`: the declarative input is wrong (setup defect, never retried)
//! - `CredentialError`: secrets missing or unusable (setup defect, never retried)
//! - `DeploymentError`: something went wrong while pushing an artifact to a network
//! - `ArtifactError`: compiled build output could not be read
//!
//! Every variant that relates to a network carries its name.

use alloy::primitives::TxHash;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::loader::LoadError;

/// Errors in the network configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No profile with this name is registered.
    #[error("unknown network '{0}'")]
    UnknownNetwork(String),

    /// A profile with this name is already registered.
    #[error("network '{0}' is already registered")]
    DuplicateNetwork(String),

    /// Two profiles claim the same network id.
    #[error("network '{network}' reuses network id {network_id} (already used by '{existing}')")]
    DuplicateNetworkId {
        network: String,
        network_id: u64,
        existing: String,
    },

    /// The connection parameters do not form a usable endpoint.
    #[error("invalid endpoint for network '{network}': {reason}")]
    InvalidEndpoint { network: String, reason: String },

    /// A policy knob is outside its allowed range.
    #[error("invalid profile '{network}': {reason}")]
    InvalidProfile { network: String, reason: String },

    /// A global setting outside `[[networks]]` is invalid.
    #[error("invalid setting '{setting}': {reason}")]
    InvalidSetting { setting: &'static str, reason: String },
}

/// Errors resolving deployment secrets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// A required environment variable is unset or empty.
    #[error("network '{network}' requires {variable} to be set")]
    MissingCredential {
        network: String,
        variable: &'static str,
    },

    /// The mnemonic could not be turned into a signer.
    #[error("network '{network}': invalid mnemonic: {reason}")]
    InvalidMnemonic { network: String, reason: String },
}

/// Errors while deploying to a network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeploymentError {
    /// The confirmation budget ran out before enough confirmations were observed.
    #[error("deployment to '{network}' timed out after {elapsed_blocks} blocks")]
    DeploymentTimeout { network: String, elapsed_blocks: u64 },

    /// The caller cancelled the wait.
    #[error("deployment to '{network}' was cancelled")]
    DeploymentCancelled { network: String },

    /// The provider refused the transaction.
    #[error("network '{network}' rejected the submission: {reason}")]
    SubmissionRejected { network: String, reason: String },

    /// The pre-submission simulation failed.
    #[error("dry run on '{network}' failed: {reason}")]
    DryRunFailed { network: String, reason: String },

    /// The transaction was mined but reverted.
    #[error("deployment transaction {tx_hash} reverted on '{network}'")]
    Reverted { network: String, tx_hash: TxHash },

    /// The endpoint serves a different chain than the profile declares.
    #[error("network '{network}' expects network id {expected}, endpoint reports {actual}")]
    ChainMismatch {
        network: String,
        expected: u64,
        actual: u64,
    },

    /// RPC failure or timeout.
    #[error("RPC error on '{network}': {reason}")]
    Rpc { network: String, reason: String },
}

/// Errors reading compiled artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("contract '{contract}' has invalid bytecode: {reason}")]
    InvalidBytecode { contract: String, reason: String },

    #[error("no artifact named '{0}'")]
    NotFound(String),
}

/// Top-level error for the CLI and library callers.
#[derive(Debug, Error)]
pub enum DeployerError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Deployment(#[from] DeploymentError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Command output could not be rendered.
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

impl DeployerError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            DeployerError::Config(ConfigError::UnknownNetwork(_)) => 2,
            DeployerError::Credential(CredentialError::MissingCredential { .. }) => 3,
            DeployerError::Deployment(DeploymentError::DeploymentTimeout { .. }) => 4,
            DeployerError::Deployment(DeploymentError::DeploymentCancelled { .. }) => 5,
            DeployerError::Config(_) | DeployerError::Load(_) => 6,
            _ => 1,
        }
    }
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result alias for deployment operations.
pub type DeploymentResult<T> = Result<T, DeploymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let unknown: DeployerError = ConfigError::UnknownNetwork("x".into()).into();
        let missing: DeployerError = CredentialError::MissingCredential {
            network: "sepolia".into(),
            variable: "MNEMONIC",
        }
        .into();
        let timeout: DeployerError = DeploymentError::DeploymentTimeout {
            network: "sepolia".into(),
            elapsed_blocks: 200,
        }
        .into();
        let cancelled: DeployerError = DeploymentError::DeploymentCancelled {
            network: "sepolia".into(),
        }
        .into();

        let codes = [
            unknown.exit_code(),
            missing.exit_code(),
            timeout.exit_code(),
            cancelled.exit_code(),
        ];
        assert_eq!(codes, [2, 3, 4, 5]);
    }

    #[test]
    fn test_render_failure_is_an_error() {
        let source = serde_json::from_str::<u64>("not json").unwrap_err();
        let err = DeployerError::from(source);
        assert!(err.to_string().starts_with("failed to render output"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_invalid_setting_is_a_config_error() {
        let err: DeployerError = ConfigError::InvalidSetting {
            setting: "rpc.timeout_secs",
            reason: "must be at least 1".into(),
        }
        .into();
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn test_error_display_names_network() {
        let err = DeploymentError::DeploymentTimeout {
            network: "sepolia".into(),
            elapsed_blocks: 5,
        };
        assert_eq!(err.to_string(), "deployment to 'sepolia' timed out after 5 blocks");

        let err = CredentialError::MissingCredential {
            network: "sepolia".into(),
            variable: "PROJECT_ID",
        };
        assert!(err.to_string().contains("PROJECT_ID"));
        assert!(err.to_string().contains("sepolia"));
    }
}
