//! Configuration schema definitions.
//!
//! This module defines the on-disk structure of `deployer.toml`.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::network::profile::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_BLOCKS};

/// Root configuration for the deployer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeployerConfig {
    /// Directory holding compiled contract artifacts.
    pub contracts_build_directory: PathBuf,

    /// Network definitions, in declaration order.
    pub networks: Vec<NetworkConfig>,

    /// Compiler settings (informational).
    pub compilers: CompilerConfig,

    /// RPC behaviour shared by all networks.
    pub rpc: RpcConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self {
            contracts_build_directory: PathBuf::from("./build/contracts"),
            networks: Vec::new(),
            compilers: CompilerConfig::default(),
            rpc: RpcConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// A single `[[networks]]` entry as written by the user.
///
/// Either `host` + `port` or `endpoint` must be given.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Unique network name used on the command line.
    pub name: String,

    /// Host of a local development node.
    #[serde(default)]
    pub host: Option<String>,

    /// Port of a local development node.
    #[serde(default)]
    pub port: Option<u16>,

    /// Remote endpoint template containing `{project_id}`.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Network id the endpoint must report.
    pub network_id: u64,

    /// Confirmations to wait for after a deployment is mined.
    #[serde(default)]
    pub confirmations: u32,

    /// Blocks to wait before a deployment times out.
    #[serde(default = "default_timeout_blocks")]
    pub timeout_blocks: u64,

    /// Skip the simulated execution before submission.
    #[serde(default)]
    pub skip_dry_run: bool,

    /// Block-height polling interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Sender address override.
    #[serde(default)]
    pub from: Option<String>,

    /// Gas limit override.
    #[serde(default)]
    pub gas: Option<u64>,

    /// Gas price override in wei.
    #[serde(default)]
    pub gas_price: Option<u64>,

    /// HD account index for mnemonic-derived signers.
    #[serde(default)]
    pub derivation_index: u32,
}

fn default_timeout_blocks() -> u64 {
    DEFAULT_TIMEOUT_BLOCKS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Compiler configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub solc: SolcConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SolcConfig {
    /// Solidity compiler version the artifacts were built with.
    pub version: String,
}

impl Default for SolcConfig {
    fn default() -> Self {
        Self {
            version: "0.8.19".to_string(),
        }
    }
}

/// RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Consecutive poll failures tolerated before a deployment fails.
    pub max_poll_failures: u32,

    /// Base delay for poll-failure backoff in milliseconds.
    pub backoff_base_ms: u64,

    /// Maximum delay for poll-failure backoff in milliseconds.
    pub backoff_max_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_poll_failures: 5,
            backoff_base_ms: 250,
            backoff_max_ms: 5_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
