//! Network profile definitions.
//!
//! A `NetworkProfile` is the validated, immutable form of one `[[networks]]`
//! entry. Policy knobs are explicit fields with named defaults.

use alloy::primitives::Address;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Substitution token for the project id in remote endpoint templates.
pub const PROJECT_ID_TOKEN: &str = "{project_id}";

/// Upper bound on required confirmations.
pub const MAX_CONFIRMATIONS: u32 = 12;

/// Blocks to wait for a deployment before giving up.
pub const DEFAULT_TIMEOUT_BLOCKS: u64 = 50;

/// Interval between block-height polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 4_000;

/// How a network is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConnectionKind {
    /// A fixed host/port development node with unlocked accounts.
    LocalFixed,
    /// A hosted endpoint that needs a project id and a signing key.
    RemoteAuthenticated,
}

impl std::fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionKind::LocalFixed => write!(f, "local"),
            ConnectionKind::RemoteAuthenticated => write!(f, "remote"),
        }
    }
}

/// Connection parameters for a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Connection {
    LocalFixed {
        host: String,
        port: u16,
    },
    RemoteAuthenticated {
        /// URL containing `{project_id}`.
        endpoint_template: String,
        /// HD account index used to derive the signer.
        derivation_index: u32,
    },
}

/// One deployment target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkProfile {
    pub name: String,
    pub connection: Connection,
    /// Chain/network identifier, unique per registry.
    pub network_id: u64,
    pub required_confirmations: u32,
    pub timeout_blocks: u64,
    pub skip_dry_run: bool,
    pub poll_interval_ms: u64,
    /// Explicit sender; otherwise the signer or first unlocked account.
    pub from: Option<Address>,
    /// Gas limit override.
    pub gas: Option<u64>,
    /// Gas price override in wei.
    pub gas_price: Option<u128>,
}

impl NetworkProfile {
    /// A fixed host/port profile with default policy.
    pub fn local(name: impl Into<String>, host: impl Into<String>, port: u16, network_id: u64) -> Self {
        Self::with_connection(
            name.into(),
            Connection::LocalFixed {
                host: host.into(),
                port,
            },
            network_id,
        )
    }

    /// A remote authenticated profile with default policy.
    pub fn remote(name: impl Into<String>, endpoint_template: impl Into<String>, network_id: u64) -> Self {
        Self::with_connection(
            name.into(),
            Connection::RemoteAuthenticated {
                endpoint_template: endpoint_template.into(),
                derivation_index: 0,
            },
            network_id,
        )
    }

    fn with_connection(name: String, connection: Connection, network_id: u64) -> Self {
        Self {
            name,
            connection,
            network_id,
            required_confirmations: 0,
            timeout_blocks: DEFAULT_TIMEOUT_BLOCKS,
            skip_dry_run: false,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            from: None,
            gas: None,
            gas_price: None,
        }
    }

    pub fn with_confirmations(mut self, confirmations: u32) -> Self {
        self.required_confirmations = confirmations;
        self
    }

    pub fn with_timeout_blocks(mut self, blocks: u64) -> Self {
        self.timeout_blocks = blocks;
        self
    }

    pub fn with_skip_dry_run(mut self, skip: bool) -> Self {
        self.skip_dry_run = skip;
        self
    }

    pub fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Connection style of this profile.
    pub fn kind(&self) -> ConnectionKind {
        match self.connection {
            Connection::LocalFixed { .. } => ConnectionKind::LocalFixed,
            Connection::RemoteAuthenticated { .. } => ConnectionKind::RemoteAuthenticated,
        }
    }

    pub fn requires_authentication(&self) -> bool {
        self.kind() == ConnectionKind::RemoteAuthenticated
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Deployments on this network are final as soon as they are accepted.
    ///
    /// Only local nodes qualify. Remote networks always wait for the receipt,
    /// even with zero required confirmations.
    pub fn has_instant_finality(&self) -> bool {
        self.kind() == ConnectionKind::LocalFixed
    }

    /// Check the profile's invariants.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("name must not be empty"));
        }
        if self.required_confirmations > MAX_CONFIRMATIONS {
            return Err(self.invalid(format!(
                "confirmations {} exceeds maximum of {}",
                self.required_confirmations, MAX_CONFIRMATIONS
            )));
        }
        if self.timeout_blocks == 0 {
            return Err(self.invalid("timeout_blocks must be at least 1"));
        }
        if self.poll_interval_ms == 0 {
            return Err(self.invalid("poll_interval_ms must be at least 1"));
        }
        if self.kind() == ConnectionKind::LocalFixed && self.required_confirmations > 0 {
            return Err(self.invalid(format!(
                "confirmations {} has no effect on a local node",
                self.required_confirmations
            )));
        }

        match &self.connection {
            Connection::LocalFixed { .. } => {
                self.local_endpoint()?;
            }
            Connection::RemoteAuthenticated { endpoint_template, .. } => {
                if !endpoint_template.contains(PROJECT_ID_TOKEN) {
                    return Err(ConfigError::InvalidEndpoint {
                        network: self.name.clone(),
                        reason: format!("endpoint template must contain {}", PROJECT_ID_TOKEN),
                    });
                }
            }
        }
        Ok(())
    }

    /// URL of a LocalFixed node.
    pub fn local_endpoint(&self) -> ConfigResult<Url> {
        let Connection::LocalFixed { host, port } = &self.connection else {
            return Err(self.invalid_endpoint("not a local network"));
        };
        if host.trim().is_empty() {
            return Err(self.invalid_endpoint("host must not be empty"));
        }
        if *port == 0 {
            return Err(self.invalid_endpoint("port must be in 1..=65535"));
        }
        Url::parse(&format!("http://{}:{}", host, port))
            .map_err(|e| self.invalid_endpoint(format!("'{}:{}': {}", host, port, e)))
    }

    /// URL of a RemoteAuthenticated endpoint with the project id filled in.
    ///
    /// Error messages never include the substituted URL.
    pub fn remote_endpoint(&self, project_id: &str) -> ConfigResult<Url> {
        let Connection::RemoteAuthenticated { endpoint_template, .. } = &self.connection else {
            return Err(self.invalid_endpoint("not a remote network"));
        };
        if !endpoint_template.contains(PROJECT_ID_TOKEN) {
            return Err(self.invalid_endpoint(format!(
                "endpoint template must contain {}",
                PROJECT_ID_TOKEN
            )));
        }

        let url = Url::parse(&endpoint_template.replace(PROJECT_ID_TOKEN, project_id))
            .map_err(|e| self.invalid_endpoint(format!("malformed URL: {}", e)))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(self.invalid_endpoint(format!("unsupported scheme '{}'", other)));
            }
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(self.invalid_endpoint("URL has no host"));
        }
        Ok(url)
    }

    fn invalid(&self, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidProfile {
            network: self.name.clone(),
            reason: reason.into(),
        }
    }

    fn invalid_endpoint(&self, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidEndpoint {
            network: self.name.clone(),
            reason: reason.into(),
        }
    }
}
