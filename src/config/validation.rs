//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Turn each `[[networks]]` entry into a `NetworkProfile`
//! - Check value ranges and uniqueness by registering every profile
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: DeployerConfig → Result<NetworkRegistry, Vec<ConfigError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;

use crate::config::schema::{DeployerConfig, NetworkConfig};
use crate::error::{ConfigError, ConfigResult};
use crate::network::profile::{Connection, NetworkProfile};
use crate::network::registry::NetworkRegistry;

/// Validate the whole document and build the registry.
pub fn validate_config(config: &DeployerConfig) -> Result<NetworkRegistry, Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut registry = NetworkRegistry::new();

    if config.rpc.timeout_secs == 0 {
        errors.push(ConfigError::InvalidSetting {
            setting: "rpc.timeout_secs",
            reason: "must be at least 1".to_string(),
        });
    }

    for network in &config.networks {
        let result = to_profile(network).and_then(|profile| registry.register(profile));
        if let Err(e) = result {
            errors.push(e);
        }
    }

    if errors.is_empty() {
        Ok(registry)
    } else {
        Err(errors)
    }
}

/// Convert a raw entry into a profile. Range checks happen at registration.
pub fn to_profile(network: &NetworkConfig) -> ConfigResult<NetworkProfile> {
    let connection = match (&network.host, network.port, &network.endpoint) {
        (Some(host), Some(port), None) => Connection::LocalFixed {
            host: host.clone(),
            port,
        },
        (None, None, Some(endpoint)) => Connection::RemoteAuthenticated {
            endpoint_template: endpoint.clone(),
            derivation_index: network.derivation_index,
        },
        (_, _, Some(_)) => {
            return Err(ConfigError::InvalidEndpoint {
                network: network.name.clone(),
                reason: "set either host/port or endpoint, not both".to_string(),
            });
        }
        _ => {
            return Err(ConfigError::InvalidEndpoint {
                network: network.name.clone(),
                reason: "host and port (or endpoint) are required".to_string(),
            });
        }
    };

    let from = match &network.from {
        Some(raw) => Some(raw.parse::<Address>().map_err(|e| ConfigError::InvalidProfile {
            network: network.name.clone(),
            reason: format!("invalid from address '{}': {}", raw, e),
        })?),
        None => None,
    };

    Ok(NetworkProfile {
        name: network.name.clone(),
        connection,
        network_id: network.network_id,
        required_confirmations: network.confirmations,
        timeout_blocks: network.timeout_blocks,
        skip_dry_run: network.skip_dry_run,
        poll_interval_ms: network.poll_interval_ms,
        from,
        gas: network.gas,
        gas_price: network.gas_price.map(u128::from),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> DeployerConfig {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn test_valid_document() {
        let config = parse(
            r#"
            [[networks]]
            name = "ganache"
            host = "10.203.87.226"
            port = 7545
            network_id = 5777

            [[networks]]
            name = "sepolia"
            endpoint = "https://eth-sepolia.g.alchemy.com/v2/{project_id}"
            network_id = 11155111
            confirmations = 2
            timeout_blocks = 200
            skip_dry_run = true
            "#,
        );

        let registry = validate_config(&config).unwrap();
        assert_eq!(registry.list(), vec!["ganache", "sepolia"]);

        let sepolia = registry.lookup("sepolia").unwrap();
        assert_eq!(sepolia.required_confirmations, 2);
        assert_eq!(sepolia.timeout_blocks, 200);
        assert!(sepolia.skip_dry_run);
    }

    #[test]
    fn test_collects_all_errors() {
        let config = parse(
            r#"
            [[networks]]
            name = "no-connection"
            network_id = 1

            [[networks]]
            name = "too-many-confirmations"
            host = "localhost"
            port = 8545
            network_id = 2
            confirmations = 64

            [[networks]]
            name = "bad-from"
            host = "localhost"
            port = 8546
            network_id = 3
            from = "not-an-address"
            "#,
        );

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ConfigError::InvalidEndpoint { .. }));
        assert!(matches!(errors[1], ConfigError::InvalidProfile { .. }));
        assert!(matches!(errors[2], ConfigError::InvalidProfile { .. }));
    }

    #[test]
    fn test_both_connection_styles_rejected() {
        let config = parse(
            r#"
            [[networks]]
            name = "confused"
            host = "localhost"
            port = 8545
            endpoint = "https://example.com/{project_id}"
            network_id = 1
            "#,
        );
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ConfigError::InvalidEndpoint { ref network, .. } if network == "confused"));
    }

    #[test]
    fn test_duplicates_reported() {
        let config = parse(
            r#"
            [[networks]]
            name = "dev"
            host = "localhost"
            port = 8545
            network_id = 1337

            [[networks]]
            name = "dev"
            host = "localhost"
            port = 8546
            network_id = 1338
            "#,
        );
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ConfigError::DuplicateNetwork("dev".into())]);
    }

    #[test]
    fn test_rpc_timeout_is_a_global_setting() {
        let config = parse(
            r#"
            [rpc]
            timeout_secs = 0
            "#,
        );
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigError::InvalidSetting {
                setting: "rpc.timeout_secs",
                reason: "must be at least 1".into(),
            }]
        );
        assert_eq!(errors[0].to_string(), "invalid setting 'rpc.timeout_secs': must be at least 1");
    }

    #[test]
    fn test_local_confirmations_not_dropped_silently() {
        let config = parse(
            r#"
            [[networks]]
            name = "ganache"
            host = "127.0.0.1"
            port = 7545
            network_id = 5777
            confirmations = 2
            "#,
        );
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ConfigError::InvalidProfile { ref network, .. } if network == "ganache"));
    }
}
