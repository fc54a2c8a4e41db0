//! Deployment secrets and signer derivation.
//!
//! # Security
//! - Secrets are loaded ONLY from environment variables
//! - Secrets are never logged or serialized
//! - Presence is checked when a remote network is actually targeted

use alloy::signers::local::coins_bip39::English;
use alloy::signers::local::{MnemonicBuilder, PrivateKeySigner};

use crate::error::CredentialError;

/// Environment variable holding the HD wallet mnemonic.
pub const MNEMONIC_ENV_VAR: &str = "MNEMONIC";

/// Environment variable holding the endpoint provider's project id.
pub const PROJECT_ID_ENV_VAR: &str = "PROJECT_ID";

/// Resolved secrets for remote deployments.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    mnemonic: String,
    project_id: String,
}

impl Credentials {
    pub fn new(mnemonic: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            project_id: project_id.into(),
        }
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Derive the signing key at `m/44'/60'/0'/0/{index}`.
    pub fn signer(&self, network: &str, index: u32) -> Result<PrivateKeySigner, CredentialError> {
        let invalid = |e: alloy::signers::local::LocalSignerError| CredentialError::InvalidMnemonic {
            network: network.to_string(),
            reason: e.to_string(),
        };

        MnemonicBuilder::<English>::default()
            .phrase(self.mnemonic.trim())
            .index(index)
            .map_err(invalid)?
            .build()
            .map_err(invalid)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("mnemonic", &"<redacted>")
            .field("project_id", &"<redacted>")
            .finish()
    }
}

/// Supplies credentials to the provider factory.
///
/// Only consulted when a remote authenticated provider is first built.
pub trait CredentialSource: Send + Sync {
    /// Return credentials for `network`, or the first missing variable.
    fn resolve(&self, network: &str) -> Result<Credentials, CredentialError>;
}

/// Credentials captured from the process environment.
#[derive(Clone, Default)]
pub struct EnvCredentialSource {
    mnemonic: Option<String>,
    project_id: Option<String>,
}

impl EnvCredentialSource {
    /// Read `MNEMONIC` and `PROJECT_ID` from the environment.
    ///
    /// Absence is not an error here; it is reported by `resolve`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the variables through an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            mnemonic: lookup(MNEMONIC_ENV_VAR),
            project_id: lookup(PROJECT_ID_ENV_VAR),
        }
    }
}

impl CredentialSource for EnvCredentialSource {
    fn resolve(&self, network: &str) -> Result<Credentials, CredentialError> {
        let require = |value: &Option<String>, variable: &'static str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| CredentialError::MissingCredential {
                    network: network.to_string(),
                    variable,
                })
        };

        let mnemonic = require(&self.mnemonic, MNEMONIC_ENV_VAR)?;
        let project_id = require(&self.project_id, PROJECT_ID_ENV_VAR)?;
        Ok(Credentials::new(mnemonic, project_id))
    }
}

impl std::fmt::Debug for EnvCredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvCredentialSource")
            .field("mnemonic_set", &self.mnemonic.is_some())
            .field("project_id_set", &self.project_id.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // Well-known development mnemonic (Anvil/Hardhat default accounts)
    const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

    fn source(vars: &[(&str, &str)]) -> EnvCredentialSource {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvCredentialSource::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_resolve_present() {
        let src = source(&[(MNEMONIC_ENV_VAR, TEST_MNEMONIC), (PROJECT_ID_ENV_VAR, "abc123")]);
        let creds = src.resolve("sepolia").unwrap();
        assert_eq!(creds.project_id(), "abc123");
        assert_eq!(creds.mnemonic(), TEST_MNEMONIC);
    }

    #[test]
    fn test_missing_mnemonic() {
        let src = source(&[(PROJECT_ID_ENV_VAR, "abc123")]);
        assert_eq!(
            src.resolve("sepolia").unwrap_err(),
            CredentialError::MissingCredential {
                network: "sepolia".into(),
                variable: MNEMONIC_ENV_VAR,
            }
        );
    }

    #[test]
    fn test_empty_project_id_is_missing() {
        let src = source(&[(MNEMONIC_ENV_VAR, TEST_MNEMONIC), (PROJECT_ID_ENV_VAR, "   ")]);
        assert!(matches!(
            src.resolve("sepolia"),
            Err(CredentialError::MissingCredential { variable: PROJECT_ID_ENV_VAR, .. })
        ));
    }

    #[test]
    fn test_signer_derivation() {
        let creds = Credentials::new(TEST_MNEMONIC, "abc123");
        let signer = creds.signer("sepolia", 0).unwrap();
        assert_eq!(
            signer.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );

        let second = creds.signer("sepolia", 1).unwrap();
        assert_eq!(
            second.address().to_string().to_lowercase(),
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
        );
    }

    #[test]
    fn test_invalid_mnemonic() {
        let creds = Credentials::new("definitely not a mnemonic", "abc123");
        assert!(matches!(
            creds.signer("sepolia", 0),
            Err(CredentialError::InvalidMnemonic { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::new(TEST_MNEMONIC, "abc123");
        let text = format!("{:?}", creds);
        assert!(!text.contains("junk"));
        assert!(!text.contains("abc123"));
    }
}
