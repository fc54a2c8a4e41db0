//! Lazy, per-network provider construction.
//!
//! # Responsibilities
//! - Build direct handles for local networks on every call
//! - Build signing handles for remote networks at most once per process
//! - Resolve credentials only when a remote handle is first needed
//!
//! # Concurrency
//! Each remote network gets its own `OnceCell`. The first caller constructs,
//! concurrent callers for the same name await that construction, and callers
//! for other names never wait on it. A failed construction leaves the cell
//! empty; the factory itself never retries.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::blockchain::credentials::CredentialSource;
use crate::blockchain::provider::ProviderHandle;
use crate::error::{ConfigError, CredentialError, DeployerError};
use crate::network::profile::{Connection, NetworkProfile};
use crate::observability::metrics;

type HandleCell = Arc<OnceCell<Arc<ProviderHandle>>>;

/// Errors the factory can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl From<ProviderError> for DeployerError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Config(e) => DeployerError::Config(e),
            ProviderError::Credential(e) => DeployerError::Credential(e),
        }
    }
}

/// Builds and caches provider handles.
pub struct ProviderFactory {
    credentials: Arc<dyn CredentialSource>,
    rpc_timeout: Duration,
    remote: DashMap<String, HandleCell>,
}

impl ProviderFactory {
    pub fn new(credentials: Arc<dyn CredentialSource>, rpc_timeout: Duration) -> Self {
        Self {
            credentials,
            rpc_timeout,
            remote: DashMap::new(),
        }
    }

    /// Get a handle for `profile`.
    pub async fn get(&self, profile: &NetworkProfile) -> Result<Arc<ProviderHandle>, ProviderError> {
        match &profile.connection {
            Connection::LocalFixed { .. } => {
                let url = profile.local_endpoint()?;
                Ok(Arc::new(ProviderHandle::direct(&profile.name, url, self.rpc_timeout)))
            }
            Connection::RemoteAuthenticated { .. } => {
                // Clone the cell out so the map shard is not locked across the await.
                let cell: HandleCell = self
                    .remote
                    .entry(profile.name.clone())
                    .or_default()
                    .clone();

                let handle = cell
                    .get_or_try_init(|| async { self.build_remote(profile) })
                    .await?;
                Ok(handle.clone())
            }
        }
    }

    fn build_remote(&self, profile: &NetworkProfile) -> Result<Arc<ProviderHandle>, ProviderError> {
        let Connection::RemoteAuthenticated { derivation_index, .. } = &profile.connection else {
            return Err(ConfigError::InvalidEndpoint {
                network: profile.name.clone(),
                reason: "not a remote network".to_string(),
            }
            .into());
        };

        let credentials = self.credentials.resolve(&profile.name)?;
        let url = profile.remote_endpoint(credentials.project_id())?;
        let signer = credentials.signer(&profile.name, *derivation_index)?;

        let handle = ProviderHandle::signing(&profile.name, url, signer, self.rpc_timeout);
        tracing::info!(
            network = %profile.name,
            endpoint = %handle.endpoint(),
            signer = ?handle.signer(),
            "Signing provider constructed"
        );
        metrics::record_provider_constructed(&profile.name);

        Ok(Arc::new(handle))
    }

    /// Whether a remote handle for `name` has been built.
    pub fn is_cached(&self, name: &str) -> bool {
        self.remote
            .get(name)
            .map(|cell| cell.initialized())
            .unwrap_or(false)
    }

    /// Drop the cached handle for `name`. Returns whether one was present.
    pub fn dispose(&self, name: &str) -> bool {
        match self.remote.remove(name) {
            Some((_, cell)) => {
                let had_handle = cell.initialized();
                if had_handle {
                    tracing::debug!(network = %name, "Provider disposed");
                }
                had_handle
            }
            None => false,
        }
    }

    /// Drop every cached handle.
    pub fn dispose_all(&self) {
        self.remote.clear();
    }
}

impl std::fmt::Debug for ProviderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderFactory")
            .field("cached", &self.remote.len())
            .field("rpc_timeout", &self.rpc_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::credentials::{Credentials, EnvCredentialSource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

    struct Counting {
        calls: AtomicUsize,
    }

    impl CredentialSource for Counting {
        fn resolve(&self, _network: &str) -> Result<Credentials, CredentialError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Credentials::new(TEST_MNEMONIC, "abc123"))
        }
    }

    fn sepolia() -> NetworkProfile {
        NetworkProfile::remote(
            "sepolia",
            "https://eth-sepolia.g.alchemy.com/v2/{project_id}",
            11155111,
        )
        .with_confirmations(2)
    }

    #[tokio::test]
    async fn test_remote_handle_cached() {
        let source = Arc::new(Counting { calls: AtomicUsize::new(0) });
        let factory = ProviderFactory::new(source.clone(), Duration::from_secs(1));

        let first = factory.get(&sepolia()).await.unwrap();
        let second = factory.get(&sepolia()).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(factory.is_cached("sepolia"));
    }

    #[tokio::test]
    async fn test_local_handle_skips_credentials() {
        let source = Arc::new(Counting { calls: AtomicUsize::new(0) });
        let factory = ProviderFactory::new(source.clone(), Duration::from_secs(1));
        let ganache = NetworkProfile::local("ganache", "10.203.87.226", 7545, 5777);

        let a = factory.get(&ganache).await.unwrap();
        let b = factory.get(&ganache).await.unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert!(!factory.is_cached("ganache"));
    }

    #[tokio::test]
    async fn test_missing_credentials_not_cached() {
        let factory = ProviderFactory::new(
            Arc::new(EnvCredentialSource::from_lookup(|_| None)),
            Duration::from_secs(1),
        );

        let err = factory.get(&sepolia()).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Credential(CredentialError::MissingCredential { .. })
        ));
        assert!(!factory.is_cached("sepolia"));
    }

    #[tokio::test]
    async fn test_invalid_local_port() {
        let factory = ProviderFactory::new(
            Arc::new(EnvCredentialSource::from_lookup(|_| None)),
            Duration::from_secs(1),
        );
        let profile = NetworkProfile::local("ganache", "localhost", 0, 5777);
        assert!(matches!(
            factory.get(&profile).await,
            Err(ProviderError::Config(ConfigError::InvalidEndpoint { .. }))
        ));
    }

    #[tokio::test]
    async fn test_dispose_is_idempotent() {
        let source = Arc::new(Counting { calls: AtomicUsize::new(0) });
        let factory = ProviderFactory::new(source.clone(), Duration::from_secs(1));

        factory.get(&sepolia()).await.unwrap();
        assert!(factory.dispose("sepolia"));
        assert!(!factory.dispose("sepolia"));
        assert!(!factory.dispose("never-built"));

        // Rebuilt on next use.
        factory.get(&sepolia()).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        factory.dispose_all();
        assert!(!factory.is_cached("sepolia"));
    }
}
