//! Connection handles bound to one network profile.
//!
//! # Responsibilities
//! - Wrap an alloy HTTP provider (direct or wallet-signing)
//! - Put a deadline on every RPC call
//! - Serve the deployment routine through `ChainClient`

use alloy::network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use std::fmt::Display;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::deployment::types::{
    ChainClient, ChainObserver, ChainSnapshot, DeployRequest, Inclusion, Submission,
};
use crate::error::{DeploymentError, DeploymentResult};
use crate::network::profile::ConnectionKind;

/// An owned connection to one network.
///
/// Only the `ProviderFactory` builds these.
#[derive(Clone)]
pub struct ProviderHandle {
    network: String,
    kind: ConnectionKind,
    /// Endpoint with credentials stripped, safe to log.
    endpoint: String,
    provider: Arc<dyn Provider + Send + Sync>,
    signer: Option<Address>,
    rpc_timeout: Duration,
}

impl ProviderHandle {
    /// Plain HTTP connection to a development node.
    pub(crate) fn direct(network: &str, url: Url, rpc_timeout: Duration) -> Self {
        let endpoint = url.to_string();
        let provider = Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>;

        Self {
            network: network.to_string(),
            kind: ConnectionKind::LocalFixed,
            endpoint,
            provider,
            signer: None,
            rpc_timeout,
        }
    }

    /// Connection that signs locally with `signer`.
    pub(crate) fn signing(network: &str, url: Url, signer: PrivateKeySigner, rpc_timeout: Duration) -> Self {
        let endpoint = redact(&url);
        let address = signer.address();
        let provider = Arc::new(
            ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_http(url),
        ) as Arc<dyn Provider + Send + Sync>;

        Self {
            network: network.to_string(),
            kind: ConnectionKind::RemoteAuthenticated,
            endpoint,
            provider,
            signer: Some(address),
            rpc_timeout,
        }
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn kind(&self) -> ConnectionKind {
        self.kind
    }

    /// Endpoint description without secrets.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Address of the local signer, if this handle signs.
    pub fn signer(&self) -> Option<Address> {
        self.signer
    }

    /// Get the underlying provider.
    pub fn provider(&self) -> &(dyn Provider + Send + Sync) {
        self.provider.as_ref()
    }

    async fn rpc<T, E, F>(&self, method: &str, call: F) -> DeploymentResult<T>
    where
        E: Display,
        F: IntoFuture<Output = Result<T, E>>,
    {
        match timeout(self.rpc_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(DeploymentError::Rpc {
                network: self.network.clone(),
                reason: format!("{}: {}", method, e),
            }),
            Err(_) => Err(DeploymentError::Rpc {
                network: self.network.clone(),
                reason: format!("{}: timed out after {:?}", method, self.rpc_timeout),
            }),
        }
    }

    /// Sender for a request: explicit, then signer, then first unlocked account.
    async fn resolve_sender(&self, from: Option<Address>) -> DeploymentResult<Address> {
        if let Some(address) = from.or(self.signer) {
            return Ok(address);
        }

        let accounts = self.rpc("eth_accounts", self.provider.get_accounts()).await?;
        accounts.first().copied().ok_or_else(|| DeploymentError::SubmissionRejected {
            network: self.network.clone(),
            reason: "node exposes no unlocked accounts and no sender is configured".to_string(),
        })
    }

    fn build_tx(&self, from: Address, request: &DeployRequest) -> TransactionRequest {
        let mut tx = TransactionRequest::default()
            .with_from(from)
            .with_deploy_code(request.bytecode.clone());
        if let Some(gas) = request.gas {
            tx = tx.with_gas_limit(gas);
        }
        if let Some(gas_price) = request.gas_price {
            tx = tx.with_gas_price(gas_price);
        }
        tx
    }
}

impl ChainObserver for ProviderHandle {
    async fn snapshot(&self, tx_hash: TxHash) -> DeploymentResult<ChainSnapshot> {
        let block_number = self
            .rpc("eth_blockNumber", self.provider.get_block_number())
            .await?;
        let receipt = self
            .rpc(
                "eth_getTransactionReceipt",
                self.provider.get_transaction_receipt(tx_hash),
            )
            .await?;

        let inclusion = receipt.and_then(|r| {
            r.block_number.map(|mined_at| Inclusion {
                block_number: mined_at,
                contract_address: r.contract_address,
                success: r.status(),
            })
        });

        Ok(ChainSnapshot {
            block_number,
            inclusion,
        })
    }
}

impl ChainClient for ProviderHandle {
    async fn chain_id(&self) -> DeploymentResult<u64> {
        self.rpc("eth_chainId", self.provider.get_chain_id()).await
    }

    async fn simulate(&self, request: &DeployRequest) -> DeploymentResult<u64> {
        let from = self.resolve_sender(request.from).await?;
        let tx = self.build_tx(from, request);

        match timeout(self.rpc_timeout, self.provider.estimate_gas(tx)).await {
            Ok(Ok(gas)) => Ok(gas),
            Ok(Err(e)) => Err(DeploymentError::DryRunFailed {
                network: self.network.clone(),
                reason: e.to_string(),
            }),
            Err(_) => Err(DeploymentError::Rpc {
                network: self.network.clone(),
                reason: format!("eth_estimateGas: timed out after {:?}", self.rpc_timeout),
            }),
        }
    }

    async fn submit(&self, request: DeployRequest) -> DeploymentResult<Submission> {
        let from = self.resolve_sender(request.from).await?;
        let tx = self.build_tx(from, &request);
        let block_number = self
            .rpc("eth_blockNumber", self.provider.get_block_number())
            .await?;

        let pending = match timeout(self.rpc_timeout, self.provider.send_transaction(tx)).await {
            Ok(Ok(pending)) => pending,
            Ok(Err(e)) => {
                return Err(DeploymentError::SubmissionRejected {
                    network: self.network.clone(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(DeploymentError::Rpc {
                    network: self.network.clone(),
                    reason: format!("eth_sendTransaction: timed out after {:?}", self.rpc_timeout),
                });
            }
        };

        let tx_hash = *pending.tx_hash();
        tracing::info!(
            network = %self.network,
            contract = %request.contract,
            tx_hash = %tx_hash,
            from = %from,
            block = block_number,
            "Deployment transaction accepted"
        );

        Ok(Submission {
            tx_hash,
            block_number,
        })
    }
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("network", &self.network)
            .field("kind", &self.kind)
            .field("endpoint", &self.endpoint)
            .field("signer", &self.signer)
            .field("timeout", &self.rpc_timeout)
            .finish()
    }
}

/// Keep scheme and host; drop the path, which carries the project id.
fn redact(url: &Url) -> String {
    format!("{}://{}/…", url.scheme(), url.host_str().unwrap_or_default())
}
