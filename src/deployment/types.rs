//! Deployment types and the chain seam.

use alloy::primitives::{Address, Bytes, TxHash};
use serde::Serialize;
use std::future::Future;

use crate::error::DeploymentResult;

/// A contract-creation transaction waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    /// Contract name, for logs and receipts.
    pub contract: String,
    /// Creation bytecode.
    pub bytecode: Bytes,
    /// Sender override.
    pub from: Option<Address>,
    /// Gas limit override.
    pub gas: Option<u64>,
    /// Gas price override in wei.
    pub gas_price: Option<u128>,
}

/// A transaction the provider accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub tx_hash: TxHash,
    /// Block height when the provider accepted the transaction.
    pub block_number: u64,
}

/// Where a transaction landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inclusion {
    pub block_number: u64,
    pub contract_address: Option<Address>,
    /// Receipt status (false = reverted).
    pub success: bool,
}

/// Chain state relevant to one pending transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainSnapshot {
    /// Current head block.
    pub block_number: u64,
    /// Inclusion of the transaction, if it is currently mined.
    pub inclusion: Option<Inclusion>,
}

/// Outcome of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentReceipt {
    pub network: String,
    pub contract: String,
    pub tx_hash: TxHash,
    pub contract_address: Option<Address>,
    pub block_number: Option<u64>,
    pub confirmations: u32,
}

/// Read access to chain progress for a submitted transaction.
pub trait ChainObserver: Send + Sync {
    /// Current head and the transaction's inclusion.
    fn snapshot(&self, tx_hash: TxHash) -> impl Future<Output = DeploymentResult<ChainSnapshot>> + Send;
}

/// Everything the deployment routine needs from a connection.
pub trait ChainClient: ChainObserver {
    /// Network id reported by the endpoint.
    fn chain_id(&self) -> impl Future<Output = DeploymentResult<u64>> + Send;

    /// Simulate the deployment; returns the estimated gas.
    fn simulate(&self, request: &DeployRequest) -> impl Future<Output = DeploymentResult<u64>> + Send;

    /// Send the deployment transaction.
    fn submit(&self, request: DeployRequest) -> impl Future<Output = DeploymentResult<Submission>> + Send;
}
