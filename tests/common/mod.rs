//! Shared fixtures for integration tests.

#![allow(dead_code)]

use alloy::primitives::{Address, TxHash};
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};

use chain_deployer::blockchain::{CredentialSource, Credentials};
use chain_deployer::deployment::{ChainClient, ChainObserver, ChainSnapshot, DeployRequest, Inclusion, Submission};
use chain_deployer::error::{CredentialError, DeploymentError, DeploymentResult};
use chain_deployer::network::{NetworkProfile, NetworkRegistry};
use chain_deployer::resilience::backoff::BackoffPolicy;

pub const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

pub fn deployed_at() -> Address {
    Address::repeat_byte(0xcc)
}

/// Local development node: instant finality.
pub fn ganache() -> NetworkProfile {
    NetworkProfile::local("ganache", "10.203.87.226", 7545, 5777).with_poll_interval_ms(1)
}

/// Remote testnet: two confirmations, dry run skipped.
pub fn sepolia() -> NetworkProfile {
    NetworkProfile::remote("sepolia", "https://sepolia.infura.io/v3/{project_id}", 11155111)
        .with_confirmations(2)
        .with_timeout_blocks(200)
        .with_skip_dry_run(true)
        .with_poll_interval_ms(1)
}

pub fn goerli() -> NetworkProfile {
    NetworkProfile::remote("goerli", "https://goerli.infura.io/v3/{project_id}", 5)
        .with_confirmations(1)
        .with_poll_interval_ms(1)
}

pub fn registry() -> NetworkRegistry {
    let mut registry = NetworkRegistry::new();
    registry.register(ganache()).unwrap();
    registry.register(sepolia()).unwrap();
    registry.register(goerli()).unwrap();
    registry
}

/// Backoff short enough for tests.
pub fn fast_backoff(max_failures: u32) -> BackoffPolicy {
    BackoffPolicy {
        base_ms: 1,
        max_ms: 2,
        max_failures,
    }
}

/// Credential source that counts resolutions.
pub struct CountingSource {
    pub calls: AtomicUsize,
    credentials: Option<Credentials>,
}

impl CountingSource {
    pub fn valid() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            credentials: Some(Credentials::new(TEST_MNEMONIC, "abc123")),
        }
    }

    pub fn empty() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            credentials: None,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CredentialSource for CountingSource {
    fn resolve(&self, network: &str) -> Result<Credentials, CredentialError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.credentials
            .clone()
            .ok_or_else(|| CredentialError::MissingCredential {
                network: network.to_string(),
                variable: "MNEMONIC",
            })
    }
}

/// Scripted chain. Every snapshot mines one new block.
pub struct MockChain {
    network: String,
    chain_id: u64,
    head: AtomicU64,
    submitted_at: AtomicU64,
    /// Blocks after submission at which the transaction is mined.
    mined_after: Option<u64>,
    reverted: bool,
    simulate_fails: bool,
    failing_polls: AtomicU32,
    pub simulate_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub snapshot_calls: AtomicUsize,
}

impl MockChain {
    pub fn new(network: &str, chain_id: u64) -> Self {
        Self {
            network: network.to_string(),
            chain_id,
            head: AtomicU64::new(100),
            submitted_at: AtomicU64::new(0),
            mined_after: Some(1),
            reverted: false,
            simulate_fails: false,
            failing_polls: AtomicU32::new(0),
            simulate_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            snapshot_calls: AtomicUsize::new(0),
        }
    }

    pub fn for_profile(profile: &NetworkProfile) -> Self {
        Self::new(&profile.name, profile.network_id)
    }

    pub fn mined_after(mut self, blocks: u64) -> Self {
        self.mined_after = Some(blocks);
        self
    }

    /// Never mine the transaction.
    pub fn stalled(mut self) -> Self {
        self.mined_after = None;
        self
    }

    pub fn reverting(mut self) -> Self {
        self.reverted = true;
        self
    }

    pub fn failing_simulation(mut self) -> Self {
        self.simulate_fails = true;
        self
    }

    /// Fail the next `count` snapshot calls.
    pub fn with_failing_polls(self, count: u32) -> Self {
        self.failing_polls.store(count, Ordering::SeqCst);
        self
    }

    pub fn simulate_calls(&self) -> usize {
        self.simulate_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn snapshot_calls(&self) -> usize {
        self.snapshot_calls.load(Ordering::SeqCst)
    }
}

impl ChainObserver for MockChain {
    async fn snapshot(&self, _tx_hash: TxHash) -> DeploymentResult<ChainSnapshot> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failing_polls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(DeploymentError::Rpc {
                network: self.network.clone(),
                reason: "connection reset".to_string(),
            });
        }

        let head = self.head.fetch_add(1, Ordering::SeqCst) + 1;
        let submitted_at = self.submitted_at.load(Ordering::SeqCst);
        let inclusion = self.mined_after.and_then(|after| {
            let mined = submitted_at + after;
            (head >= mined).then_some(Inclusion {
                block_number: mined,
                contract_address: Some(deployed_at()),
                success: !self.reverted,
            })
        });

        Ok(ChainSnapshot {
            block_number: head,
            inclusion,
        })
    }
}

impl ChainClient for MockChain {
    async fn chain_id(&self) -> DeploymentResult<u64> {
        Ok(self.chain_id)
    }

    async fn simulate(&self, request: &DeployRequest) -> DeploymentResult<u64> {
        self.simulate_calls.fetch_add(1, Ordering::SeqCst);
        if self.simulate_fails {
            return Err(DeploymentError::DryRunFailed {
                network: self.network.clone(),
                reason: format!("{} constructor reverted", request.contract),
            });
        }
        Ok(21_000 + request.bytecode.len() as u64 * 200)
    }

    async fn submit(&self, _request: DeployRequest) -> DeploymentResult<Submission> {
        let nonce = self.submit_calls.fetch_add(1, Ordering::SeqCst) as u8;
        let head = self.head.load(Ordering::SeqCst);
        self.submitted_at.store(head, Ordering::SeqCst);
        Ok(Submission {
            tx_hash: TxHash::repeat_byte(0xa0 | (nonce & 0x0f)),
            block_number: head,
        })
    }
}
