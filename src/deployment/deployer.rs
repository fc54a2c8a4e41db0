//! Deployment routine.
//!
//! # Responsibilities
//! - Check the endpoint serves the profile's network
//! - Honour the profile's dry-run policy before submission
//! - Submit each artifact and drive the completion policy
//! - Report receipts (or the typed failure) per attempt

use tracing::Instrument;
use uuid::Uuid;

use crate::deployment::artifact::Artifact;
use crate::deployment::policy::{CompletionPolicy, Confirmation, DeploymentPolicyEnforcer, DeploymentState};
use crate::deployment::types::{ChainClient, DeployRequest, DeploymentReceipt};
use crate::error::{DeploymentError, DeploymentResult};
use crate::lifecycle::cancel::CancelToken;
use crate::network::profile::NetworkProfile;
use crate::observability::metrics;
use crate::resilience::backoff::BackoffPolicy;

/// Knobs for a deployment run.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeployOptions {
    /// Simulate only; never submit.
    pub dry_run_only: bool,
    /// Backoff for transient poll failures.
    pub backoff: BackoffPolicy,
}

/// What happened to one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentOutcome {
    /// Dry-run-only mode: the simulation succeeded.
    Simulated { contract: String, gas: u64 },
    /// Submitted and confirmed.
    Deployed(DeploymentReceipt),
}

/// Pushes artifacts to one network through a `ChainClient`.
#[derive(Debug, Clone, Default)]
pub struct Deployer {
    options: DeployOptions,
}

impl Deployer {
    pub fn new(options: DeployOptions) -> Self {
        Self { options }
    }

    /// Fail unless the endpoint reports the profile's network id.
    pub async fn verify_network<C: ChainClient>(&self, profile: &NetworkProfile, client: &C) -> DeploymentResult<()> {
        let actual = client.chain_id().await?;
        if actual != profile.network_id {
            return Err(DeploymentError::ChainMismatch {
                network: profile.name.clone(),
                expected: profile.network_id,
                actual,
            });
        }
        tracing::debug!(network = %profile.name, network_id = actual, "Network id verified");
        Ok(())
    }

    /// Deploy `artifacts` in order, stopping at the first failure.
    pub async fn deploy_all<C: ChainClient>(
        &self,
        profile: &NetworkProfile,
        client: &C,
        artifacts: &[Artifact],
        cancel: CancelToken,
    ) -> DeploymentResult<Vec<DeploymentOutcome>> {
        self.verify_network(profile, client).await?;

        let mut outcomes = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            if cancel.is_cancelled() {
                return Err(DeploymentError::DeploymentCancelled {
                    network: profile.name.clone(),
                });
            }
            outcomes.push(self.deploy(profile, client, artifact, cancel.clone()).await?);
        }
        Ok(outcomes)
    }

    /// Deploy a single artifact.
    pub async fn deploy<C: ChainClient>(
        &self,
        profile: &NetworkProfile,
        client: &C,
        artifact: &Artifact,
        cancel: CancelToken,
    ) -> DeploymentResult<DeploymentOutcome> {
        let attempt = Uuid::new_v4();
        let span = tracing::info_span!(
            "deploy",
            network = %profile.name,
            contract = %artifact.name,
            %attempt
        );

        let result = self.attempt(profile, client, artifact, cancel).instrument(span).await;
        match &result {
            Ok(DeploymentOutcome::Simulated { .. }) => metrics::record_deployment_outcome(&profile.name, "simulated"),
            Ok(DeploymentOutcome::Deployed(_)) => metrics::record_deployment_outcome(&profile.name, "confirmed"),
            Err(e) => metrics::record_deployment_outcome(&profile.name, outcome_label(e)),
        }
        result
    }

    async fn attempt<C: ChainClient>(
        &self,
        profile: &NetworkProfile,
        client: &C,
        artifact: &Artifact,
        cancel: CancelToken,
    ) -> DeploymentResult<DeploymentOutcome> {
        let request = DeployRequest {
            contract: artifact.name.clone(),
            bytecode: artifact.bytecode.clone(),
            from: profile.from,
            gas: profile.gas,
            gas_price: profile.gas_price,
        };

        if profile.skip_dry_run && !self.options.dry_run_only {
            tracing::debug!("Dry run skipped by network policy");
        } else {
            let gas = client.simulate(&request).await?;
            tracing::info!(gas, "Dry run succeeded");
            if self.options.dry_run_only {
                return Ok(DeploymentOutcome::Simulated {
                    contract: artifact.name.clone(),
                    gas,
                });
            }
        }

        let submission = client.submit(request).await?;
        let mut enforcer = DeploymentPolicyEnforcer::new(CompletionPolicy::from(profile), submission)
            .with_backoff(self.options.backoff);

        let instant = matches!(enforcer.accept(), DeploymentState::Confirmed { .. });
        let confirmation = if instant {
            // Local node: final on acceptance. One receipt lookup for the address, no polling.
            let inclusion = match client.snapshot(submission.tx_hash).await {
                Ok(snapshot) => snapshot.inclusion,
                Err(e) => {
                    tracing::warn!(error = %e, "Receipt lookup failed; contract address unknown");
                    None
                }
            };
            if inclusion.is_some_and(|i| !i.success) {
                return Err(DeploymentError::Reverted {
                    network: profile.name.clone(),
                    tx_hash: submission.tx_hash,
                });
            }
            Confirmation {
                confirmations: 0,
                inclusion,
            }
        } else {
            enforcer.run(client, cancel).await?
        };

        let receipt = DeploymentReceipt {
            network: profile.name.clone(),
            contract: artifact.name.clone(),
            tx_hash: submission.tx_hash,
            contract_address: confirmation.inclusion.and_then(|i| i.contract_address),
            block_number: confirmation.inclusion.map(|i| i.block_number),
            confirmations: confirmation.confirmations,
        };
        tracing::info!(
            tx_hash = %receipt.tx_hash,
            address = ?receipt.contract_address,
            confirmations = receipt.confirmations,
            "Contract deployed"
        );
        Ok(DeploymentOutcome::Deployed(receipt))
    }
}

fn outcome_label(err: &DeploymentError) -> &'static str {
    match err {
        DeploymentError::DeploymentTimeout { .. } => "timeout",
        DeploymentError::DeploymentCancelled { .. } => "cancelled",
        DeploymentError::SubmissionRejected { .. } => "rejected",
        DeploymentError::DryRunFailed { .. } => "dry_run_failed",
        DeploymentError::Reverted { .. } => "reverted",
        DeploymentError::ChainMismatch { .. } => "chain_mismatch",
        DeploymentError::Rpc { .. } => "rpc_error",
    }
}
