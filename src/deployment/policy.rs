//! Deployment completion policy.
//!
//! # States
//! ```text
//! Submitted → Confirming → Confirmed
//!                        → TimedOut
//! Submitted → Confirmed              (local networks)
//! ```
//!
//! # Transitions
//! - A confirmation is counted for every new block in which the transaction is
//!   still included. If it drops out (reorg) the count falls back to zero.
//! - Confirmed once the transaction is included and observed confirmations
//!   reach the profile's requirement. Zero required confirmations still waits
//!   for inclusion.
//! - TimedOut once `timeout_blocks` blocks have passed since submission without
//!   reaching the requirement. The budget is never extended.

use std::time::Duration;
use tokio::time::{interval, sleep, MissedTickBehavior};

use crate::deployment::types::{ChainObserver, ChainSnapshot, Inclusion, Submission};
use crate::error::{DeploymentError, DeploymentResult};
use crate::lifecycle::cancel::CancelToken;
use crate::network::profile::NetworkProfile;
use crate::observability::metrics;
use crate::resilience::backoff::BackoffPolicy;

/// Completion knobs taken from a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPolicy {
    pub network: String,
    pub required_confirmations: u32,
    pub timeout_blocks: u64,
    pub poll_interval: Duration,
    pub instant_finality: bool,
}

impl From<&NetworkProfile> for CompletionPolicy {
    fn from(profile: &NetworkProfile) -> Self {
        Self {
            network: profile.name.clone(),
            required_confirmations: profile.required_confirmations,
            timeout_blocks: profile.timeout_blocks,
            poll_interval: profile.poll_interval(),
            instant_finality: profile.has_instant_finality(),
        }
    }
}

/// Where a deployment attempt stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentState {
    /// Handed to the provider, not yet accepted.
    Submitted,
    /// Accepted; counting confirmations.
    Confirming { observed: u32, elapsed_blocks: u64 },
    /// Enough confirmations seen.
    Confirmed {
        confirmations: u32,
        inclusion: Option<Inclusion>,
    },
    /// Block budget exhausted.
    TimedOut { elapsed_blocks: u64 },
}

/// Final result of a confirmed deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub confirmations: u32,
    /// None when finality was instant and no receipt was polled.
    pub inclusion: Option<Inclusion>,
}

/// Drives one deployment attempt to Confirmed or TimedOut.
#[derive(Debug)]
pub struct DeploymentPolicyEnforcer {
    policy: CompletionPolicy,
    submission: Submission,
    backoff: BackoffPolicy,
    last_block: u64,
    state: DeploymentState,
}

impl DeploymentPolicyEnforcer {
    pub fn new(policy: CompletionPolicy, submission: Submission) -> Self {
        Self {
            last_block: submission.block_number,
            policy,
            submission,
            backoff: BackoffPolicy::default(),
            state: DeploymentState::Submitted,
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn state(&self) -> &DeploymentState {
        &self.state
    }

    pub fn policy(&self) -> &CompletionPolicy {
        &self.policy
    }

    /// The provider accepted the submission.
    pub fn accept(&mut self) -> &DeploymentState {
        if self.state == DeploymentState::Submitted {
            self.state = if self.policy.instant_finality {
                DeploymentState::Confirmed {
                    confirmations: 0,
                    inclusion: None,
                }
            } else {
                DeploymentState::Confirming {
                    observed: 0,
                    elapsed_blocks: 0,
                }
            };
            tracing::debug!(
                network = %self.policy.network,
                tx_hash = %self.submission.tx_hash,
                state = ?self.state,
                "Submission accepted"
            );
        }
        &self.state
    }

    /// Apply one chain observation.
    ///
    /// Observations that do not advance the head are ignored.
    pub fn observe(&mut self, snapshot: &ChainSnapshot) -> DeploymentResult<&DeploymentState> {
        match self.state {
            DeploymentState::Submitted => {
                self.accept();
                if !matches!(self.state, DeploymentState::Confirming { .. }) {
                    return Ok(&self.state);
                }
            }
            DeploymentState::Confirming { .. } => {}
            DeploymentState::Confirmed { .. } => return Ok(&self.state),
            DeploymentState::TimedOut { elapsed_blocks } => return Err(self.timed_out(elapsed_blocks)),
        }

        if snapshot.block_number <= self.last_block {
            return Ok(&self.state);
        }
        self.last_block = snapshot.block_number;

        let elapsed_blocks = snapshot.block_number.saturating_sub(self.submission.block_number);
        let observed = match snapshot.inclusion {
            Some(inclusion) if !inclusion.success => {
                return Err(DeploymentError::Reverted {
                    network: self.policy.network.clone(),
                    tx_hash: self.submission.tx_hash,
                });
            }
            Some(inclusion) if inclusion.block_number <= snapshot.block_number => {
                u32::try_from(snapshot.block_number - inclusion.block_number + 1).unwrap_or(u32::MAX)
            }
            _ => 0,
        };
        metrics::record_confirmations(&self.policy.network, observed);

        if snapshot.inclusion.is_some() && observed >= self.policy.required_confirmations {
            self.state = DeploymentState::Confirmed {
                confirmations: observed,
                inclusion: snapshot.inclusion,
            };
            tracing::info!(
                network = %self.policy.network,
                tx_hash = %self.submission.tx_hash,
                block = snapshot.block_number,
                confirmations = observed,
                "Deployment confirmed"
            );
            return Ok(&self.state);
        }

        if elapsed_blocks >= self.policy.timeout_blocks {
            self.state = DeploymentState::TimedOut { elapsed_blocks };
            return Err(self.timed_out(elapsed_blocks));
        }

        self.state = DeploymentState::Confirming {
            observed,
            elapsed_blocks,
        };
        tracing::debug!(
            network = %self.policy.network,
            tx_hash = %self.submission.tx_hash,
            confirmations = observed,
            required = self.policy.required_confirmations,
            elapsed_blocks,
            "Waiting for confirmations"
        );
        Ok(&self.state)
    }

    /// Poll `observer` until the attempt finishes or `cancel` fires.
    pub async fn run<O: ChainObserver>(
        mut self,
        observer: &O,
        mut cancel: CancelToken,
    ) -> DeploymentResult<Confirmation> {
        self.accept();

        let mut ticker = interval(self.policy.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut failures = 0u32;

        loop {
            if let DeploymentState::Confirmed {
                confirmations,
                inclusion,
            } = self.state
            {
                return Ok(Confirmation {
                    confirmations,
                    inclusion,
                });
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.cancelled()),
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.cancelled()),
                result = observer.snapshot(self.submission.tx_hash) => result,
            };

            match result {
                Ok(snapshot) => {
                    failures = 0;
                    self.observe(&snapshot)?;
                }
                Err(e) => {
                    failures += 1;
                    if failures >= self.backoff.max_failures {
                        return Err(e);
                    }
                    let delay = self.backoff.delay(failures);
                    tracing::warn!(
                        network = %self.policy.network,
                        error = %e,
                        attempt = failures,
                        delay_ms = delay.as_millis() as u64,
                        "Confirmation poll failed, backing off"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(self.cancelled()),
                        _ = sleep(delay) => {}
                    }
                }
            }
        }
    }

    fn timed_out(&self, elapsed_blocks: u64) -> DeploymentError {
        tracing::warn!(
            network = %self.policy.network,
            tx_hash = %self.submission.tx_hash,
            elapsed_blocks,
            "Deployment timed out"
        );
        DeploymentError::DeploymentTimeout {
            network: self.policy.network.clone(),
            elapsed_blocks,
        }
    }

    fn cancelled(&self) -> DeploymentError {
        tracing::warn!(
            network = %self.policy.network,
            tx_hash = %self.submission.tx_hash,
            "Confirmation wait cancelled"
        );
        DeploymentError::DeploymentCancelled {
            network: self.policy.network.clone(),
        }
    }
}
