//! Two-phase publish state machine.
//!
//! ```text
//! create ──> sleep(interval) ──> attempt ──ok──> Confirmed
//!                                  │  ^
//!                          not ready  │ sleep(interval), elapsed += interval
//!                                  └──┘     while elapsed < max_wait
//! ```
//!
//! Elapsed time is counted in whole intervals, never read from a clock, so a
//! run is fully determined by the target's responses and the policy.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use reel_models::{PublishReceipt, PublishState, TargetPublish};

use crate::error::{PublishError, PublishPhase, PublishResult};
use crate::metrics::{self, outcome};
use crate::policy::PublishPolicy;
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::target::PublishTarget;

/// Drives one target from `Created` to `Confirmed` or `Failed`.
pub struct PublishCoordinator {
    policy: PublishPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl PublishCoordinator {
    pub fn new(policy: PublishPolicy, sleeper: Arc<dyn Sleeper>) -> PublishResult<Self> {
        policy.validate()?;
        Ok(Self { policy, sleeper })
    }

    /// Coordinator that sleeps on the tokio timer.
    pub fn with_tokio_sleeper(policy: PublishPolicy) -> PublishResult<Self> {
        Self::new(policy, Arc::new(TokioSleeper))
    }

    pub fn policy(&self) -> &PublishPolicy {
        &self.policy
    }

    /// Publish `media_url` to `target`, recording every state change on
    /// `record`. The record must be fresh (`Created`).
    pub async fn publish(
        &self,
        target: &dyn PublishTarget,
        media_url: &str,
        record: &mut TargetPublish,
    ) -> PublishResult<PublishReceipt> {
        let name = target.name().to_string();
        let interval = self.policy.retry_interval;

        let container_id = match target.create_container(media_url).await {
            Ok(id) => id,
            Err(source) => {
                record.transition(PublishState::Failed)?;
                warn!(target = %name, error = %source, "Container creation rejected");
                metrics::record_result(&name, outcome::REJECTED, Duration::ZERO);
                return Err(PublishError::Rejected {
                    target: name,
                    phase: PublishPhase::Create,
                    source,
                });
            }
        };
        record.transition(PublishState::ContainerCreated)?;

        // Ingest needs at least one interval before the first attempt
        self.sleeper.sleep(interval).await;
        let mut elapsed = interval;
        let mut attempts: u32 = 0;

        while elapsed < self.policy.max_wait {
            attempts += 1;

            match target.publish_container(&container_id).await {
                Ok(media_id) => {
                    metrics::record_attempt(&name, outcome::CONFIRMED);
                    metrics::record_result(&name, outcome::CONFIRMED, elapsed);

                    let receipt = PublishReceipt {
                        target: name.clone(),
                        container_id,
                        media_id,
                        attempts,
                        waited: elapsed,
                    };
                    record.confirm(receipt.clone())?;

                    info!(
                        target = %name,
                        attempt = attempts,
                        elapsed_secs = elapsed.as_secs(),
                        media_id = ?receipt.media_id,
                        "Publish confirmed"
                    );
                    return Ok(receipt);
                }
                Err(e) if target.is_not_ready(&e) => {
                    metrics::record_attempt(&name, outcome::NOT_READY);
                    record.transition(PublishState::AwaitingReady)?;

                    info!(
                        target = %name,
                        attempt = attempts,
                        elapsed_secs = elapsed.as_secs(),
                        "Media not ready, waiting {}s",
                        interval.as_secs()
                    );
                    self.sleeper.sleep(interval).await;
                    elapsed += interval;
                }
                Err(source) => {
                    metrics::record_attempt(&name, outcome::REJECTED);
                    metrics::record_result(&name, outcome::REJECTED, elapsed);
                    record.transition(PublishState::Failed)?;

                    warn!(
                        target = %name,
                        attempt = attempts,
                        error = %source,
                        "Publish rejected"
                    );
                    return Err(PublishError::Rejected {
                        target: name,
                        phase: PublishPhase::Publish,
                        source,
                    });
                }
            }
        }

        record.transition(PublishState::Failed)?;
        metrics::record_result(&name, outcome::TIMEOUT, elapsed);
        warn!(
            target = %name,
            attempts = attempts,
            elapsed_secs = elapsed.as_secs(),
            "Publish wait budget exhausted"
        );

        Err(PublishError::Timeout {
            target: name,
            attempts,
            waited: elapsed,
        })
    }
}
