//! Waiting for the recipient to confirm their subscription.
//!
//! A freshly subscribed address receives a confirmation email and nothing
//! is delivered until the link in it is clicked. The waiter polls the
//! channel at a fixed interval until that happens, optionally bounded by a
//! maximum wait and always interruptible through a cancellation token.

use std::sync::Arc;
use std::time::Duration;

use estimator_notify::{ChannelError, ConfirmationState, NotificationChannel, TopicHandle};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::clock::Sleeper;

/// Polling policy for subscription confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Time between checks.
    pub interval: Duration,
    /// Upper bound on total sleeping between checks; `None` waits indefinitely.
    pub max_wait: Option<Duration>,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_wait: None,
        }
    }
}

/// Reasons confirmation waiting stopped without a confirmed subscription.
#[derive(Debug, Error)]
pub enum ConfirmationError {
    /// Checking the subscription failed.
    #[error("Failed to check subscription: {0}")]
    Channel(#[from] ChannelError),

    /// Maximum wait elapsed while still pending.
    #[error("Subscription not confirmed after {}s", .waited.as_secs())]
    TimedOut { waited: Duration },

    /// Cancellation was requested.
    #[error("Waiting for subscription confirmation was cancelled")]
    Cancelled,
}

/// Summary of a successful wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationReport {
    /// Number of status checks made.
    pub checks: u32,
    /// Total time spent sleeping between checks.
    pub waited: Duration,
}

/// Polls a channel until its subscription is confirmed.
#[derive(Clone)]
pub struct SubscriptionWaiter {
    channel: Arc<dyn NotificationChannel>,
    sleeper: Arc<dyn Sleeper>,
    policy: ConfirmationPolicy,
    cancel: CancellationToken,
}

impl SubscriptionWaiter {
    #[must_use]
    pub fn new(
        channel: Arc<dyn NotificationChannel>,
        sleeper: Arc<dyn Sleeper>,
        policy: ConfirmationPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            channel,
            sleeper,
            policy,
            cancel,
        }
    }

    /// Block until the first subscription on `topic` leaves the pending state.
    pub async fn wait_confirmed(
        &self,
        topic: &TopicHandle,
    ) -> Result<ConfirmationReport, ConfirmationError> {
        let mut checks = 0u32;
        let mut waited = Duration::ZERO;

        loop {
            if self.cancel.is_cancelled() {
                return Err(ConfirmationError::Cancelled);
            }

            let state = self.channel.poll_confirmation(topic).await?;
            checks += 1;
            debug!(topic = %topic, state = %state, checks, "Checked subscription");

            if state == ConfirmationState::Confirmed {
                info!(topic = %topic, checks, waited_secs = waited.as_secs(), "Subscription confirmed");
                return Ok(ConfirmationReport { checks, waited });
            }

            let pause = match self.policy.max_wait {
                Some(max_wait) if waited >= max_wait => {
                    return Err(ConfirmationError::TimedOut { waited });
                }
                // Never sleep past the bound.
                Some(max_wait) => self.policy.interval.min(max_wait - waited),
                None => self.policy.interval,
            };

            info!(
                topic = %topic,
                retry_in_secs = pause.as_secs(),
                "Waiting for subscription confirmation"
            );

            tokio::select! {
                () = self.cancel.cancelled() => return Err(ConfirmationError::Cancelled),
                () = self.sleeper.sleep(pause) => {}
            }
            waited += pause;
        }
    }
}
