//! Notification channel implementations.

pub mod sns;

use async_trait::async_trait;

use crate::error::ChannelError;

/// Subscription ARN reported while the recipient has not yet confirmed.
pub const PENDING_CONFIRMATION: &str = "PendingConfirmation";

/// A durable topic recipients subscribe to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicHandle {
    /// Topic ARN.
    pub arn: String,
}

impl TopicHandle {
    #[must_use]
    pub fn new(arn: impl Into<String>) -> Self {
        Self { arn: arn.into() }
    }
}

impl std::fmt::Display for TopicHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.arn)
    }
}

/// One subscription on a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionInfo {
    /// Subscription ARN, or [`PENDING_CONFIRMATION`] until confirmed.
    pub subscription_arn: String,
    /// Delivery endpoint (the email address).
    pub endpoint: Option<String>,
    /// Delivery protocol (e.g., "email").
    pub protocol: Option<String>,
}

impl SubscriptionInfo {
    /// Confirmation state derived from the subscription ARN.
    #[must_use]
    pub fn state(&self) -> ConfirmationState {
        ConfirmationState::from_subscription_arn(&self.subscription_arn)
    }
}

/// Whether the recipient has confirmed the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationState {
    /// Confirmation email not yet acted on.
    Pending,
    /// Deliveries will reach the recipient.
    Confirmed,
}

impl ConfirmationState {
    /// Anything other than the pending sentinel counts as confirmed.
    #[must_use]
    pub fn from_subscription_arn(arn: &str) -> Self {
        if arn == PENDING_CONFIRMATION {
            Self::Pending
        } else {
            Self::Confirmed
        }
    }
}

impl std::fmt::Display for ConfirmationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
        }
    }
}

/// Trait for topic-based notification channels.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Create the named topic, or return it if it already exists.
    async fn ensure_topic(&self, name: &str) -> Result<TopicHandle, ChannelError>;

    /// Subscribe an email address to a topic.
    ///
    /// Repeating the request for an existing subscriber does not create a
    /// second delivery. Returns the subscription ARN as reported by the
    /// service, which is a placeholder until confirmation.
    async fn subscribe(&self, topic: &TopicHandle, address: &str) -> Result<String, ChannelError>;

    /// List subscriptions on a topic.
    async fn list_subscriptions(
        &self,
        topic: &TopicHandle,
    ) -> Result<Vec<SubscriptionInfo>, ChannelError>;

    /// Check whether the topic's subscription has been confirmed.
    ///
    /// Only the first listed subscription is inspected; topics are expected
    /// to carry a single recipient. An empty list counts as pending.
    async fn poll_confirmation(
        &self,
        topic: &TopicHandle,
    ) -> Result<ConfirmationState, ChannelError> {
        let subscriptions = self.list_subscriptions(topic).await?;
        Ok(subscriptions
            .first()
            .map_or(ConfirmationState::Pending, SubscriptionInfo::state))
    }

    /// Publish a message to every confirmed subscriber. Returns the message id.
    async fn publish(
        &self,
        topic: &TopicHandle,
        subject: &str,
        body: &str,
    ) -> Result<String, ChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ListOnly {
        subscriptions: Mutex<Vec<SubscriptionInfo>>,
    }

    #[async_trait]
    impl NotificationChannel for ListOnly {
        fn name(&self) -> &'static str {
            "list-only"
        }

        async fn ensure_topic(&self, name: &str) -> Result<TopicHandle, ChannelError> {
            Ok(TopicHandle::new(name))
        }

        async fn subscribe(&self, _: &TopicHandle, _: &str) -> Result<String, ChannelError> {
            Ok(PENDING_CONFIRMATION.to_string())
        }

        async fn list_subscriptions(
            &self,
            _: &TopicHandle,
        ) -> Result<Vec<SubscriptionInfo>, ChannelError> {
            Ok(self.subscriptions.lock().unwrap().clone())
        }

        async fn publish(&self, _: &TopicHandle, _: &str, _: &str) -> Result<String, ChannelError> {
            Ok("msg-1".to_string())
        }
    }

    fn sub(arn: &str) -> SubscriptionInfo {
        SubscriptionInfo {
            subscription_arn: arn.to_string(),
            endpoint: Some("ops@example.com".to_string()),
            protocol: Some("email".to_string()),
        }
    }

    #[test]
    fn test_state_from_arn() {
        assert_eq!(
            ConfirmationState::from_subscription_arn("PendingConfirmation"),
            ConfirmationState::Pending
        );
        assert_eq!(
            ConfirmationState::from_subscription_arn("arn:aws:sns:ap-south-1:123:Topic:abc"),
            ConfirmationState::Confirmed
        );
    }

    #[tokio::test]
    async fn test_poll_confirmation_uses_first_subscription() {
        let channel = ListOnly {
            subscriptions: Mutex::new(vec![sub("arn:aws:sns:x:1:t:a"), sub(PENDING_CONFIRMATION)]),
        };
        let topic = TopicHandle::new("t");
        assert_eq!(
            channel.poll_confirmation(&topic).await.unwrap(),
            ConfirmationState::Confirmed
        );

        *channel.subscriptions.lock().unwrap() =
            vec![sub(PENDING_CONFIRMATION), sub("arn:aws:sns:x:1:t:a")];
        assert_eq!(
            channel.poll_confirmation(&topic).await.unwrap(),
            ConfirmationState::Pending
        );
    }

    #[tokio::test]
    async fn test_poll_confirmation_empty_is_pending() {
        let channel = ListOnly {
            subscriptions: Mutex::new(vec![]),
        };
        assert_eq!(
            channel
                .poll_confirmation(&TopicHandle::new("t"))
                .await
                .unwrap(),
            ConfirmationState::Pending
        );
    }
}
