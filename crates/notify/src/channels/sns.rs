//! AWS SNS notification channel.

use async_trait::async_trait;
use aws_sdk_sns::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_sns::Client;
use tracing::{debug, info};

use super::{NotificationChannel, SubscriptionInfo, TopicHandle, PENDING_CONFIRMATION};
use crate::error::ChannelError;

/// Protocol used for operator subscriptions.
const EMAIL_PROTOCOL: &str = "email";

/// SNS topic channel delivering to email subscribers.
#[derive(Clone, Debug)]
pub struct SnsChannel {
    client: Client,
}

impl SnsChannel {
    /// Create a channel using an existing client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a channel from a loaded AWS SDK configuration.
    #[must_use]
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

/// Convert an SDK error into a [`ChannelError`].
fn map_sdk_error<E, R>(err: SdkError<E, R>) -> ChannelError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    match &err {
        SdkError::ServiceError(service) => ChannelError::Service {
            code: service.err().code().unwrap_or("Unknown").to_string(),
            message: service.err().message().unwrap_or_default().to_string(),
        },
        _ => ChannelError::Transport(DisplayErrorContext(&err).to_string()),
    }
}

#[async_trait]
impl NotificationChannel for SnsChannel {
    fn name(&self) -> &'static str {
        "sns"
    }

    async fn ensure_topic(&self, name: &str) -> Result<TopicHandle, ChannelError> {
        let output = self
            .client
            .create_topic()
            .name(name)
            .send()
            .await
            .map_err(map_sdk_error)?;

        let arn = output
            .topic_arn()
            .ok_or(ChannelError::MissingField("TopicArn"))?;

        debug!(topic = %name, arn = %arn, "Topic ready");
        Ok(TopicHandle::new(arn))
    }

    async fn subscribe(&self, topic: &TopicHandle, address: &str) -> Result<String, ChannelError> {
        let output = self
            .client
            .subscribe()
            .topic_arn(&topic.arn)
            .protocol(EMAIL_PROTOCOL)
            .endpoint(address)
            .send()
            .await
            .map_err(map_sdk_error)?;

        let subscription_arn = output
            .subscription_arn()
            .unwrap_or(PENDING_CONFIRMATION)
            .to_string();

        info!(
            topic = %topic,
            endpoint = %address,
            "Subscription request sent, check the inbox to confirm"
        );
        Ok(subscription_arn)
    }

    async fn list_subscriptions(
        &self,
        topic: &TopicHandle,
    ) -> Result<Vec<SubscriptionInfo>, ChannelError> {
        let output = self
            .client
            .list_subscriptions_by_topic()
            .topic_arn(&topic.arn)
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(output
            .subscriptions()
            .iter()
            .map(|s| SubscriptionInfo {
                subscription_arn: s
                    .subscription_arn()
                    .unwrap_or(PENDING_CONFIRMATION)
                    .to_string(),
                endpoint: s.endpoint().map(ToString::to_string),
                protocol: s.protocol().map(ToString::to_string),
            })
            .collect())
    }

    async fn publish(
        &self,
        topic: &TopicHandle,
        subject: &str,
        body: &str,
    ) -> Result<String, ChannelError> {
        let output = self
            .client
            .publish()
            .topic_arn(&topic.arn)
            .subject(subject)
            .message(body)
            .send()
            .await
            .map_err(map_sdk_error)?;

        let message_id = output
            .message_id()
            .ok_or(ChannelError::MissingField("MessageId"))?
            .to_string();

        info!(topic = %topic, message_id = %message_id, "Notification published");
        Ok(message_id)
    }
}
