//! AWS S3 object store.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use tracing::debug;

use super::{ObjectAcl, ObjectStore, StoreError};

/// Error code S3 returns when a bucket enforces object ownership.
const ACL_NOT_SUPPORTED_CODE: &str = "AccessControlListNotSupported";

/// S3 bucket used as a report store.
#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Create a store for `bucket` using an existing client.
    #[must_use]
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Create a store from a loaded AWS SDK configuration.
    #[must_use]
    pub fn from_sdk_config(config: &aws_config::SdkConfig, bucket: impl Into<String>) -> Self {
        Self::new(Client::new(config), bucket)
    }

    fn canned_acl(acl: ObjectAcl) -> ObjectCannedAcl {
        match acl {
            ObjectAcl::BucketOwnerFullControl => ObjectCannedAcl::BucketOwnerFullControl,
        }
    }
}

fn object_location(bucket: &str, key: &str) -> String {
    format!("s3://{bucket}/{key}")
}

/// Convert an SDK error into a [`StoreError`], singling out ACL rejections.
fn map_sdk_error<E, R>(err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    if let SdkError::ServiceError(service) = &err {
        let code = service.err().code().unwrap_or("Unknown").to_string();
        let message = service.err().message().unwrap_or_default().to_string();
        if code == ACL_NOT_SUPPORTED_CODE {
            return StoreError::AclNotSupported(message);
        }
        return StoreError::Service { code, message };
    }
    StoreError::Transport(DisplayErrorContext(&err).to_string())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn location(&self, key: &str) -> String {
        object_location(&self.bucket, key)
    }

    async fn put_object(
        &self,
        key: &str,
        body: &[u8],
        content_type: &str,
        acl: Option<ObjectAcl>,
    ) -> Result<(), StoreError> {
        debug!(bucket = %self.bucket, key = %key, acl = ?acl, "S3 PutObject");

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body.to_vec()));

        if let Some(acl) = acl {
            request = request.acl(Self::canned_acl(acl));
        }

        request.send().await.map_err(map_sdk_error)?;
        Ok(())
    }

    async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
        content_disposition: Option<String>,
    ) -> Result<String, StoreError> {
        let config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StoreError::Presign(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .set_response_content_disposition(content_disposition)
            .presigned(config)
            .await
            .map_err(map_sdk_error)?;

        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location() {
        assert_eq!(
            object_location("reports-bucket", "reports/aws_daily_cost_report.html"),
            "s3://reports-bucket/reports/aws_daily_cost_report.html"
        );
    }

    #[test]
    fn test_canned_acl_mapping() {
        assert_eq!(
            S3ObjectStore::canned_acl(ObjectAcl::BucketOwnerFullControl),
            ObjectCannedAcl::BucketOwnerFullControl
        );
    }
}
