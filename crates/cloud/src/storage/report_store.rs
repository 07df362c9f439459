//! Report store adapter with ACL fallback.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{AccessUrl, Disposition, ObjectAcl, ObjectStore, StoreError};

/// Content type of stored reports.
pub const REPORT_CONTENT_TYPE: &str = "text/html";

/// Default validity of access links.
pub const DEFAULT_URL_EXPIRY: Duration = Duration::from_secs(3600);

/// Default file name offered by download links.
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "aws_daily_cost_report.html";

/// Result of persisting a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Report is stored.
    Stored {
        /// Whether the bucket-owner ACL was applied.
        acl_applied: bool,
    },
    /// Report could not be stored.
    Failed(StoreError),
}

/// Persists rendered reports and mints access links for them.
#[derive(Clone)]
pub struct ReportStore {
    store: Arc<dyn ObjectStore>,
    download_filename: String,
    url_expiry: Duration,
}

impl ReportStore {
    /// Wrap an object store with default link settings.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            download_filename: DEFAULT_DOWNLOAD_FILENAME.to_string(),
            url_expiry: DEFAULT_URL_EXPIRY,
        }
    }

    /// Set the file name offered by download links.
    #[must_use]
    pub fn with_download_filename(mut self, filename: impl Into<String>) -> Self {
        self.download_filename = filename.into();
        self
    }

    /// Set the validity of access links.
    #[must_use]
    pub const fn with_url_expiry(mut self, expiry: Duration) -> Self {
        self.url_expiry = expiry;
        self
    }

    /// Upload an HTML report.
    ///
    /// The first attempt grants the bucket owner full control. Buckets with
    /// ACLs disabled reject that, in which case the upload is retried once
    /// without the ACL. Every other failure is returned as-is.
    pub async fn store(&self, key: &str, html: &str) -> StoreOutcome {
        let location = self.store.location(key);
        let body = html.as_bytes();

        match self
            .store
            .put_object(
                key,
                body,
                REPORT_CONTENT_TYPE,
                Some(ObjectAcl::BucketOwnerFullControl),
            )
            .await
        {
            Ok(()) => {
                info!(location = %location, "Report uploaded");
                StoreOutcome::Stored { acl_applied: true }
            }
            Err(e) if e.is_acl_not_supported() => {
                warn!(location = %location, error = %e, "Upload with ACL rejected, retrying without ACL");

                match self
                    .store
                    .put_object(key, body, REPORT_CONTENT_TYPE, None)
                    .await
                {
                    Ok(()) => {
                        info!(location = %location, "Report uploaded (without ACL)");
                        StoreOutcome::Stored { acl_applied: false }
                    }
                    Err(e) => {
                        warn!(location = %location, error = %e, "Upload without ACL failed as well");
                        StoreOutcome::Failed(e)
                    }
                }
            }
            Err(e) => {
                warn!(location = %location, error = %e, "Report upload failed");
                StoreOutcome::Failed(e)
            }
        }
    }

    /// Mint a signed link to a stored report.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot sign the request.
    pub async fn access_url(
        &self,
        key: &str,
        force_download: bool,
    ) -> Result<AccessUrl, StoreError> {
        let disposition = if force_download {
            Disposition::Attachment {
                filename: self.download_filename.clone(),
            }
        } else {
            Disposition::Inline
        };

        let url = self
            .store
            .presign_get(key, self.url_expiry, disposition.header_value())
            .await?;

        debug!(
            key = %key,
            force_download,
            expires_in_secs = self.url_expiry.as_secs(),
            "Access URL generated"
        );

        Ok(AccessUrl {
            url,
            expires_in: self.url_expiry,
            disposition,
        })
    }
}
