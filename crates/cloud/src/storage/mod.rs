//! Object storage abstractions and common types.

mod report_store;
mod s3;

pub use report_store::{
    ReportStore, StoreOutcome, DEFAULT_DOWNLOAD_FILENAME, DEFAULT_URL_EXPIRY, REPORT_CONTENT_TYPE,
};
pub use s3::S3ObjectStore;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The bucket rejects canned ACLs (object ownership is enforced).
    #[error("ACL not supported by bucket: {0}")]
    AclNotSupported(String),

    /// Storage service returned an error response.
    #[error("Storage service error: {code} - {message}")]
    Service { code: String, message: String },

    /// Request never produced a service response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Signed URL could not be produced.
    #[error("Presigning error: {0}")]
    Presign(String),
}

impl StoreError {
    /// Whether this is the permission condition that allows a retry without ACL.
    #[must_use]
    pub const fn is_acl_not_supported(&self) -> bool {
        matches!(self, Self::AclNotSupported(_))
    }
}

/// Canned access control applied to an uploaded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectAcl {
    /// Grant the bucket owner full control of the object.
    BucketOwnerFullControl,
}

impl std::fmt::Display for ObjectAcl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BucketOwnerFullControl => write!(f, "bucket-owner-full-control"),
        }
    }
}

/// How a browser should treat a fetched object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Display in the browser.
    Inline,
    /// Force a download with the given file name.
    Attachment { filename: String },
}

impl Disposition {
    /// `Content-Disposition` override to sign into the URL, if any.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::Inline => None,
            Self::Attachment { filename } => Some(format!("attachment; filename=\"{filename}\"")),
        }
    }
}

/// A time-limited link to a stored report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessUrl {
    /// Signed URL.
    pub url: String,
    /// Validity window from the moment of signing.
    pub expires_in: Duration,
    /// Inline view or forced download.
    pub disposition: Disposition,
}

/// Trait for object stores.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Human-readable location of a key (e.g., `s3://bucket/key`).
    fn location(&self, key: &str) -> String;

    /// Upload an object.
    async fn put_object(
        &self,
        key: &str,
        body: &[u8],
        content_type: &str,
        acl: Option<ObjectAcl>,
    ) -> Result<(), StoreError>;

    /// Produce a signed GET URL valid for `expires_in`.
    async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
        content_disposition: Option<String>,
    ) -> Result<String, StoreError>;
}
