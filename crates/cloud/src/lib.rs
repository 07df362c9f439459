//! Report storage for the cost estimator.
//!
//! Rendered reports are persisted in an object store and shared through
//! time-limited links:
//!
//! - [`ObjectStore`] - the raw put/presign surface of a bucket
//! - [`S3ObjectStore`] - AWS S3 implementation
//! - [`ReportStore`] - the adapter the pipeline talks to; it applies the
//!   ACL fallback and turns failures into [`StoreOutcome`] values

pub mod storage;

pub use storage::{
    AccessUrl, Disposition, ObjectAcl, ObjectStore, ReportStore, S3ObjectStore, StoreError,
    StoreOutcome, DEFAULT_DOWNLOAD_FILENAME, DEFAULT_URL_EXPIRY, REPORT_CONTENT_TYPE,
};
