//! JSON file cost source.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::{CostSource, CostSourceError};
use crate::report::CostReport;

/// Reads cost figures from a JSON object on disk.
///
/// ```json
/// { "ec2_hourly": 0.125, "ec2_monthly": 91.25, "total_monthly": 105.85 }
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CostSource for JsonFileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn get_total_cost(&self) -> Result<CostReport, CostSourceError> {
        debug!(path = %self.path.display(), "Reading cost figures");
        let text = tokio::fs::read_to_string(&self.path).await?;
        let report = CostReport::from_json_str(&text)?;
        debug!(fields = report.len(), "Parsed cost figures");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_json_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"ec2_hourly": 0.125, "total_monthly": 105.85}}"#).unwrap();

        let source = JsonFileSource::new(file.path());
        let report = source.get_total_cost().await.unwrap();
        assert!((report.get("ec2_hourly") - 0.125).abs() < f64::EPSILON);
        assert!((report.get("total_monthly") - 105.85).abs() < f64::EPSILON);
        assert!(report.get("rds_hourly").abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileSource::new(dir.path().join("absent.json"));
        let err = source.get_total_cost().await.unwrap_err();
        assert!(matches!(err, CostSourceError::Io(_)));
    }

    #[tokio::test]
    async fn test_malformed_json_is_serialization_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = JsonFileSource::new(file.path())
            .get_total_cost()
            .await
            .unwrap_err();
        assert!(matches!(err, CostSourceError::Serialization(_)));
    }
}
