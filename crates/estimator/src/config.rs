//! Configuration for a cost report run.
//!
//! Values come from three layers, later ones winning: built-in defaults, an
//! optional TOML file, then CLI flags / environment variables.
//!
//! ```toml
//! region = "ap-south-1"
//! email = "ops@example.com"
//! bucket = "cost-reports"
//! extended_layout = true
//!
//! [cost_source]
//! type = "command"
//! program = "python3"
//! args = ["price_api.py"]
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use estimator_cost::{CommandSource, CostSource, JsonFileSource, ReportLayout};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::subscription::ConfirmationPolicy;

/// Default AWS region.
pub const DEFAULT_REGION: &str = "ap-south-1";

/// Default SNS topic name.
pub const DEFAULT_TOPIC_NAME: &str = "Cost_Estimator_Bot";

/// Default object key for the stored report.
pub const DEFAULT_REPORT_KEY: &str = "reports/aws_daily_cost_report.html";

/// Default local copy of the report.
pub const DEFAULT_LOCAL_FILE: &str = "aws_daily_cost_report.html";

/// Default seconds between confirmation checks.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default validity of access links in seconds.
pub const DEFAULT_URL_EXPIRY_SECS: u64 = 3600;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema.
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required value was not supplied by any layer.
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    /// A value was supplied but is unusable.
    #[error("Invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Where cost figures come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CostSourceConfig {
    /// JSON object in a file.
    File { path: PathBuf },
    /// External pricing command printing a JSON object.
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl CostSourceConfig {
    /// Instantiate the configured source.
    #[must_use]
    pub fn build(&self) -> Arc<dyn CostSource> {
        match self {
            Self::File { path } => Arc::new(JsonFileSource::new(path.clone())),
            Self::Command { program, args } => {
                Arc::new(CommandSource::new(program.clone()).with_args(args.iter().cloned()))
            }
        }
    }
}

/// Full configuration of the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifierConfig {
    /// AWS region for S3 and SNS.
    pub region: String,
    /// SNS topic name (created if missing).
    pub topic_name: String,
    /// Recipient email address.
    pub email: Option<String>,
    /// S3 bucket receiving reports.
    pub bucket: Option<String>,
    /// Object key of the stored report.
    pub report_key: String,
    /// Local copy of the rendered report.
    pub local_file: PathBuf,
    /// File name offered by the download link.
    pub download_filename: String,
    /// Validity of access links.
    pub url_expiry_secs: u64,
    /// Seconds between subscription confirmation checks.
    pub poll_interval_secs: u64,
    /// Give up waiting for confirmation after this many seconds (unbounded if unset).
    pub max_confirmation_wait_secs: Option<u64>,
    /// Include EBS and Route 53 sections.
    pub extended_layout: bool,
    /// Cost figure source.
    pub cost_source: Option<CostSourceConfig>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            topic_name: DEFAULT_TOPIC_NAME.to_string(),
            email: None,
            bucket: None,
            report_key: DEFAULT_REPORT_KEY.to_string(),
            local_file: PathBuf::from(DEFAULT_LOCAL_FILE),
            download_filename: DEFAULT_LOCAL_FILE.to_string(),
            url_expiry_secs: DEFAULT_URL_EXPIRY_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            max_confirmation_wait_secs: None,
            extended_layout: false,
            cost_source: None,
        }
    }
}

impl NotifierConfig {
    /// Parse configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Report layout selected by `extended_layout`.
    #[must_use]
    pub fn layout(&self) -> ReportLayout {
        if self.extended_layout {
            ReportLayout::extended()
        } else {
            ReportLayout::standard()
        }
    }

    /// Confirmation polling policy.
    #[must_use]
    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_wait: self.max_confirmation_wait_secs.map(Duration::from_secs),
        }
    }

    /// Validity of access links.
    #[must_use]
    pub const fn url_expiry(&self) -> Duration {
        Duration::from_secs(self.url_expiry_secs)
    }

    /// Configured cost source.
    pub fn cost_source(&self) -> Result<&CostSourceConfig, ConfigError> {
        self.cost_source.as_ref().ok_or(ConfigError::Missing("cost_source"))
    }

    /// Recipient email address.
    pub fn recipient(&self) -> Result<&str, ConfigError> {
        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(ConfigError::Missing("email"))?;
        if !email.contains('@') {
            return Err(ConfigError::Invalid {
                field: "email",
                reason: format!("'{email}' is not an email address"),
            });
        }
        Ok(email)
    }

    /// Bucket receiving reports.
    pub fn bucket_name(&self) -> Result<&str, ConfigError> {
        self.bucket
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or(ConfigError::Missing("bucket"))
    }

    /// Check settings needed by every run (including dry runs).
    pub fn validate_local(&self) -> Result<(), ConfigError> {
        self.cost_source()?;
        Ok(())
    }

    /// Check every setting needed to deliver a report.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_local()?;
        self.recipient()?;
        self.bucket_name()?;
        if self.report_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "report_key",
                reason: "must not be empty".to_string(),
            });
        }
        if self.topic_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "topic_name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "poll_interval_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.url_expiry_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "url_expiry_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deliverable() -> NotifierConfig {
        NotifierConfig {
            email: Some("ops@example.com".to_string()),
            bucket: Some("cost-reports".to_string()),
            cost_source: Some(CostSourceConfig::File {
                path: PathBuf::from("costs.json"),
            }),
            ..NotifierConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = NotifierConfig::default();
        assert_eq!(config.region, "ap-south-1");
        assert_eq!(config.topic_name, "Cost_Estimator_Bot");
        assert_eq!(config.report_key, "reports/aws_daily_cost_report.html");
        assert_eq!(config.url_expiry(), Duration::from_secs(3600));
        assert_eq!(config.confirmation_policy().interval, Duration::from_secs(5));
        assert_eq!(config.confirmation_policy().max_wait, None);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let config = NotifierConfig::from_toml_str(
            r#"
            email = "ops@example.com"
            bucket = "cost-reports"
            extended_layout = true
            max_confirmation_wait_secs = 600

            [cost_source]
            type = "command"
            program = "python3"
            args = ["price_api.py"]
            "#,
        )
        .unwrap();

        assert_eq!(config.region, "ap-south-1");
        assert!(config.extended_layout);
        assert_eq!(
            config.confirmation_policy().max_wait,
            Some(Duration::from_secs(600))
        );
        assert_eq!(
            config.cost_source,
            Some(CostSourceConfig::Command {
                program: "python3".to_string(),
                args: vec!["price_api.py".to_string()],
            })
        );
        assert!(config.validate().is_ok());
        assert_eq!(config.layout(), ReportLayout::extended());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = NotifierConfig::from_toml_str("bukket = \"typo\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validate_requires_recipient_and_bucket() {
        let mut config = deliverable();
        config.email = None;
        assert!(matches!(config.validate(), Err(ConfigError::Missing("email"))));

        let mut config = deliverable();
        config.email = Some("not-an-address".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "email", .. })
        ));

        let mut config = deliverable();
        config.bucket = Some("  ".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Missing("bucket"))));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = deliverable();
        config.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dry_run_needs_only_a_source() {
        let config = NotifierConfig {
            cost_source: Some(CostSourceConfig::File {
                path: PathBuf::from("costs.json"),
            }),
            ..NotifierConfig::default()
        };
        assert!(config.validate_local().is_ok());
        assert!(config.validate().is_err());

        let config = NotifierConfig {
            report_key: String::new(),
            ..config
        };
        assert!(config.validate_local().is_ok());

        let mut deliverable = deliverable();
        deliverable.report_key = " ".to_string();
        assert!(matches!(
            deliverable.validate(),
            Err(ConfigError::Invalid { field: "report_key", .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = NotifierConfig::from_toml_file(Path::new("/nonexistent/estimator.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
