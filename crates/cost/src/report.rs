//! Cost report model and the field table that drives rendering.

use std::collections::BTreeMap;

use crate::sources::CostSourceError;

/// Well-known cost field keys produced by pricing modules.
pub mod keys {
    pub const EC2_HOURLY: &str = "ec2_hourly";
    pub const EC2_MONTHLY: &str = "ec2_monthly";
    pub const S3_SIZE: &str = "s3_size";
    pub const S3_MONTHLY: &str = "s3_monthly";
    pub const RDS_HOURLY: &str = "rds_hourly";
    pub const RDS_MONTHLY: &str = "rds_monthly";
    pub const EBS_MONTHLY: &str = "ebs_monthly";
    pub const ROUTE53_MONTHLY: &str = "route53_monthly";
    pub const TOTAL_HOURLY: &str = "total_hourly";
    pub const TOTAL_MONTHLY: &str = "total_monthly";
}

// ============================================================================
// Cost report
// ============================================================================

/// Named cost figures for the current billing period.
///
/// Values are non-negative and finite. Reading a field that the source did
/// not provide yields `0.0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostReport {
    values: BTreeMap<String, f64>,
}

impl CostReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value, defaulting to zero when absent.
    #[must_use]
    pub fn get(&self, key: &str) -> f64 {
        self.values.get(key).copied().unwrap_or(0.0)
    }

    /// Whether the source provided this field.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of fields provided by the source.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the source provided no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse a report from a JSON object string.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object or any value is not
    /// a finite, non-negative number.
    pub fn from_json_str(text: &str) -> Result<Self, CostSourceError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Self::from_json_value(value)
    }

    /// Build a report from an already-parsed JSON value.
    ///
    /// `null` values are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an object or any field is not a
    /// finite, non-negative number.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, CostSourceError> {
        let serde_json::Value::Object(map) = value else {
            return Err(CostSourceError::InvalidValue {
                key: "<root>".to_string(),
                reason: "expected a JSON object of cost fields".to_string(),
            });
        };

        let mut values = BTreeMap::new();
        for (key, raw) in map {
            if raw.is_null() {
                continue;
            }
            let Some(number) = raw.as_f64() else {
                return Err(CostSourceError::InvalidValue {
                    key,
                    reason: format!("expected a number, got {raw}"),
                });
            };
            Self::check_value(&key, number)?;
            values.insert(key, number);
        }

        Ok(Self { values })
    }

    fn check_value(key: &str, value: f64) -> Result<(), CostSourceError> {
        if !value.is_finite() {
            return Err(CostSourceError::InvalidValue {
                key: key.to_string(),
                reason: "value is not finite".to_string(),
            });
        }
        if value < 0.0 {
            return Err(CostSourceError::InvalidValue {
                key: key.to_string(),
                reason: format!("value {value} is negative"),
            });
        }
        Ok(())
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for CostReport {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ============================================================================
// Field descriptors
// ============================================================================

/// How a cost figure is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    /// Monetary value, rendered as `$1.23`.
    Dollars { precision: usize },
    /// Storage size, rendered as `1.23456 GB`.
    Gigabytes { precision: usize },
}

impl FieldFormat {
    /// Format a value at this field's precision.
    #[must_use]
    pub fn format(self, value: f64) -> String {
        match self {
            Self::Dollars { precision } => format!("${value:.precision$}"),
            Self::Gigabytes { precision } => format!("{value:.precision$} GB"),
        }
    }
}

/// One row of a cost report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostField {
    /// Key looked up in the [`CostReport`].
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Display format.
    pub format: FieldFormat,
}

impl CostField {
    /// A monetary field.
    #[must_use]
    pub fn dollars(key: impl Into<String>, label: impl Into<String>, precision: usize) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            format: FieldFormat::Dollars { precision },
        }
    }

    /// A storage-size field.
    #[must_use]
    pub fn gigabytes(key: impl Into<String>, label: impl Into<String>, precision: usize) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            format: FieldFormat::Gigabytes { precision },
        }
    }

    /// Format this field's value from a report.
    #[must_use]
    pub fn render_value(&self, report: &CostReport) -> String {
        self.format.format(report.get(&self.key))
    }
}

/// A titled group of fields (one AWS service, or the totals box).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostSection {
    pub title: String,
    pub fields: Vec<CostField>,
    /// Highlighted summary section.
    pub emphasis: bool,
}

// ============================================================================
// Layout
// ============================================================================

/// Ordered set of sections making up a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    title: String,
    sections: Vec<CostSection>,
}

impl ReportLayout {
    /// Default report title.
    pub const DEFAULT_TITLE: &'static str = "AWS Daily Cost Report";

    /// Start building a layout.
    #[must_use]
    pub fn builder() -> ReportLayoutBuilder {
        ReportLayoutBuilder::default()
    }

    /// EC2, S3 and RDS plus totals.
    #[must_use]
    pub fn standard() -> Self {
        Self::standard_builder().build()
    }

    /// Standard layout plus EBS and Route 53.
    #[must_use]
    pub fn extended() -> Self {
        Self::standard_builder()
            .section("EBS", vec![CostField::dollars(keys::EBS_MONTHLY, "Monthly", 2)])
            .section(
                "Route 53",
                vec![CostField::dollars(keys::ROUTE53_MONTHLY, "Monthly", 2)],
            )
            .build()
    }

    fn standard_builder() -> ReportLayoutBuilder {
        Self::builder()
            .section(
                "EC2",
                vec![
                    CostField::dollars(keys::EC2_HOURLY, "Hourly", 3),
                    CostField::dollars(keys::EC2_MONTHLY, "Monthly", 2),
                ],
            )
            .section(
                "S3",
                vec![
                    CostField::gigabytes(keys::S3_SIZE, "Size", 5),
                    CostField::dollars(keys::S3_MONTHLY, "Monthly", 2),
                ],
            )
            .section(
                "RDS",
                vec![
                    CostField::dollars(keys::RDS_HOURLY, "Hourly", 2),
                    CostField::dollars(keys::RDS_MONTHLY, "Monthly", 2),
                ],
            )
            .totals(vec![
                CostField::dollars(keys::TOTAL_HOURLY, "Total Hourly", 2),
                CostField::dollars(keys::TOTAL_MONTHLY, "Total Monthly", 2),
            ])
    }

    /// Report title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Sections in display order.
    #[must_use]
    pub fn sections(&self) -> &[CostSection] {
        &self.sections
    }

    /// Titles of the per-service sections, excluding the totals box.
    #[must_use]
    pub fn section_titles(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|s| !s.emphasis)
            .map(|s| s.title.as_str())
            .collect()
    }

    /// Every field across all sections, in display order.
    pub fn fields(&self) -> impl Iterator<Item = &CostField> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for [`ReportLayout`].
///
/// The totals section, if any, is always placed last.
#[derive(Debug, Default)]
pub struct ReportLayoutBuilder {
    title: Option<String>,
    sections: Vec<CostSection>,
    totals: Option<CostSection>,
}

impl ReportLayoutBuilder {
    /// Override the report title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a service section.
    #[must_use]
    pub fn section(mut self, title: impl Into<String>, fields: Vec<CostField>) -> Self {
        self.sections.push(CostSection {
            title: title.into(),
            fields,
            emphasis: false,
        });
        self
    }

    /// Set the highlighted totals section.
    #[must_use]
    pub fn totals(mut self, fields: Vec<CostField>) -> Self {
        self.totals = Some(CostSection {
            title: "Total".to_string(),
            fields,
            emphasis: true,
        });
        self
    }

    /// Finish the layout.
    #[must_use]
    pub fn build(self) -> ReportLayout {
        let mut sections = self.sections;
        sections.extend(self.totals);
        ReportLayout {
            title: self
                .title
                .unwrap_or_else(|| ReportLayout::DEFAULT_TITLE.to_string()),
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_zero() {
        let report = CostReport::new();
        assert!(report.get(keys::EC2_HOURLY).abs() < f64::EPSILON);
        assert!(!report.contains(keys::EC2_HOURLY));
        assert!(report.is_empty());
    }

    #[test]
    fn test_field_precision() {
        assert_eq!(FieldFormat::Dollars { precision: 3 }.format(0.125), "$0.125");
        assert_eq!(FieldFormat::Dollars { precision: 2 }.format(0.0), "$0.00");
        assert_eq!(
            FieldFormat::Gigabytes { precision: 5 }.format(12.345_67),
            "12.34567 GB"
        );
        assert_eq!(FieldFormat::Gigabytes { precision: 5 }.format(0.0), "0.00000 GB");
    }

    #[test]
    fn test_from_json_accepts_integers_and_nulls() {
        let report =
            CostReport::from_json_str(r#"{"ec2_monthly": 91, "s3_size": null}"#).unwrap();
        assert!((report.get(keys::EC2_MONTHLY) - 91.0).abs() < f64::EPSILON);
        assert!(!report.contains(keys::S3_SIZE));
        assert_eq!(report.len(), 1);
        assert!(!report.is_empty());
    }

    #[test]
    fn test_from_json_rejects_negative_and_non_numeric() {
        let err = CostReport::from_json_str(r#"{"ec2_hourly": -1.0}"#).unwrap_err();
        assert!(err.to_string().contains("ec2_hourly"));

        let err = CostReport::from_json_str(r#"{"ec2_hourly": "cheap"}"#).unwrap_err();
        assert!(err.to_string().contains("expected a number"));

        assert!(CostReport::from_json_str("[1, 2]").is_err());
    }

    #[test]
    fn test_standard_layout_order() {
        let layout = ReportLayout::standard();
        assert_eq!(layout.title(), "AWS Daily Cost Report");
        assert_eq!(layout.section_titles(), vec!["EC2", "S3", "RDS"]);

        let keys: Vec<&str> = layout.fields().map(|f| f.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "ec2_hourly",
                "ec2_monthly",
                "s3_size",
                "s3_monthly",
                "rds_hourly",
                "rds_monthly",
                "total_hourly",
                "total_monthly",
            ]
        );
        assert!(layout.sections().last().unwrap().emphasis);
    }

    #[test]
    fn test_extended_layout_keeps_totals_last() {
        let layout = ReportLayout::extended();
        assert_eq!(
            layout.section_titles(),
            vec!["EC2", "S3", "RDS", "EBS", "Route 53"]
        );
        let last = layout.sections().last().unwrap();
        assert!(last.emphasis);
        assert_eq!(last.fields[1].key, keys::TOTAL_MONTHLY);
    }

    #[test]
    fn test_builder_custom_section() {
        let layout = ReportLayout::builder()
            .title("Lab Costs")
            .totals(vec![CostField::dollars("total_monthly", "Total Monthly", 2)])
            .section("Lambda", vec![CostField::dollars("lambda_monthly", "Monthly", 4)])
            .build();

        assert_eq!(layout.title(), "Lab Costs");
        assert_eq!(layout.sections()[0].title, "Lambda");
        assert_eq!(layout.sections()[1].title, "Total");
    }
}
