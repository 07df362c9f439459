//! Report notification messages.

/// Subject line of every report notification.
pub const REPORT_SUBJECT: &str = "AWS Daily Cost Report";

/// The message sent at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportNotice {
    /// Report stored; links to view and download it.
    Available {
        view_url: String,
        download_url: String,
        /// Service sections covered by the report (e.g., "EC2", "S3").
        sections: Vec<String>,
        /// How long the links stay valid.
        valid_for_minutes: u64,
    },
    /// Report could not be stored, so there is no link.
    UploadFailed,
}

impl ReportNotice {
    /// Subject line.
    #[must_use]
    pub const fn subject(&self) -> &'static str {
        REPORT_SUBJECT
    }

    /// Plain-text message body.
    #[must_use]
    pub fn body(&self) -> String {
        match self {
            Self::Available {
                view_url,
                download_url,
                sections,
                valid_for_minutes,
            } => {
                let covered = if sections.is_empty() {
                    "a cost summary".to_string()
                } else {
                    format!("{} costs, and a total summary", sections.join(", "))
                };
                format!(
                    "AWS Cost Explorer Report Update:

Your daily AWS cost report has been generated and is available at the links below.
This report includes {covered} for your account.

View the full report:
{view_url}

Download a copy:
{download_url}

Both links expire in {valid_for_minutes} minutes.
"
                )
            }
            Self::UploadFailed => "AWS Cost Explorer Report Update:

Your daily AWS cost report has been generated.
However, the report upload failed and the download link is unavailable.
"
            .to_string(),
        }
    }

    /// Whether the notice carries links.
    #[must_use]
    pub const fn has_links(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}
