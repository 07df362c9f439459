//! Rendering of cost reports.
//!
//! [`HtmlRenderer`] turns a [`CostReport`] into a self-contained HTML page
//! following a [`ReportLayout`]. Rendering is pure: the same report always
//! produces byte-identical output, and absent fields print as zero.

mod html;
mod preview;

pub use html::HtmlRenderer;
pub use preview::render_preview;

pub use estimator_cost::{CostReport, ReportLayout};

/// A rendered report and where it should be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// Local file name for operator inspection.
    pub file_name: String,
    /// Object key in the report store.
    pub storage_key: String,
    /// Complete HTML document.
    pub html: String,
}

impl RenderedReport {
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        storage_key: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            storage_key: storage_key.into(),
            html: html.into(),
        }
    }
}
