//! Plain-text console preview.

use std::fmt::Write;

use estimator_cost::{CostReport, ReportLayout};

/// Render a short plain-text summary for the console.
#[must_use]
pub fn render_preview(layout: &ReportLayout, report: &CostReport) -> String {
    let mut text = format!("=== {} Preview ===\n", layout.title());

    for section in layout.sections() {
        for field in &section.fields {
            let value = field.render_value(report);
            if section.emphasis {
                let _ = writeln!(text, "{}: {value}", field.label);
            } else {
                let _ = writeln!(text, "{} {}: {value}", section.title, field.label);
            }
        }
    }

    text.push_str("=== End of Report ===\n");
    text
}
