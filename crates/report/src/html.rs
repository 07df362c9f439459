//! HTML report renderer.

use std::fmt::Write;

use estimator_cost::{CostReport, CostSection, ReportLayout};

/// Renders cost reports as styled HTML pages.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    layout: ReportLayout,
}

impl HtmlRenderer {
    /// Create a renderer for the given layout.
    #[must_use]
    pub fn new(layout: ReportLayout) -> Self {
        Self { layout }
    }

    /// The layout this renderer follows.
    #[must_use]
    pub fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    /// Render a complete HTML document.
    #[must_use]
    pub fn render(&self, report: &CostReport) -> String {
        let title = html_escape(self.layout.title());

        let mut sections_html = String::new();
        for section in self.layout.sections() {
            sections_html.push_str(&Self::build_section_html(section, report));
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{title}</title>
    <style>
        body {{
            font-family: 'Segoe UI', Tahoma, sans-serif;
            margin: 0;
            padding: 0;
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
            background: linear-gradient(120deg, #a1c4fd, #c2e9fb);
        }}
        .report-container {{
            width: 90%;
            max-width: 700px;
            padding: 30px 40px;
            background: #ffffff;
            border-radius: 16px;
            box-shadow: 0 10px 25px rgba(0, 0, 0, 0.2);
        }}
        h1 {{
            text-align: center;
            font-size: 2.4rem;
            margin: 0 0 30px 0;
            color: #4338ca;
        }}
        .section {{
            margin-bottom: 24px;
            padding: 20px;
            border-radius: 10px;
            border-left: 6px solid #6366f1;
            background: linear-gradient(135deg, #fdfbfb, #ebedee);
        }}
        .section h2 {{
            margin: 0 0 14px 0;
            font-size: 1.4rem;
            color: #4f46e5;
        }}
        .cost-item {{
            display: flex;
            justify-content: space-between;
            padding: 8px 0;
            font-size: 1.1rem;
            border-bottom: 1px dashed #cccccc;
        }}
        .cost-item:last-child {{
            border-bottom: none;
        }}
        .label {{
            font-weight: 600;
            color: #1e293b;
        }}
        .value {{
            font-weight: 700;
            color: #dc2626;
        }}
        .total {{
            border: 2px dashed #facc15;
            background: #fef08a;
            text-align: center;
        }}
        .total .label {{
            color: #92400e;
        }}
        .total .value {{
            color: #b45309;
        }}
        @media (max-width: 620px) {{
            h1 {{
                font-size: 2rem;
            }}
        }}
    </style>
</head>
<body>
    <div class="report-container">
        <h1>{title}</h1>
{sections_html}    </div>
</body>
</html>
"#
        )
    }

    /// Build HTML for a single section.
    fn build_section_html(section: &CostSection, report: &CostReport) -> String {
        let mut html = String::new();

        if section.emphasis {
            html.push_str("        <div class=\"section total\">\n");
        } else {
            let _ = writeln!(
                html,
                "        <div class=\"section\">\n            <h2>{}</h2>",
                html_escape(&section.title)
            );
        }

        for field in &section.fields {
            let _ = writeln!(
                html,
                r#"            <div class="cost-item"><span class="label">{label}:</span><span class="value">{value}</span></div>"#,
                label = html_escape(&field.label),
                value = field.render_value(report),
            );
        }

        html.push_str("        </div>\n");
        html
    }
}

/// Simple HTML escaping for labels and titles.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use estimator_cost::CostField;

    fn sample_report() -> CostReport {
        [
            ("ec2_hourly", 0.125),
            ("ec2_monthly", 91.25),
            ("s3_size", 12.345_67),
            ("s3_monthly", 0.28),
            ("rds_hourly", 0.02),
            ("rds_monthly", 14.60),
            ("total_hourly", 0.145),
            ("total_monthly", 105.85),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_render_contains_formatted_values() {
        let html = HtmlRenderer::default().render(&sample_report());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("$0.125"));
        assert!(html.contains("$91.25"));
        assert!(html.contains("12.34567 GB"));
        assert!(html.contains("$105.85"));
        assert!(html.contains("<h2>EC2</h2>"));
        assert!(html.contains(r#"<div class="section total">"#));
    }

    #[test]
    fn test_render_empty_report_prints_zeros() {
        let html = HtmlRenderer::default().render(&CostReport::new());
        assert!(html.contains(
            r#"<span class="label">Hourly:</span><span class="value">$0.000</span>"#
        ));
        assert!(html.contains(
            r#"<span class="label">Size:</span><span class="value">0.00000 GB</span>"#
        ));
        assert!(html.contains(
            r#"<span class="label">Total Monthly:</span><span class="value">$0.00</span>"#
        ));
    }

    /// Contents of every value cell, in document order.
    fn rendered_values(html: &str) -> Vec<&str> {
        html.split(r#"<span class="value">"#)
            .skip(1)
            .filter_map(|rest| rest.split_once("</span>").map(|(value, _)| value))
            .collect()
    }

    #[test]
    fn test_render_any_subset_of_fields() {
        // (key, value, rendered when present, rendered when absent), in layout order.
        let table = [
            ("ec2_hourly", 1.25, "$1.250", "$0.000"),
            ("ec2_monthly", 2.5, "$2.50", "$0.00"),
            ("s3_size", 3.125, "3.12500 GB", "0.00000 GB"),
            ("s3_monthly", 4.75, "$4.75", "$0.00"),
            ("rds_hourly", 5.5, "$5.50", "$0.00"),
            ("rds_monthly", 6.25, "$6.25", "$0.00"),
            ("ebs_monthly", 7.5, "$7.50", "$0.00"),
            ("route53_monthly", 8.75, "$8.75", "$0.00"),
            ("total_hourly", 9.5, "$9.50", "$0.00"),
            ("total_monthly", 10.25, "$10.25", "$0.00"),
        ];
        let renderer = HtmlRenderer::new(ReportLayout::extended());

        for mask in 0u32..(1 << table.len()) {
            let present = |i: usize| mask & (1 << i) != 0;
            let report: CostReport = table
                .iter()
                .enumerate()
                .filter(|(i, _)| present(*i))
                .map(|(_, (key, value, _, _))| (*key, *value))
                .collect();

            let expected: Vec<&str> = table
                .iter()
                .enumerate()
                .map(|(i, (_, _, shown, zero))| if present(i) { *shown } else { *zero })
                .collect();

            let html = renderer.render(&report);
            assert_eq!(rendered_values(&html), expected, "subset mask {mask:#012b}");
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = HtmlRenderer::new(ReportLayout::extended());
        let report = sample_report();
        assert_eq!(renderer.render(&report), renderer.render(&report));
    }

    #[test]
    fn test_extended_layout_renders_extra_sections() {
        let report: CostReport = [("ebs_monthly", 8.0), ("route53_monthly", 0.5)]
            .into_iter()
            .collect();
        let html = HtmlRenderer::new(ReportLayout::extended()).render(&report);
        assert!(html.contains("<h2>EBS</h2>"));
        assert!(html.contains("<h2>Route 53</h2>"));
        assert!(html.contains("$8.00"));
        assert!(html.contains("$0.50"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let layout = ReportLayout::builder()
            .title("Costs <prod>")
            .section("R&D", vec![CostField::dollars("rd", "Spend", 2)])
            .build();
        let html = HtmlRenderer::new(layout).render(&CostReport::new());
        assert!(html.contains("<title>Costs &lt;prod&gt;</title>"));
        assert!(html.contains("<h2>R&amp;D</h2>"));
    }
}
