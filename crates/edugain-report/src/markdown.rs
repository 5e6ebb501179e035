//! Markdown rendering of gains reports.

use edugain_core::engine::GainChart;
use edugain_core::report::GainsReport;

/// Escape characters that would break a markdown table cell.
fn cell(s: &str) -> String {
    s.replace('|', "\\|")
}

fn chart_row(chart: &GainChart) -> String {
    format!(
        "| {} | {:.2} | {:.2} | {:.2} | {:.2} | {:+.3} | {:.3} | {:.4} |\n",
        cell(&chart.question),
        chart.pre_control,
        chart.post_control,
        chart.pre_intervention,
        chart.post_intervention,
        chart.beta1,
        chart.r_squared,
        chart.p_value,
    )
}

/// Format a gains report as markdown.
pub fn generate_markdown(report: &GainsReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("## Learning gains: {}\n\n", report.experiment.name));
    md.push_str(&format!(
        "**Summary:** {} question pairs, {} significant at 5%, {} participations, cohorts: {}\n\n",
        report.charts.len(),
        report.significant().count(),
        report.experiment.participations,
        report.experiment.cohorts.join(", "),
    ));
    md.push_str(&format!(
        "_Generated {}_\n\n",
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if report.charts.is_empty() {
        md.push_str("No matched question pairs with results yet.\n");
        return md;
    }

    md.push_str("| Question | Pre control | Post control | Pre intervention | Post intervention | Effect | R² | p |\n");
    md.push_str("|----------|-------------|--------------|------------------|-------------------|--------|----|---|\n");
    for chart in &report.charts {
        md.push_str(&chart_row(chart));
    }
    md.push('\n');

    md.push_str("### Interpretation\n\n");
    for chart in &report.charts {
        md.push_str(&format!("- **{}**: {}\n", chart.question, chart.message));
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use edugain_core::report::ExperimentSummary;
    use uuid::Uuid;

    fn chart(question: &str, p_value: f64) -> GainChart {
        GainChart {
            question: question.into(),
            pre_control: 0.25,
            post_control: 0.5,
            pre_intervention: 0.25,
            post_intervention: 0.9,
            beta0: 0.25,
            beta1: 0.375,
            r_squared: 0.41,
            p_value,
            message: "Results are marginally significant. Consider more data to confirm findings."
                .into(),
        }
    }

    fn make_report(charts: Vec<GainChart>) -> GainsReport {
        GainsReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            experiment: ExperimentSummary {
                id: "1".into(),
                name: "Fractions workshop".into(),
                cohorts: vec!["Control".into(), "Intervention".into()],
                participations: 240,
            },
            charts,
        }
    }

    #[test]
    fn markdown_output() {
        let md = generate_markdown(&make_report(vec![
            chart("Half of 8?", 0.07),
            chart("A | B", 0.01),
        ]));

        assert!(md.contains("## Learning gains: Fractions workshop"));
        assert!(md.contains("2 question pairs, 1 significant at 5%, 240 participations"));
        assert!(md.contains("| Half of 8? | 0.25 | 0.50 | 0.25 | 0.90 | +0.375 | 0.410 | 0.0700 |"));
        assert!(md.contains("A \\| B"));
        assert!(md.contains("- **Half of 8?**: Results are marginally significant."));
    }

    #[test]
    fn empty_report_says_so() {
        let md = generate_markdown(&make_report(vec![]));
        assert!(md.contains("No matched question pairs"));
        assert!(!md.contains("| Question |"));
    }
}
