//! Markdown and JSON report generation.
//!
//! Renders the assembled [`ScanReport`] for human consumption. Section
//! toggles come from the `[report]` table of the configuration file.

use crate::config::ReportConfig;
use crate::models::{CountMap, NarrativeSummary, ScanMetadata, ScanReport, SummaryStats};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &ScanReport, options: &ReportConfig) -> String {
    let mut output = String::new();

    output.push_str("# Host Scan Summary\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));

    if let Some(ref narrative) = report.narrative {
        output.push_str(&generate_narrative_section(narrative, options));
    }

    if options.include_stats {
        output.push_str(&generate_stats_section(&report.stats));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &ScanReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ScanMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Input:** {}\n", metadata.input));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(ref model) = metadata.model_used {
        section.push_str(&format!("- **Model Used:** `{}`\n", model));
        section.push_str(&format!("- **Summary Type:** {}\n", metadata.summary_type));
    }
    section.push_str(&format!(
        "- **Hosts Received:** {}\n",
        metadata.hosts_received
    ));
    section.push_str(&format!(
        "- **Hosts Normalized:** {}\n",
        metadata.hosts_normalized
    ));
    if metadata.hosts_dropped > 0 {
        section.push_str(&format!("- **Hosts Dropped:** {}\n", metadata.hosts_dropped));
    }
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the narrative sections.
fn generate_narrative_section(narrative: &NarrativeSummary, options: &ReportConfig) -> String {
    let mut section = String::new();

    section.push_str("## Security Analysis\n\n");
    section.push_str(&narrative.summary);
    section.push_str("\n\n");

    if options.include_insights && !narrative.key_insights.is_empty() {
        section.push_str("### Key Insights\n\n");
        for insight in &narrative.key_insights {
            section.push_str(&format!("- {}\n", insight));
        }
        section.push('\n');
    }

    if options.include_risk_assessment && !narrative.risk_assessment.is_empty() {
        section.push_str("### Risk Assessment\n\n");
        section.push_str(&narrative.risk_assessment);
        section.push_str("\n\n");
    }

    section
}

/// Generate the statistics section.
fn generate_stats_section(stats: &SummaryStats) -> String {
    let mut section = String::new();

    section.push_str("## Statistics\n\n");

    section.push_str("### Overview\n\n");
    section.push_str("| Hosts | Unique IPs | Countries | Services | Vulnerabilities |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        stats.total_hosts,
        stats.unique_ips,
        stats.unique_countries,
        stats.total_services,
        stats.total_vulnerabilities
    ));

    section.push_str(&format!(
        "- **Hosts with critical vulnerabilities:** {}\n",
        stats.critical_vulnerability_hosts
    ));
    section.push_str(&format!(
        "- **Hosts with malware detected:** {}\n\n",
        stats.malware_detected_hosts
    ));

    section.push_str(&generate_count_table(
        "Top Countries",
        "Country",
        &stats.top_countries,
    ));
    section.push_str(&generate_count_table(
        "Top Organizations",
        "Organization",
        &stats.top_organizations,
    ));
    section.push_str(&generate_count_table(
        "Risk Levels",
        "Risk Level",
        &stats.risk_levels,
    ));

    section
}

/// Generate one ranked count table, skipped entirely when empty.
fn generate_count_table(title: &str, label: &str, counts: &CountMap) -> String {
    if counts.is_empty() {
        return String::new();
    }

    let mut table = String::new();
    table.push_str(&format!("### {}\n\n", title));
    table.push_str(&format!("| {} | Hosts |\n", label));
    table.push_str("|:---|:---:|\n");

    for (value, count) in counts.iter() {
        table.push_str(&format!("| {} | {} |\n", value, count));
    }
    table.push('\n');

    table
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!(
        "---\n\n*Generated by scansum v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CountMap, NarrativeSummary, ScanMetadata, SummaryType};
    use chrono::Utc;

    fn create_test_report() -> ScanReport {
        ScanReport {
            metadata: ScanMetadata {
                input: "fixtures/sample_hosts.json".to_string(),
                generated_at: Utc::now(),
                model_used: Some("llama-3.3-70b-versatile".to_string()),
                summary_type: SummaryType::Detailed,
                hosts_received: 4,
                hosts_normalized: 3,
                hosts_dropped: 1,
                duration_seconds: 12.5,
            },
            narrative: Some(NarrativeSummary {
                summary: "Three hosts expose services across two countries.".to_string(),
                key_insights: vec![
                    "One host carries a critical Log4j vulnerability".to_string(),
                    "Cobalt Strike beacon detected on one host".to_string(),
                ],
                risk_assessment: "Overall risk is high; patch the exposed host first."
                    .to_string(),
                host_count: 3,
            }),
            stats: SummaryStats {
                total_hosts: 3,
                unique_ips: 3,
                unique_countries: 2,
                total_services: 5,
                total_vulnerabilities: 2,
                critical_vulnerability_hosts: 1,
                malware_detected_hosts: 1,
                top_countries: CountMap::tally(["US", "US", "DE"]),
                top_organizations: CountMap::tally(["Google LLC"]),
                risk_levels: CountMap::tally(["critical", "low"]),
            },
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, &ReportConfig::default());

        assert!(markdown.contains("# Host Scan Summary"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Security Analysis"));
        assert!(markdown.contains("### Key Insights"));
        assert!(markdown.contains("### Risk Assessment"));
        assert!(markdown.contains("## Statistics"));
        assert!(markdown.contains("| US | 2 |"));
        assert!(markdown.contains("Cobalt Strike"));
        assert!(markdown.contains("**Hosts Dropped:** 1"));
    }

    #[test]
    fn test_markdown_without_narrative_skips_analysis() {
        let mut report = create_test_report();
        report.narrative = None;
        report.metadata.model_used = None;

        let markdown = generate_markdown_report(&report, &ReportConfig::default());

        assert!(!markdown.contains("## Security Analysis"));
        assert!(!markdown.contains("Model Used"));
        assert!(markdown.contains("## Statistics"));
    }

    #[test]
    fn test_report_config_toggles_sections() {
        let report = create_test_report();
        let options = ReportConfig {
            include_insights: false,
            include_risk_assessment: false,
            include_stats: false,
        };

        let markdown = generate_markdown_report(&report, &options);

        assert!(markdown.contains("## Security Analysis"));
        assert!(!markdown.contains("### Key Insights"));
        assert!(!markdown.contains("### Risk Assessment"));
        assert!(!markdown.contains("## Statistics"));
    }

    #[test]
    fn test_empty_count_tables_skipped() {
        let mut report = create_test_report();
        report.stats.top_organizations = CountMap::default();

        let markdown = generate_markdown_report(&report, &ReportConfig::default());

        assert!(markdown.contains("### Top Countries"));
        assert!(!markdown.contains("### Top Organizations"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"total_hosts\""));
        assert!(json.contains("\"key_insights\""));
        assert!(json.contains("\"top_countries\""));
    }
}
