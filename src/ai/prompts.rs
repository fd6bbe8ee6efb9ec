//! Prompt construction for the narrative collaborator.
//!
//! Three presets are supported, each with its own prompt wording and token
//! budget. Prompt wording is policy, not core logic; changing it does not
//! affect the normalization pipeline.

use crate::models::{HostRecord, SummaryType};

/// Token budget for the main narrative call.
pub fn narrative_max_tokens(summary_type: SummaryType) -> u32 {
    match summary_type {
        SummaryType::Brief => 500,
        SummaryType::Technical => 2000,
        SummaryType::Detailed => 1500,
    }
}

/// Number of key insights to extract from the narrative.
pub fn insight_count(summary_type: SummaryType) -> usize {
    match summary_type {
        SummaryType::Brief => 3,
        _ => 5,
    }
}

/// System prompt framing the analyst role for the narrative call.
pub fn system_prompt(summary_type: SummaryType) -> String {
    format!(
        "You are a cybersecurity analyst providing a {} security analysis.",
        summary_type
    )
}

/// Build the summarization prompt for a batch of canonical host records.
pub fn summarization_prompt(hosts: &[HostRecord], summary_type: SummaryType) -> String {
    let host_data = serde_json::to_string_pretty(hosts).unwrap_or_else(|_| "[]".to_string());

    match summary_type {
        SummaryType::Brief => format!(
            "Analyze this host scan data and provide a BRIEF executive summary \
             (3-4 paragraphs max).\n\n{host_data}\n\n\
             Focus on:\n\
             - Total hosts and locations\n\
             - Most critical vulnerabilities (CVE IDs only)\n\
             - Any malware detected\n\
             - Overall risk level\n\n\
             Keep it concise and high-level. No detailed explanations."
        ),
        SummaryType::Technical => format!(
            "Analyze this host scan data and provide a DETAILED TECHNICAL analysis \
             for security engineers.\n\n{host_data}\n\n\
             Include:\n\
             1. Complete vulnerability breakdown (all CVEs with CVSS scores, exploit status)\n\
             2. Service enumeration (protocols, ports, software versions)\n\
             3. Malware technical details (C2 infrastructure, threat actor TTPs)\n\
             4. Network infrastructure (ASNs, DNS, hosting providers)\n\
             5. Specific exploitation paths and attack vectors\n\
             6. Technical remediation steps with commands/procedures\n\n\
             Use technical terminology. Be comprehensive and detailed."
        ),
        SummaryType::Detailed => format!(
            "Analyze this host scan data and provide a DETAILED security analysis \
             for SOC analysts.\n\n{host_data}\n\n\
             Provide a structured analysis including:\n\
             1. **Overview**: Host count, geographic distribution, organizations\n\
             2. **Vulnerability Analysis**:\n\
                - CVEs with severity levels and CVSS scores\n\
                - Known exploited vulnerabilities (KEVs)\n\
                - Affected hosts\n\
             3. **Malware & Threats**:\n\
                - Detected malware families\n\
                - Threat actor associations\n\
                - C2 infrastructure\n\
             4. **Service Exposure**:\n\
                - Running services and protocols\n\
                - Misconfigurations\n\
             5. **Risk Assessment**: Overall security posture\n\
             6. **Recommendations**: Prioritized action items\n\n\
             Balance technical detail with readability. Be specific about CVE IDs \
             and threat actors."
        ),
    }
}

/// Build the insight-extraction prompt from a finished narrative.
pub fn insights_prompt(narrative: &str, summary_type: SummaryType) -> String {
    match summary_type {
        SummaryType::Brief => format!(
            "From this brief analysis, list exactly 3 key security concerns as \
             bullet points:\n\n{narrative}\n\n\
             Format as:\n\
             - [First concern]\n\
             - [Second concern]\n\
             - [Third concern]\n\n\
             One sentence each."
        ),
        _ => format!(
            "From this security analysis, extract exactly 5 key insights as \
             bullet points:\n\n{narrative}\n\n\
             Format as:\n\
             - [First key insight]\n\
             - [Second key insight]\n\
             - [Third key insight]\n\
             - [Fourth key insight]\n\
             - [Fifth key insight]\n\n\
             One concise sentence each. Focus on most critical findings."
        ),
    }
}

/// Build the risk-assessment prompt from a finished narrative.
pub fn risk_prompt(narrative: &str, summary_type: SummaryType) -> String {
    format!(
        "Based on this analysis, provide a {summary_type} security risk assessment \
         (2-3 sentences):\n\n{narrative}\n\n\
         Focus on overall risk level and priority actions needed."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_budgets_per_preset() {
        assert_eq!(narrative_max_tokens(SummaryType::Brief), 500);
        assert_eq!(narrative_max_tokens(SummaryType::Technical), 2000);
        assert_eq!(narrative_max_tokens(SummaryType::Detailed), 1500);
    }

    #[test]
    fn test_insight_count_per_preset() {
        assert_eq!(insight_count(SummaryType::Brief), 3);
        assert_eq!(insight_count(SummaryType::Technical), 5);
        assert_eq!(insight_count(SummaryType::Detailed), 5);
    }

    #[test]
    fn test_summarization_prompt_embeds_host_data() {
        let hosts = crate::pipeline::clean(&[serde_json::json!({"ip": "9.9.9.9"})]);

        let brief = summarization_prompt(&hosts, SummaryType::Brief);
        assert!(brief.contains("9.9.9.9"));
        assert!(brief.contains("BRIEF"));

        let technical = summarization_prompt(&hosts, SummaryType::Technical);
        assert!(technical.contains("TECHNICAL"));

        let detailed = summarization_prompt(&hosts, SummaryType::Detailed);
        assert!(detailed.contains("SOC analysts"));
        assert!(detailed.contains("KEV"));
    }

    #[test]
    fn test_insights_prompt_asks_for_three_bullets_when_brief() {
        let brief = insights_prompt("narrative text", SummaryType::Brief);
        assert!(brief.contains("exactly 3"));

        let detailed = insights_prompt("narrative text", SummaryType::Detailed);
        assert!(detailed.contains("exactly 5"));
    }

    #[test]
    fn test_system_prompt_names_preset() {
        assert!(system_prompt(SummaryType::Technical).contains("technical"));
    }
}
