//! Aggregate statistics over canonical host records.
//!
//! Pure functions: every call receives its whole input as a parameter and
//! returns a freshly built [`SummaryStats`], so concurrent invocations can
//! interleave freely.

use crate::models::{CountMap, HostRecord, SummaryStats};
use std::collections::HashSet;

/// Number of entries kept in the top-countries / top-organizations tables.
const TOP_N: usize = 5;

/// Compute corpus-level statistics for a batch of canonical records.
///
/// An empty batch yields the all-zero default. A field that is absent on
/// every record computes to zero or an empty table, never an error.
pub fn summarize(hosts: &[HostRecord]) -> SummaryStats {
    if hosts.is_empty() {
        return SummaryStats::default();
    }

    let unique_ips = hosts
        .iter()
        .map(|h| h.ip.as_str())
        .collect::<HashSet<_>>()
        .len();

    let unique_countries = hosts
        .iter()
        .filter_map(|h| h.country.as_deref())
        .collect::<HashSet<_>>()
        .len();

    SummaryStats {
        total_hosts: hosts.len(),
        unique_ips,
        unique_countries,
        total_services: hosts.iter().map(|h| h.service_count).sum(),
        total_vulnerabilities: hosts.iter().map(|h| h.vulnerability_count).sum(),
        critical_vulnerability_hosts: hosts.iter().filter(|h| h.has_critical_vulns).count(),
        malware_detected_hosts: hosts.iter().filter(|h| h.has_malware()).count(),
        top_countries: CountMap::tally(hosts.iter().filter_map(|h| h.country.as_deref()))
            .top(TOP_N),
        top_organizations: CountMap::tally(hosts.iter().filter_map(|h| h.organization.as_deref()))
            .top(TOP_N),
        risk_levels: CountMap::tally(hosts.iter().filter_map(|h| h.risk_level.as_deref())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::BTreeSet;

    fn test_host(ip: &str, country: Option<&str>) -> HostRecord {
        HostRecord {
            ip: ip.to_string(),
            ports: Vec::new(),
            protocols: BTreeSet::new(),
            service_count: 0,
            country: country.map(str::to_string),
            city: None,
            asn: None,
            organization: None,
            hostname: None,
            vulnerabilities: Vec::new(),
            vulnerability_count: 0,
            malware_detected: None,
            risk_level: None,
            has_critical_vulns: false,
        }
    }

    #[test]
    fn test_summarize_empty_input() {
        let stats = summarize(&[]);
        assert_eq!(stats, SummaryStats::default());
        assert_eq!(stats.total_hosts, 0);
        assert!(stats.top_countries.is_empty());
        assert!(stats.risk_levels.is_empty());
    }

    #[test]
    fn test_summarize_single_record() {
        let mut host = test_host("1.1.1.1", Some("US"));
        host.service_count = 1;
        host.vulnerability_count = 1;
        host.has_critical_vulns = true;

        let stats = summarize(&[host]);

        assert_eq!(stats.total_hosts, 1);
        assert_eq!(stats.unique_ips, 1);
        assert_eq!(stats.unique_countries, 1);
        assert_eq!(stats.total_services, 1);
        assert_eq!(stats.total_vulnerabilities, 1);
        assert_eq!(stats.critical_vulnerability_hosts, 1);
        assert_eq!(stats.malware_detected_hosts, 0);
        assert_eq!(stats.top_countries.get("US"), Some(1));
    }

    #[test]
    fn test_top_countries_ordered_by_frequency() {
        let hosts = vec![
            test_host("1.1.1.1", Some("US")),
            test_host("1.1.1.2", Some("DE")),
            test_host("1.1.1.3", Some("US")),
        ];

        let stats = summarize(&hosts);

        let entries: Vec<_> = stats.top_countries.iter().collect();
        assert_eq!(entries, vec![("US", 2), ("DE", 1)]);
        assert_eq!(
            serde_json::to_string(&stats.top_countries).unwrap(),
            r#"{"US":2,"DE":1}"#
        );
    }

    #[test]
    fn test_top_tables_truncate_to_five() {
        let hosts: Vec<HostRecord> = ["AU", "BR", "CA", "DK", "EE", "FI", "GR"]
            .iter()
            .enumerate()
            .map(|(i, c)| test_host(&format!("10.0.0.{}", i), Some(c)))
            .collect();

        let stats = summarize(&hosts);

        assert_eq!(stats.unique_countries, 7);
        assert_eq!(stats.top_countries.len(), 5);
    }

    #[test]
    fn test_duplicate_ips_counted_once() {
        let hosts = vec![
            test_host("1.1.1.1", None),
            test_host("1.1.1.1", None),
            test_host("2.2.2.2", None),
        ];

        let stats = summarize(&hosts);
        assert_eq!(stats.total_hosts, 3);
        assert_eq!(stats.unique_ips, 2);
    }

    #[test]
    fn test_absent_fields_yield_empty_tables() {
        let hosts = vec![test_host("1.1.1.1", None), test_host("1.1.1.2", None)];

        let stats = summarize(&hosts);

        assert_eq!(stats.unique_countries, 0);
        assert!(stats.top_countries.is_empty());
        assert!(stats.top_organizations.is_empty());
        assert!(stats.risk_levels.is_empty());
    }

    #[test]
    fn test_risk_levels_exclude_absent_values() {
        let mut high = test_host("1.1.1.1", None);
        high.risk_level = Some("high".to_string());
        let mut low = test_host("1.1.1.2", None);
        low.risk_level = Some("low".to_string());
        let missing = test_host("1.1.1.3", None);

        let stats = summarize(&[high, low, missing]);

        assert_eq!(stats.risk_levels.len(), 2);
        assert_eq!(stats.risk_levels.get("high"), Some(1));
        assert_eq!(stats.risk_levels.get("low"), Some(1));
    }

    #[test]
    fn test_malware_hosts_require_truthy_value() {
        let mut active = test_host("1.1.1.1", None);
        active.malware_detected = Some(json!({"family": "Mirai"}));
        let mut null_marker = test_host("1.1.1.2", None);
        null_marker.malware_detected = Some(Value::Null);
        let clear = test_host("1.1.1.3", None);

        let stats = summarize(&[active, null_marker, clear]);
        assert_eq!(stats.malware_detected_hosts, 1);
    }
}
