//! Host data input loading.
//!
//! Reads raw host records from a JSON document. Both shapes seen in the
//! wild are accepted: a bare array of records, or a wrapper object with a
//! `hosts` array (export files often carry metadata next to the records).

use serde_json::{json, Value};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading host data.
#[derive(Error, Debug)]
pub enum InputError {
    /// The input file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The input file is not valid JSON.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    /// The JSON parsed but is neither an array nor a `hosts` wrapper.
    #[error("expected a JSON array of host records or an object with a `hosts` array")]
    Shape,
}

/// Load raw host records from a JSON file.
pub fn load_hosts(path: &Path) -> Result<Vec<Value>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let data: Value = serde_json::from_str(&content).map_err(|source| InputError::Json {
        path: path.display().to_string(),
        source,
    })?;

    let hosts = extract_hosts(data)?;
    debug!("Loaded {} raw host records from {}", hosts.len(), path.display());
    Ok(hosts)
}

/// Pull the record array out of a parsed document.
fn extract_hosts(data: Value) -> Result<Vec<Value>, InputError> {
    match data {
        Value::Array(hosts) => Ok(hosts),
        Value::Object(mut wrapper) => match wrapper.remove("hosts") {
            Some(Value::Array(hosts)) => Ok(hosts),
            _ => Err(InputError::Shape),
        },
        _ => Err(InputError::Shape),
    }
}

/// Built-in sample corpus for trial runs without an input file.
pub fn sample_hosts() -> Vec<Value> {
    vec![
        json!({
            "ip": "8.8.8.8",
            "services": [{"port": 53, "protocol": "udp"}, {"port": 443, "protocol": "tcp"}],
            "location": {"country": "United States", "country_code": "US", "city": "Mountain View"},
            "autonomous_system": {"asn": 15169, "name": "Google LLC"},
            "dns": {"hostname": "dns.google"}
        }),
        json!({
            "ip": "203.0.113.7",
            "services": [
                {
                    "port": 22,
                    "protocol": "tcp",
                    "vulnerabilities": [
                        {"cve": "CVE-2023-48795", "severity": "medium", "cvss": 5.9}
                    ]
                },
                {
                    "port": 8080,
                    "protocol": "tcp",
                    "vulnerabilities": [
                        {"cve": "CVE-2021-44228", "severity": "critical", "cvss": 10.0, "kev": true}
                    ],
                    "malware_detected": {"family": "Cobalt Strike", "confidence": "high"}
                }
            ],
            "location": {"country": "Germany", "country_code": "DE", "city": "Falkenstein"},
            "autonomous_system": {"asn": 24940, "name": "Hetzner Online GmbH"},
            "threat_intelligence": {"risk_level": "critical"}
        }),
        json!({
            "ip": "198.51.100.23",
            "services": [{"port": 80, "protocol": "tcp"}],
            "location": {"country_code": "NL"},
            "threat_intelligence": {"risk_level": "low"}
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_bare_array() {
        let file = write_temp(r#"[{"ip": "1.1.1.1"}, {"ip": "2.2.2.2"}]"#);
        let hosts = load_hosts(file.path()).unwrap();
        assert_eq!(hosts.len(), 2);
    }

    #[test]
    fn test_load_wrapped_hosts() {
        let file = write_temp(r#"{"metadata": {"source": "export"}, "hosts": [{"ip": "1.1.1.1"}]}"#);
        let hosts = load_hosts(file.path()).unwrap();
        assert_eq!(hosts.len(), 1);
    }

    #[test]
    fn test_load_rejects_wrong_shape() {
        let file = write_temp(r#"{"records": []}"#);
        assert!(matches!(load_hosts(file.path()), Err(InputError::Shape)));

        let file = write_temp(r#""just a string""#);
        assert!(matches!(load_hosts(file.path()), Err(InputError::Shape)));
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let file = write_temp("not json at all {{{");
        assert!(matches!(load_hosts(file.path()), Err(InputError::Json { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let path = Path::new("/nonexistent/hosts.json");
        assert!(matches!(load_hosts(path), Err(InputError::Io { .. })));
    }

    #[test]
    fn test_sample_hosts_pass_validation() {
        let hosts = sample_hosts();
        assert!(!hosts.is_empty());
        assert!(hosts.iter().all(crate::pipeline::validate));
    }

    #[test]
    fn test_fixture_corpus_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/sample_hosts.json");
        let hosts = load_hosts(&path).unwrap();
        assert!(hosts.len() >= 3);
    }
}
