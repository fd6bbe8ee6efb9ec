//! Host record normalization.
//!
//! Flattens heterogeneous, partially-missing raw host records into the
//! canonical [`HostRecord`] schema. Records without a usable IP are dropped
//! with a warning routed through a [`DropSink`]; nothing in here returns an
//! error or panics on malformed shapes.

use crate::models::HostRecord;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::warn;

/// Receives a notification for every raw record dropped by validation.
///
/// Injected into [`clean_with`] so drop diagnostics are observable in tests
/// without capturing process-wide log output.
pub trait DropSink {
    /// Called once per dropped record with its input index.
    fn record_dropped(&mut self, index: usize, record: &Value);
}

/// Default sink: routes drop warnings to the process log.
pub struct TracingSink;

impl DropSink for TracingSink {
    fn record_dropped(&mut self, index: usize, record: &Value) {
        warn!("Skipping invalid host record at index {}: {}", index, record);
    }
}

/// Whether a raw record has the minimum required shape: an `ip` key holding
/// a non-empty string. No other field is checked.
pub fn validate(record: &Value) -> bool {
    record
        .get("ip")
        .and_then(Value::as_str)
        .is_some_and(|ip| !ip.is_empty())
}

/// Normalize a batch of raw records, logging a warning per dropped record.
pub fn clean(records: &[Value]) -> Vec<HostRecord> {
    clean_with(records, &mut TracingSink)
}

/// Normalize a batch of raw records, reporting drops to the given sink.
///
/// Surviving records keep their relative input order; drops never shift
/// them. An empty result is a valid outcome, not an error.
pub fn clean_with(records: &[Value], sink: &mut dyn DropSink) -> Vec<HostRecord> {
    let mut cleaned = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        if validate(record) {
            cleaned.push(normalize(record));
        } else {
            sink.record_dropped(index, record);
        }
    }

    cleaned
}

/// Flatten one validated raw record into the canonical schema.
fn normalize(record: &Value) -> HostRecord {
    let empty = Vec::new();
    let services = record
        .get("services")
        .and_then(Value::as_array)
        .unwrap_or(&empty);

    let mut ports = Vec::new();
    let mut protocols = BTreeSet::new();
    let mut vulnerabilities: Vec<Value> = Vec::new();

    for service in services {
        // Falsy filtering: port 0 is dropped, not retained.
        if let Some(port) = service
            .get("port")
            .and_then(Value::as_u64)
            .and_then(|p| u16::try_from(p).ok())
            .filter(|p| *p != 0)
        {
            ports.push(port);
        }

        if let Some(protocol) = service
            .get("protocol")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
        {
            protocols.insert(protocol.to_string());
        }

        if let Some(vulns) = service.get("vulnerabilities").and_then(Value::as_array) {
            vulnerabilities.extend(vulns.iter().cloned());
        }
    }

    // First service carrying the key wins, even with a null value.
    let mut malware_detected = None;
    for service in services {
        if let Some(found) = service.get("malware_detected") {
            malware_detected = Some(found.clone());
            break;
        }
    }

    let has_critical_vulns = vulnerabilities
        .iter()
        .any(|v| v.get("severity").and_then(Value::as_str) == Some("critical"));

    HostRecord {
        ip: record
            .get("ip")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        ports,
        protocols,
        service_count: services.len(),
        country: extract_country(record),
        city: extract_city(record),
        asn: extract_asn(record),
        organization: extract_organization(record),
        hostname: extract_hostname(record),
        vulnerability_count: vulnerabilities.len(),
        vulnerabilities,
        malware_detected,
        risk_level: extract_risk_level(record),
        has_critical_vulns,
    }
}

/// Non-empty string under `key` in the given mapping, if any.
///
/// Tolerates a missing or non-object parent by returning `None`.
fn string_at(parent: Option<&Value>, key: &str) -> Option<String> {
    parent?
        .get(key)?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn extract_country(record: &Value) -> Option<String> {
    let location = record.get("location");
    string_at(location, "country").or_else(|| string_at(location, "country_code"))
}

fn extract_city(record: &Value) -> Option<String> {
    string_at(record.get("location"), "city")
}

fn extract_asn(record: &Value) -> Option<u32> {
    record
        .get("autonomous_system")?
        .get("asn")?
        .as_u64()
        .and_then(|asn| u32::try_from(asn).ok())
}

fn extract_organization(record: &Value) -> Option<String> {
    let autonomous_system = record.get("autonomous_system");
    string_at(autonomous_system, "name").or_else(|| string_at(autonomous_system, "organization"))
}

fn extract_hostname(record: &Value) -> Option<String> {
    string_at(record.get("dns"), "hostname")
}

fn extract_risk_level(record: &Value) -> Option<String> {
    string_at(record.get("threat_intelligence"), "risk_level")
}
