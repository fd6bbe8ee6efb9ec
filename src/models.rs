//! Data models for the scan summarizer.
//!
//! This module contains the core data structures used throughout the
//! application: the canonical host record, aggregate statistics, and the
//! assembled report.

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Narrative preset requested from the AI collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SummaryType {
    /// Short executive summary (3-4 paragraphs)
    Brief,
    /// In-depth analysis for security engineers
    Technical,
    /// Structured SOC-analyst analysis (default)
    #[default]
    Detailed,
}

impl fmt::Display for SummaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryType::Brief => write!(f, "brief"),
            SummaryType::Technical => write!(f, "technical"),
            SummaryType::Detailed => write!(f, "detailed"),
        }
    }
}

/// A host record normalized into the canonical schema.
///
/// One `HostRecord` is derived per raw input record that passes validation;
/// all optional fields fall back to `None` when the raw record omits them at
/// any nesting level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRecord {
    /// IP address of the host (required, non-empty).
    pub ip: String,
    /// Open ports in service order. A service with no port, a non-integer
    /// port, or port `0` contributes nothing.
    pub ports: Vec<u16>,
    /// Deduplicated protocol names across all services.
    pub protocols: BTreeSet<String>,
    /// Number of services reported on the host.
    pub service_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asn: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Vulnerability entries concatenated across all services, preserving
    /// per-service order then service order. Not deduplicated.
    pub vulnerabilities: Vec<Value>,
    /// Length of `vulnerabilities`.
    pub vulnerability_count: usize,
    /// Value of the first service carrying a `malware_detected` key.
    /// Key presence wins the scan, so this can be `Some(Value::Null)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub malware_detected: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    /// True iff any vulnerability has `severity == "critical"`.
    pub has_critical_vulns: bool,
}

impl HostRecord {
    /// Whether the record carries an active malware detection.
    ///
    /// A key that won the first-match scan with a `null` (or otherwise
    /// empty) value is carried on the record but does not count here.
    pub fn has_malware(&self) -> bool {
        self.malware_detected.as_ref().is_some_and(value_is_truthy)
    }
}

/// Python-style truthiness for a JSON value: `null`, `false`, `0`, `""`,
/// `[]` and `{}` are falsy.
fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Frequency table ordered by descending count, ties kept in
/// first-encounter order.
///
/// Serializes to a JSON object whose keys preserve rank order, matching the
/// shape consumers of the statistics expect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountMap(Vec<(String, usize)>);

impl CountMap {
    /// Tally an iterator of values into a ranked table.
    pub fn tally<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entries: Vec<(String, usize)> = Vec::new();
        for value in values {
            match entries.iter_mut().find(|(v, _)| v == value) {
                Some((_, count)) => *count += 1,
                None => entries.push((value.to_string(), 1)),
            }
        }
        // Stable sort keeps first-encounter order within equal counts.
        entries.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
        CountMap(entries)
    }

    /// Keep only the `n` highest-ranked entries.
    pub fn top(mut self, n: usize) -> Self {
        self.0.truncate(n);
        self
    }

    /// Count for a value, if present.
    #[allow(dead_code)] // Lookup utility
    pub fn get(&self, value: &str) -> Option<usize> {
        self.0.iter().find(|(v, _)| v == value).map(|(_, c)| *c)
    }

    #[allow(dead_code)] // Collection utility
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(v, c)| (v.as_str(), *c))
    }
}

impl Serialize for CountMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (value, count) in &self.0 {
            map.serialize_entry(value, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CountMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CountMapVisitor;

        impl<'de> Visitor<'de> for CountMapVisitor {
            type Value = CountMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of value counts")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, usize>()? {
                    entries.push(entry);
                }
                Ok(CountMap(entries))
            }
        }

        deserializer.deserialize_map(CountMapVisitor)
    }
}

/// Aggregate statistics over a batch of canonical host records.
///
/// Recomputed fresh for every batch; an empty batch yields the default
/// (all counts zero, all tables empty).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Number of canonical records in the batch.
    pub total_hosts: usize,
    /// Number of distinct IP addresses.
    pub unique_ips: usize,
    /// Number of distinct countries (absent values not counted).
    pub unique_countries: usize,
    /// Sum of `service_count` across all records.
    pub total_services: usize,
    /// Sum of `vulnerability_count` across all records.
    pub total_vulnerabilities: usize,
    /// Number of hosts with at least one critical vulnerability.
    pub critical_vulnerability_hosts: usize,
    /// Number of hosts with an active malware detection.
    pub malware_detected_hosts: usize,
    /// Top 5 countries by host frequency.
    pub top_countries: CountMap,
    /// Top 5 organizations by host frequency.
    pub top_organizations: CountMap,
    /// Full risk-level distribution (no truncation).
    pub risk_levels: CountMap,
}

/// Narrative produced by the AI collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeSummary {
    /// The narrative text.
    pub summary: String,
    /// Short key-insight strings extracted from the narrative.
    pub key_insights: Vec<String>,
    /// Overall risk-assessment statement.
    pub risk_assessment: String,
    /// Number of host records the narrative covers.
    pub host_count: usize,
}

/// Metadata about a summarization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMetadata {
    /// Name of the input that was summarized.
    pub input: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Name of the model used for the narrative, if one was called.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    /// Narrative preset used.
    pub summary_type: SummaryType,
    /// Number of raw records received.
    pub hosts_received: usize,
    /// Number of records that passed normalization.
    pub hosts_normalized: usize,
    /// Number of records dropped by validation.
    pub hosts_dropped: usize,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete summarization result, assembled by the boundary layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Metadata about the run.
    pub metadata: ScanMetadata,
    /// AI-generated narrative. `None` when the run was statistics-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<NarrativeSummary>,
    /// Aggregate statistics.
    pub stats: SummaryStats,
}
