use super::{AnomalyBuffer, AnomalyEvent};
use crate::telemetry::TelemetrySample;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Static coverage of the threat framework techniques, in percent.
const FRAMEWORK_COVERAGE: [(&str, u8); 6] = [
    ("Reconnaissance", 85),
    ("Resource Development", 62),
    ("Initial Access", 74),
    ("Execution", 68),
    ("Persistence", 79),
    ("Exfiltration", 57),
];

/// Number of most recent events feeding the alert histogram.
const HISTOGRAM_EVENTS: usize = 10;

/// Headline counters of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMetrics {
    pub alert_count: usize,
    pub tracked_objects: usize,
    pub coverage_count: usize,
    pub score: u32,
}

/// Number of alerts detected within one bucket of the alert histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertBucket {
    /// Start of the bucket (UTC).
    pub time: DateTime<Utc>,
    /// UTC label of the bucket as shown on the time axis.
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageEntry {
    pub technique: String,
    pub coverage: u8,
}

/// Time granularity of the alert histogram. Truncation and labels are in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketGranularity {
    #[default]
    Minute,
    Hour,
    Day,
}

impl BucketGranularity {
    fn span(self) -> TimeDelta {
        match self {
            BucketGranularity::Minute => TimeDelta::minutes(1),
            BucketGranularity::Hour => TimeDelta::hours(1),
            BucketGranularity::Day => TimeDelta::days(1),
        }
    }

    pub fn truncate(self, t: DateTime<Utc>) -> DateTime<Utc> { t.duration_trunc(self.span()).unwrap_or(t) }

    pub fn label(self, t: DateTime<Utc>) -> String {
        let fmt = match self {
            BucketGranularity::Minute => "%H:%M",
            BucketGranularity::Hour => "%H:00",
            BucketGranularity::Day => "%Y-%m-%d",
        };
        t.format(fmt).to_string()
    }
}

/// Everything the rendering layer needs for one refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub header: HeaderMetrics,
    pub alerts_over_time: Vec<AlertBucket>,
    pub telemetry: Vec<TelemetrySample>,
    pub framework_coverage: Vec<CoverageEntry>,
    pub anomalies: Vec<AnomalyEvent>,
    /// Auxiliary panels filled by other collaborators.
    #[serde(default)]
    pub panels: BTreeMap<String, Value>,
}

impl DashboardSnapshot {
    /// Derives a complete snapshot from the session state.
    pub fn build(
        buffer: &AnomalyBuffer,
        tracked_objects: usize,
        telemetry: Vec<TelemetrySample>,
        granularity: BucketGranularity,
    ) -> Self {
        let framework_coverage: Vec<CoverageEntry> = FRAMEWORK_COVERAGE
            .iter()
            .map(|(technique, coverage)| CoverageEntry { technique: (*technique).to_string(), coverage: *coverage })
            .collect();
        Self {
            header: HeaderMetrics {
                alert_count: buffer.len(),
                tracked_objects,
                coverage_count: framework_coverage.len(),
                score: buffer.score(),
            },
            alerts_over_time: alert_histogram(buffer, granularity),
            telemetry,
            framework_coverage,
            anomalies: buffer.iter().cloned().collect(),
            panels: BTreeMap::new(),
        }
    }

    /// Overrides every field present in `patch`. Panels are merged key by key.
    #[must_use]
    pub fn merged(mut self, patch: SnapshotPatch) -> Self {
        if let Some(header) = patch.header {
            self.header = header;
        }
        if let Some(buckets) = patch.alerts_over_time {
            self.alerts_over_time = buckets;
        }
        if let Some(telemetry) = patch.telemetry {
            self.telemetry = telemetry;
        }
        if let Some(coverage) = patch.framework_coverage {
            self.framework_coverage = coverage;
        }
        if let Some(anomalies) = patch.anomalies {
            self.anomalies = anomalies;
        }
        self.panels.extend(patch.panels);
        self
    }
}

/// Partial snapshot pushed by the event source. Absent fields keep the locally
/// computed value; unknown top-level keys become auxiliary panels.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SnapshotPatch {
    pub header: Option<HeaderMetrics>,
    pub alerts_over_time: Option<Vec<AlertBucket>>,
    pub telemetry: Option<Vec<TelemetrySample>>,
    pub framework_coverage: Option<Vec<CoverageEntry>>,
    pub anomalies: Option<Vec<AnomalyEvent>>,
    #[serde(flatten)]
    pub panels: BTreeMap<String, Value>,
}

/// One unit per event for the most recent events, counted per time bucket in
/// ascending order.
fn alert_histogram(buffer: &AnomalyBuffer, granularity: BucketGranularity) -> Vec<AlertBucket> {
    buffer
        .iter()
        .take(HISTOGRAM_EVENTS)
        .map(|e| granularity.truncate(e.timestamp()))
        .sorted()
        .dedup_with_count()
        .map(|(count, time)| AlertBucket { time, label: granularity.label(time), count })
        .collect()
}
