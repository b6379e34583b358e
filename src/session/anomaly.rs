use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity of a classified anomaly. Unknown labels are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
    Other(String),
}

impl Severity {
    /// Contribution of a single event to the dashboard score.
    pub fn weight(&self) -> u32 {
        match self {
            Severity::Low => 10,
            Severity::Medium => 40,
            Severity::High => 80,
            Severity::Critical => 100,
            Severity::Other(_) => 0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
            Severity::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        match value.as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Other(value),
        }
    }
}

impl From<&str> for Severity {
    fn from(value: &str) -> Self { Severity::from(value.to_string()) }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        match value {
            Severity::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

/// Classification result attached to an anomaly by the inference source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "type")]
    kind: String,
    severity: Severity,
    /// Opaque detection detail, passed through unchanged.
    #[serde(default)]
    details: Value,
}

impl Classification {
    pub fn new(kind: impl Into<String>, severity: Severity) -> Self {
        Self { kind: kind.into(), severity, details: Value::Null }
    }

    pub fn kind(&self) -> &str { &self.kind }
    pub fn severity(&self) -> &Severity { &self.severity }
    pub fn details(&self) -> &Value { &self.details }
}

/// Geodetic location of a detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
    /// Altitude in km.
    pub alt: f64,
}

impl GeoLocation {
    /// Draws a uniformly distributed placeholder position in low earth orbit.
    /// It only serves plotting and is not a positional fix.
    pub fn placeholder() -> Self {
        let mut rng = rand::rng();
        Self {
            lat: rng.random_range(-90.0..=90.0),
            lon: rng.random_range(-180.0..180.0),
            alt: rng.random_range(300.0..=800.0),
        }
    }
}

/// An anomaly as held by the live session.
///
/// Apart from the reviewed flag, an ingested event is never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyEvent {
    id: String,
    satellite_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    norad_id: Option<u32>,
    anomaly: Classification,
    timestamp: DateTime<Utc>,
    location: GeoLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    predicted_trajectory: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    threat_context: Option<Value>,
    #[serde(default)]
    reviewed: bool,
}

impl AnomalyEvent {
    pub fn new(
        id: impl Into<String>,
        satellite_name: impl Into<String>,
        anomaly: Classification,
        timestamp: DateTime<Utc>,
        location: GeoLocation,
    ) -> Self {
        Self {
            id: id.into(),
            satellite_name: satellite_name.into(),
            norad_id: None,
            anomaly,
            timestamp,
            location,
            predicted_trajectory: None,
            threat_context: None,
            reviewed: false,
        }
    }

    /// Creates an operator-authored alert. It carries a fresh id, the current time and
    /// a placeholder location, and is reviewed from the start.
    pub fn manual(subject_name: &str, anomaly_type: &str, severity: Severity) -> Self {
        let mut event = Self::new(
            uuid::Uuid::new_v4().to_string(),
            subject_name,
            Classification::new(anomaly_type, severity),
            Utc::now(),
            GeoLocation::placeholder(),
        );
        event.reviewed = true;
        event
    }

    #[must_use]
    pub fn with_norad_id(mut self, norad_id: u32) -> Self {
        self.norad_id = Some(norad_id);
        self
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn satellite_name(&self) -> &str { &self.satellite_name }
    pub fn norad_id(&self) -> Option<u32> { self.norad_id }
    pub fn anomaly(&self) -> &Classification { &self.anomaly }
    pub fn severity(&self) -> &Severity { &self.anomaly.severity }
    pub fn timestamp(&self) -> DateTime<Utc> { self.timestamp }
    pub fn location(&self) -> GeoLocation { self.location }
    pub fn predicted_trajectory(&self) -> Option<&Value> { self.predicted_trajectory.as_ref() }
    pub fn threat_context(&self) -> Option<&Value> { self.threat_context.as_ref() }
    pub fn is_reviewed(&self) -> bool { self.reviewed }

    pub(super) fn mark_reviewed(&mut self) { self.reviewed = true; }
}
