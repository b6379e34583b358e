//! Telemetry feed seam used by snapshot synthesis.

mod synthetic;

pub use synthetic::SyntheticTelemetry;

use chrono::{DateTime, Utc};

/// One multi-channel telemetry sample. All channels except temperature are percentages.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TelemetrySample {
    pub timestamp: DateTime<Utc>,
    pub power: f64,
    /// Temperature in °C.
    pub temperature: f64,
    pub communication: f64,
    /// Bus voltage in V.
    pub voltage: f64,
    pub solar_efficiency: f64,
    pub attitude_control: f64,
    pub fuel_level: f64,
}

/// A provider of the telemetry series embedded in every dashboard snapshot.
pub trait TelemetrySource: Send {
    /// Returns the series ending at `now`, ordered by ascending timestamp.
    fn series(&mut self, now: DateTime<Utc>) -> Vec<TelemetrySample>;
}

#[cfg(test)]
mod tests;
