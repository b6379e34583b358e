use super::OrbitalElementSet;
use chrono::{DateTime, Utc};

/// One geodetic sample of an object's trajectory.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrajectoryPoint {
    pub timestamp: DateTime<Utc>,
    /// Geodetic latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees, `[-180, 180)`.
    pub longitude: f64,
    /// Altitude above the ellipsoid in km.
    pub altitude: f64,
    /// Inertial speed in km/s.
    pub velocity: f64,
}

/// Parameters of a history-and-future trajectory request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryRequest {
    pub catalog_id: u32,
    pub inclination: f64,
    pub period_minutes: f64,
    pub past_hours: u32,
    pub future_hours: u32,
    pub points_per_hour: u32,
}

impl TrajectoryRequest {
    pub const DEFAULT_PAST_HOURS: u32 = 24;
    pub const DEFAULT_FUTURE_HOURS: u32 = 24;
    pub const DEFAULT_POINTS_PER_HOUR: u32 = 6;

    /// Creates a request with the default 24 h / 24 h window at six points per hour.
    pub fn new(catalog_id: u32, inclination: f64, period_minutes: f64) -> Self {
        Self {
            catalog_id,
            inclination,
            period_minutes,
            past_hours: Self::DEFAULT_PAST_HOURS,
            future_hours: Self::DEFAULT_FUTURE_HOURS,
            points_per_hour: Self::DEFAULT_POINTS_PER_HOUR,
        }
    }

    pub fn with_window(mut self, past_hours: u32, future_hours: u32, points_per_hour: u32) -> Self {
        self.past_hours = past_hours;
        self.future_hours = future_hours;
        self.points_per_hour = points_per_hour;
        self
    }
}

/// Historical and future samples derived from the same element set.
///
/// The last historical and the first future sample share the request instant.
#[derive(Debug, Clone)]
pub struct Trajectory {
    elements: OrbitalElementSet,
    historical: Vec<TrajectoryPoint>,
    future: Vec<TrajectoryPoint>,
}

impl Trajectory {
    pub(super) fn new(
        elements: OrbitalElementSet,
        historical: Vec<TrajectoryPoint>,
        future: Vec<TrajectoryPoint>,
    ) -> Self {
        Self { elements, historical, future }
    }

    pub fn elements(&self) -> &OrbitalElementSet { &self.elements }
    pub fn historical(&self) -> &[TrajectoryPoint] { &self.historical }
    pub fn future(&self) -> &[TrajectoryPoint] { &self.future }
    pub fn into_parts(self) -> (Vec<TrajectoryPoint>, Vec<TrajectoryPoint>) { (self.historical, self.future) }
}
