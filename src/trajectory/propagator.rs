use super::{OrbitalElementSet, TrajectoryPoint};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::f64::consts::{PI, TAU};
use strum_macros::Display;

#[derive(Debug, Display)]
pub enum PropagationError {
    /// The propagator rejected the elements or diverged at the requested instant.
    Propagator(String),
    /// The propagator returned non-finite state components.
    Degenerate,
}

impl std::error::Error for PropagationError {}

/// SGP4/SDP4 propagator bound to a single element set.
pub struct Propagator {
    constants: sgp4::Constants,
    epoch: NaiveDateTime,
}

impl Propagator {
    /// Equatorial radius of the WGS-72 ellipsoid in km.
    const EARTH_RADIUS_KM: f64 = 6378.135;
    /// Flattening of the WGS-72 ellipsoid.
    const FLATTENING: f64 = 1.0 / 298.26;
    /// Iteration limit for the geodetic latitude fixpoint.
    const MAX_LAT_ITERATIONS: usize = 20;
    /// Julian date of the Unix epoch.
    const JD_UNIX_EPOCH: f64 = 2_440_587.5;
    /// Julian date of J2000.0.
    const JD_J2000: f64 = 2_451_545.0;

    /// Initializes the propagator constants for `elements`.
    ///
    /// # Errors
    /// Returns a [`PropagationError`] if the elements are unusable by SGP4.
    pub fn new(elements: &OrbitalElementSet) -> Result<Self, PropagationError> {
        let constants = sgp4::Constants::from_elements(elements.parsed())
            .map_err(|e| PropagationError::Propagator(e.to_string()))?;
        Ok(Self { constants, epoch: elements.parsed().datetime })
    }

    /// Propagates to `timestamp` and converts the state to geodetic coordinates.
    ///
    /// # Errors
    /// Returns a [`PropagationError`] if SGP4 reports a degeneracy at `timestamp`.
    #[allow(clippy::cast_precision_loss)]
    pub fn propagate_at(&self, timestamp: DateTime<Utc>) -> Result<TrajectoryPoint, PropagationError> {
        let minutes = (timestamp.naive_utc() - self.epoch).num_milliseconds() as f64 / 60_000.0;
        let prediction = self
            .constants
            .propagate(sgp4::MinutesSinceEpoch(minutes))
            .map_err(|e| PropagationError::Propagator(e.to_string()))?;

        let position = prediction.position;
        let velocity = prediction.velocity;
        if position.iter().chain(velocity.iter()).any(|v| !v.is_finite()) {
            return Err(PropagationError::Degenerate);
        }
        let (latitude, longitude, altitude) = Self::teme_to_geodetic(position, gmst(timestamp));
        let speed = velocity.iter().map(|v| v * v).sum::<f64>().sqrt();
        Ok(TrajectoryPoint {
            timestamp,
            latitude: latitude.to_degrees(),
            longitude: longitude.to_degrees(),
            altitude,
            velocity: speed,
        })
    }

    /// Converts an inertial position (km) into geodetic latitude and longitude (radians)
    /// and altitude (km) given the Greenwich sidereal angle.
    fn teme_to_geodetic(position: [f64; 3], gmst: f64) -> (f64, f64, f64) {
        let [x, y, z] = position;
        let a = Self::EARTH_RADIUS_KM;
        let e2 = Self::FLATTENING * (2.0 - Self::FLATTENING);
        let r = x.hypot(y);

        let longitude = wrap_pi(y.atan2(x) - gmst);
        let mut latitude = z.atan2(r);
        let mut c = 1.0;
        for _ in 0..Self::MAX_LAT_ITERATIONS {
            let sin_lat = latitude.sin();
            c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
            latitude = (z + a * c * e2 * sin_lat).atan2(r);
        }
        let altitude = r / latitude.cos() - a * c;
        (latitude, longitude, altitude)
    }

    #[allow(clippy::cast_precision_loss)]
    fn julian_date(timestamp: DateTime<Utc>) -> f64 {
        timestamp.timestamp_millis() as f64 / 86_400_000.0 + Self::JD_UNIX_EPOCH
    }
}

/// Greenwich mean sidereal time in radians (IAU-82).
pub fn gmst(timestamp: DateTime<Utc>) -> f64 {
    let t_ut1 = (Propagator::julian_date(timestamp) - Propagator::JD_J2000) / 36_525.0;
    let seconds = -6.2e-6 * t_ut1.powi(3)
        + 0.093_104 * t_ut1.powi(2)
        + (876_600.0 * 3600.0 + 8_640_184.812_866) * t_ut1
        + 67_310.548_41;
    (seconds.to_radians() / 240.0).rem_euclid(TAU)
}

/// Wraps an angle into `[-PI, PI)`.
fn wrap_pi(angle: f64) -> f64 { (angle + PI).rem_euclid(TAU) - PI }
