use super::{
    ElementSource, ElementsError, OrbitalElementSet, PropagationError, Propagator, Trajectory,
    TrajectoryPoint, TrajectoryRequest,
};
use crate::{event, warn};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;

/// Resolves element sets for catalog objects and samples their trajectories.
///
/// The engine holds no mutable state, every call is independent of all others.
#[derive(Debug, Clone)]
pub struct TrajectoryEngine {
    /// Authoritative element sets by catalog number.
    known: HashMap<u32, OrbitalElementSet>,
}

impl TrajectoryEngine {
    /// Built-in element sets for a handful of well-known objects.
    const WELL_KNOWN: [(&'static str, &'static str, &'static str); 3] = [
        (
            "ISS (ZARYA)",
            "1 25544U 98067A   24045.51724537  .00016717  00000-0  30571-3 0  9990",
            "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.49815308440001",
        ),
        (
            "HST",
            "1 20580U 90037B   24045.52916667  .00001257  00000-0  63869-4 0  9992",
            "2 20580  28.4699 222.1648 0002355 108.3668 251.7208 15.14454319 67440",
        ),
        (
            "NOAA 19",
            "1 33591U 09005A   24045.50000000  .00000190  00000-0  12679-3 0  9993",
            "2 33591  99.1564 102.6032 0013957 307.4452  52.5452 14.12767582 77214",
        ),
    ];
    const MS_PER_HOUR: i64 = 3_600_000;

    /// Creates an engine knowing the built-in element sets.
    pub fn new() -> Self {
        let known = Self::WELL_KNOWN
            .iter()
            .filter_map(|(name, l1, l2)| {
                OrbitalElementSet::from_lines(Some(name), l1, l2, ElementSource::Catalog)
                    .inspect_err(|e| warn!("Skipping built-in elements for {name}: {e}"))
                    .ok()
            })
            .map(|el| (el.catalog_id(), el))
            .collect();
        Self { known }
    }

    /// Registers additional authoritative element sets, replacing built-ins with the
    /// same catalog number.
    #[must_use]
    pub fn with_known(mut self, elements: impl IntoIterator<Item = OrbitalElementSet>) -> Self {
        self.known.extend(elements.into_iter().map(|el| (el.catalog_id(), el)));
        self
    }

    pub fn known(&self, catalog_id: u32) -> Option<&OrbitalElementSet> { self.known.get(&catalog_id) }

    /// Returns the known element set for `catalog_id`, or synthesizes an approximation
    /// from inclination and period with the current time as epoch.
    ///
    /// # Errors
    /// Returns [`ElementsError::InvalidPeriod`] if synthesis is required and the period is unusable.
    pub fn resolve_elements(
        &self,
        catalog_id: u32,
        inclination: f64,
        period_minutes: f64,
    ) -> Result<OrbitalElementSet, ElementsError> {
        self.resolve_elements_at(catalog_id, inclination, period_minutes, Utc::now())
    }

    /// Like [`TrajectoryEngine::resolve_elements`] with an explicit synthesis epoch.
    ///
    /// # Errors
    /// Returns [`ElementsError::InvalidPeriod`] if synthesis is required and the period is unusable.
    pub fn resolve_elements_at(
        &self,
        catalog_id: u32,
        inclination: f64,
        period_minutes: f64,
        epoch: DateTime<Utc>,
    ) -> Result<OrbitalElementSet, ElementsError> {
        if let Some(known) = self.known.get(&catalog_id) {
            return Ok(known.clone());
        }
        event!("No elements known for {catalog_id}, synthesizing from i={inclination} T={period_minutes}min");
        OrbitalElementSet::synthesize(catalog_id, inclination, period_minutes, epoch)
    }

    /// Propagates `elements` to a single instant.
    ///
    /// # Errors
    /// Returns a [`PropagationError`] if the propagator reports a degeneracy.
    pub fn propagate_at(
        &self,
        elements: &OrbitalElementSet,
        timestamp: DateTime<Utc>,
    ) -> Result<TrajectoryPoint, PropagationError> {
        Propagator::new(elements)?.propagate_at(timestamp)
    }

    /// Samples `duration_hours * points_per_hour + 1` evenly spaced points from `start`.
    ///
    /// Samples the propagator fails on are logged and left out, the remaining points
    /// keep their order and spacing. A window whose point count does not fit a `u32`
    /// is logged and yields no points.
    pub fn sample_series(
        &self,
        elements: &OrbitalElementSet,
        start: DateTime<Utc>,
        duration_hours: u32,
        points_per_hour: u32,
    ) -> Vec<TrajectoryPoint> {
        let propagator = match Propagator::new(elements) {
            Ok(p) => p,
            Err(e) => {
                warn!("Cannot propagate elements of {}: {e}", elements.catalog_id());
                return Vec::new();
            }
        };
        if points_per_hour == 0 {
            return propagator.propagate_at(start).into_iter().collect();
        }
        let Some(count) = duration_hours.checked_mul(points_per_hour).and_then(|n| n.checked_add(1)) else {
            warn!(
                "Window of {duration_hours} h at {points_per_hour}/h is too large to sample for {}",
                elements.catalog_id()
            );
            return Vec::new();
        };
        let step_ms = Self::MS_PER_HOUR / i64::from(points_per_hour);
        // the series ends where timestamps leave chrono's range
        (0..count)
            .map_while(|i| {
                TimeDelta::try_milliseconds(step_ms * i64::from(i)).and_then(|d| start.checked_add_signed(d))
            })
            .filter_map(|t| {
                propagator
                    .propagate_at(t)
                    .inspect_err(|e| {
                        warn!("Skipping sample of {} at {}: {e}", elements.catalog_id(), t.format("%Y-%m-%d %H:%M:%S"));
                    })
                    .ok()
            })
            .collect()
    }

    /// Resolves elements once and samples the requested past and future windows
    /// around the current instant.
    ///
    /// # Errors
    /// Returns an [`ElementsError`] if no usable element set can be resolved.
    pub fn build_history_and_future(&self, request: &TrajectoryRequest) -> Result<Trajectory, ElementsError> {
        self.build_history_and_future_at(request, Utc::now())
    }

    /// Like [`TrajectoryEngine::build_history_and_future`] around an explicit `now`.
    ///
    /// # Errors
    /// Returns an [`ElementsError`] if no usable element set can be resolved.
    pub fn build_history_and_future_at(
        &self,
        request: &TrajectoryRequest,
        now: DateTime<Utc>,
    ) -> Result<Trajectory, ElementsError> {
        let elements = self.resolve_elements_at(
            request.catalog_id,
            request.inclination,
            request.period_minutes,
            now,
        )?;
        let past_start = now - TimeDelta::hours(i64::from(request.past_hours));
        let historical = self.sample_series(&elements, past_start, request.past_hours, request.points_per_hour);
        let future = self.sample_series(&elements, now, request.future_hours, request.points_per_hour);
        Ok(Trajectory::new(elements, historical, future))
    }
}

impl Default for TrajectoryEngine {
    fn default() -> Self { Self::new() }
}
