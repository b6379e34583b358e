use super::elements::checksum;
use super::{
    gmst, ElementSource, ElementsError, OrbitalElementSet, PropagationError, TrajectoryEngine, TrajectoryRequest,
};
use crate::info;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rand::Rng;

const ISS_PERIOD_MIN: f64 = 92.68;
const ISS_INCLINATION: f64 = 51.64;

fn fixed_now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() }

/// Low perigee (about 213 km) with a B* of 0.5, epoch at `fixed_now`. The drag term
/// drives the propagated eccentricity out of range roughly half an hour after epoch.
fn decaying_elements() -> OrbitalElementSet {
    OrbitalElementSet::from_lines(
        Some("DECAYING"),
        "1 99003U 00000A   26060.50000000  .00000000  00000-0  50000-0 0  9995",
        "2 99003  51.6400   0.0000 0010000   0.0000   0.0000 16.20000000000009",
        ElementSource::Catalog,
    )
    .unwrap()
}

fn synthetic_iss(epoch: DateTime<Utc>) -> OrbitalElementSet {
    OrbitalElementSet::synthesize(99_001, ISS_INCLINATION, ISS_PERIOD_MIN, epoch).unwrap()
}

#[test]
fn test_synthesized_lines_are_well_formed() {
    let el = synthetic_iss(fixed_now());
    for line in [el.line1(), el.line2()] {
        assert_eq!(line.len(), 69, "bad line length: {line:?}");
        let stated = line.chars().last().and_then(|c| c.to_digit(10)).unwrap();
        assert_eq!(stated, checksum(line));
    }
    assert!(el.line1().starts_with("1 99001U"));
    assert!(el.line2().starts_with("2 99001  51.6400"));
    assert_eq!(el.source(), ElementSource::Synthesized);
    assert_eq!(el.catalog_id(), 99_001);
    assert!((el.mean_motion() - 1440.0 / ISS_PERIOD_MIN).abs() < 1e-6);
    assert!((el.inclination() - ISS_INCLINATION).abs() < 1e-9);
    assert!(el.parsed().eccentricity.abs() < f64::EPSILON);
}

#[test]
fn test_synthesis_reduces_oversized_catalog_ids() {
    let el = OrbitalElementSet::synthesize(1_234_567, 98.0, 100.0, fixed_now()).unwrap();
    assert_eq!(el.catalog_id(), 34_567);
}

#[test]
fn test_synthesis_rejects_unusable_periods() {
    for period in [0.0, -90.0, f64::NAN, f64::INFINITY, 10.0] {
        let res = OrbitalElementSet::synthesize(42, 51.6, period, fixed_now());
        assert!(matches!(res, Err(ElementsError::InvalidPeriod)), "period {period} accepted");
    }
}

#[test]
fn test_malformed_lines_are_rejected() {
    let res = OrbitalElementSet::from_lines(None, "1 garbage", "2 garbage", ElementSource::Catalog);
    assert!(matches!(res, Err(ElementsError::Malformed(_))));
}

#[test]
fn test_resolve_prefers_known_elements() {
    let engine = TrajectoryEngine::new();
    let iss = engine.resolve_elements(25544, 0.0, 1.0).unwrap();
    assert_eq!(iss.source(), ElementSource::Catalog);
    assert_eq!(iss.name(), Some("ISS (ZARYA)"));

    let unknown = engine.resolve_elements(43013, 97.7, 101.0).unwrap();
    assert_eq!(unknown.source(), ElementSource::Synthesized);
    assert_eq!(unknown.catalog_id(), 43013);
}

#[test]
fn test_with_known_registers_external_elements() {
    let external = synthetic_iss(fixed_now());
    let engine = TrajectoryEngine::new().with_known([external]);
    let resolved = engine.resolve_elements(99_001, 10.0, 700.0).unwrap();
    assert!((resolved.inclination() - ISS_INCLINATION).abs() < 1e-9);
}

#[test]
fn test_propagated_leo_state_is_plausible() {
    let engine = TrajectoryEngine::new();
    let el = synthetic_iss(fixed_now());
    let point = engine.propagate_at(&el, fixed_now() + chrono::TimeDelta::minutes(37)).unwrap();
    info!("Synthetic ISS sample: {point:?}");
    assert!(point.altitude > 200.0 && point.altitude < 2000.0);
    assert!(point.velocity > 6.0 && point.velocity < 9.0);
    assert!(point.latitude.abs() <= ISS_INCLINATION + 0.5);
    assert!((-180.0..180.0).contains(&point.longitude));
}

#[test]
fn test_sample_series_count_and_spacing() {
    let engine = TrajectoryEngine::new();
    let start = fixed_now();
    let series = engine.sample_series(&synthetic_iss(start), start, 24, 6);
    assert_eq!(series.len(), 145);
    assert_eq!(series[0].timestamp, start);
    for pair in series.windows(2) {
        assert_eq!((pair[1].timestamp - pair[0].timestamp).num_milliseconds(), 600_000);
    }
}

#[test]
fn test_sample_series_survives_oversized_windows() {
    let engine = TrajectoryEngine::new();
    let start = fixed_now();
    let elements = synthetic_iss(start);
    assert!(engine.sample_series(&elements, start, 1_000_000_000, 6).is_empty());
    assert!(engine.sample_series(&elements, start, u32::MAX, 1).is_empty());
}

#[test]
fn test_failed_samples_are_left_out() {
    let engine = TrajectoryEngine::new();
    let start = fixed_now();
    let elements = decaying_elements();

    assert!(engine.propagate_at(&elements, start).is_ok());
    let late = engine.propagate_at(&elements, start + TimeDelta::hours(2));
    assert!(matches!(late, Err(PropagationError::Propagator(_))), "{late:?}");

    let series = engine.sample_series(&elements, start, 6, 60);
    assert!(!series.is_empty());
    assert!(series.len() < 361, "{} samples survived", series.len());
    assert_eq!(series[0].timestamp, start);
    for pair in series.windows(2) {
        let gap = (pair[1].timestamp - pair[0].timestamp).num_milliseconds();
        assert!(gap > 0 && gap % 60_000 == 0);
    }
    assert!(series.iter().all(|p| p.timestamp - start < TimeDelta::hours(1)));
}

#[test]
fn test_sample_series_without_rate_yields_start_only() {
    let engine = TrajectoryEngine::new();
    let start = fixed_now();
    let series = engine.sample_series(&synthetic_iss(start), start, 24, 0);
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].timestamp, start);
}

#[test]
fn test_history_and_future_meet_at_now() {
    let engine = TrajectoryEngine::new();
    let now = fixed_now();
    let request = TrajectoryRequest::new(99_002, ISS_INCLINATION, ISS_PERIOD_MIN);
    let trajectory = engine.build_history_and_future_at(&request, now).unwrap();

    let (historical, future) = (trajectory.historical(), trajectory.future());
    assert_eq!(historical.len(), 145);
    assert_eq!(future.len(), 145);
    assert!(historical.last().unwrap().timestamp <= now);
    assert!(future.first().unwrap().timestamp >= now);
    assert!(historical.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    assert!(future.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    assert_eq!(historical.last().unwrap(), future.first().unwrap());
}

#[test]
fn test_random_leo_orbits_propagate_in_order() {
    let engine = TrajectoryEngine::new();
    let mut rng = rand::rng();
    let now = fixed_now();
    for _ in 0..10 {
        let inclination = rng.random_range(0.0..110.0);
        let period = rng.random_range(90.0..120.0);
        let request = TrajectoryRequest::new(rng.random_range(60_000..99_999), inclination, period)
            .with_window(2, 2, 12);
        let trajectory = engine.build_history_and_future_at(&request, now).unwrap();
        assert_eq!(trajectory.historical().len(), 25, "i={inclination} T={period}");
        assert_eq!(trajectory.future().len(), 25, "i={inclination} T={period}");
        assert!(trajectory.future().iter().all(|p| p.altitude > 100.0));
    }
}

#[test]
fn test_gmst_at_j2000() {
    let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
    let expected = 280.460_618_37_f64.to_radians();
    assert!((gmst(j2000) - expected).abs() < 1e-6);
}
