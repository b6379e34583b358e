use super::{SyntheticTelemetry, TelemetrySource};
use chrono::{TimeDelta, TimeZone, Utc};

#[test]
fn test_synthetic_series_shape() {
    let now = Utc.with_ymd_and_hms(2026, 5, 4, 18, 0, 0).unwrap();
    let series = SyntheticTelemetry::seeded(7).series(now);

    assert_eq!(series.len(), 24);
    assert_eq!(series.last().unwrap().timestamp, now);
    assert_eq!((now - series[0].timestamp).num_minutes(), 23 * 30);
    assert!(series.iter().all(|s| now - s.timestamp < TimeDelta::hours(12)));
    for pair in series.windows(2) {
        assert_eq!((pair[1].timestamp - pair[0].timestamp).num_minutes(), 30);
    }
}

#[test]
fn test_synthetic_channels_stay_bounded() {
    let mut source = SyntheticTelemetry::new();
    for _ in 0..20 {
        for s in source.series(Utc::now()) {
            for pct in [s.power, s.communication, s.solar_efficiency, s.attitude_control, s.fuel_level] {
                assert!((0.0..=100.0).contains(&pct));
            }
            assert!(s.temperature > 0.0 && s.temperature < 40.0);
            assert!(s.voltage > 26.0 && s.voltage < 30.0);
        }
    }
}

#[test]
fn test_seeded_generators_repeat() {
    let now = Utc::now();
    assert_eq!(SyntheticTelemetry::seeded(3).series(now), SyntheticTelemetry::seeded(3).series(now));
}
