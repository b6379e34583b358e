use super::{TelemetrySample, TelemetrySource};
use chrono::{DateTime, TimeDelta, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Placeholder telemetry built from smooth periodic curves with bounded jitter.
///
/// It keeps the telemetry panels populated while no live telemetry channel is wired in
/// and produces the same shape a real feed has to deliver.
pub struct SyntheticTelemetry {
    rng: StdRng,
}

impl SyntheticTelemetry {
    /// Number of samples per series.
    pub const SAMPLES: usize = 24;
    /// Spacing between consecutive samples.
    pub const CADENCE: TimeDelta = TimeDelta::minutes(30);

    pub fn new() -> Self { Self { rng: StdRng::from_os_rng() } }

    /// Creates a generator with reproducible jitter.
    pub fn seeded(seed: u64) -> Self { Self { rng: StdRng::seed_from_u64(seed) } }

    fn jitter(&mut self, bound: f64) -> f64 { self.rng.random_range(-bound..=bound) }

    #[allow(clippy::cast_precision_loss)]
    fn sample(&mut self, i: usize, timestamp: DateTime<Utc>) -> TelemetrySample {
        let x = i as f64;
        TelemetrySample {
            timestamp,
            power: (85.0 + 10.0 * (x / 4.0).sin() + self.jitter(3.0)).clamp(0.0, 100.0),
            temperature: 20.0 + 15.0 * (x / 3.0).sin() + self.jitter(2.0),
            communication: (92.0 + 5.0 * (x / 5.0).cos() + self.jitter(2.0)).clamp(0.0, 100.0),
            voltage: 28.0 + 1.5 * (x / 6.0).sin() + self.jitter(0.3),
            solar_efficiency: (80.0 + 15.0 * (x / 4.0 + 1.0).sin() + self.jitter(3.0)).clamp(0.0, 100.0),
            attitude_control: (95.0 + 3.0 * (x / 3.0).cos() + self.jitter(1.5)).clamp(0.0, 100.0),
            fuel_level: (75.0 - 0.2 * x + 0.5 * x.sin() + self.jitter(0.5)).clamp(0.0, 100.0),
        }
    }
}

impl Default for SyntheticTelemetry {
    fn default() -> Self { Self::new() }
}

impl TelemetrySource for SyntheticTelemetry {
    /// Samples at `now` and every [`Self::CADENCE`] before it. The oldest sample lies
    /// 11.5 h back, so the series covers the half-open 12 h window `(now - 12 h, now]`.
    fn series(&mut self, now: DateTime<Utc>) -> Vec<TelemetrySample> {
        let first = now - Self::CADENCE * i32::try_from(Self::SAMPLES - 1).unwrap_or(0);
        (0..Self::SAMPLES)
            .map(|i| {
                let t = first + Self::CADENCE * i32::try_from(i).unwrap_or(0);
                self.sample(i, t)
            })
            .collect()
    }
}
