use chrono::{DateTime, Datelike, Timelike, Utc};
use strum_macros::Display;

/// Where an [`OrbitalElementSet`] originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, serde::Serialize)]
pub enum ElementSource {
    /// Taken verbatim from a known or externally supplied catalog.
    Catalog,
    /// Approximated from inclination and period only.
    Synthesized,
}

#[derive(Debug, Display)]
pub enum ElementsError {
    InvalidPeriod,
    Malformed(String),
}

impl std::error::Error for ElementsError {}

/// An immutable two-line element set together with its parsed representation.
#[derive(Debug, Clone)]
pub struct OrbitalElementSet {
    /// NORAD catalog number as stated in the element lines.
    catalog_id: u32,
    /// Common object name, if known.
    name: Option<String>,
    /// First element line, 69 columns.
    line1: String,
    /// Second element line, 69 columns.
    line2: String,
    /// Whether the lines are authoritative or approximated.
    source: ElementSource,
    /// The lines parsed for the propagator.
    parsed: sgp4::Elements,
}

impl OrbitalElementSet {
    /// Minutes per day, used to convert an orbital period into mean motion.
    const MINUTES_PER_DAY: f64 = 1440.0;
    /// Largest mean motion representable in the fixed-column mean motion field.
    const MAX_MEAN_MOTION: f64 = 99.999_999;
    /// Catalog numbers are five digit fields on both element lines.
    const CATALOG_MODULUS: u32 = 100_000;

    /// Parses and validates a verbatim element pair.
    ///
    /// # Errors
    /// Returns [`ElementsError::Malformed`] if either line fails to parse.
    pub fn from_lines(
        name: Option<&str>,
        line1: &str,
        line2: &str,
        source: ElementSource,
    ) -> Result<Self, ElementsError> {
        let (line1, line2) = (line1.trim_end(), line2.trim_end());
        let parsed = sgp4::Elements::from_tle(
            name.map(str::to_string),
            line1.as_bytes(),
            line2.as_bytes(),
        )
        .map_err(|e| ElementsError::Malformed(e.to_string()))?;
        let catalog_id = u32::try_from(parsed.norad_id)
            .map_err(|_| ElementsError::Malformed(format!("catalog id {}", parsed.norad_id)))?;
        Ok(Self {
            catalog_id,
            name: name.map(str::to_string),
            line1: line1.to_string(),
            line2: line2.to_string(),
            source,
            parsed,
        })
    }

    /// Builds an approximate element set from inclination and orbital period alone.
    ///
    /// Eccentricity, drag, right ascension, argument of perigee and mean anomaly are
    /// zeroed and the epoch is set to `epoch`. The result reproduces gross altitude and
    /// period, nothing more.
    ///
    /// # Errors
    /// Returns [`ElementsError::InvalidPeriod`] for non-finite, non-positive or too short
    /// periods.
    pub fn synthesize(
        catalog_id: u32,
        inclination: f64,
        period_minutes: f64,
        epoch: DateTime<Utc>,
    ) -> Result<Self, ElementsError> {
        if !period_minutes.is_finite() || period_minutes <= 0.0 {
            return Err(ElementsError::InvalidPeriod);
        }
        let mean_motion = Self::MINUTES_PER_DAY / period_minutes;
        if mean_motion > Self::MAX_MEAN_MOTION {
            return Err(ElementsError::InvalidPeriod);
        }
        let inclination = if inclination.is_finite() { inclination.clamp(0.0, 180.0) } else { 0.0 };
        let id = catalog_id % Self::CATALOG_MODULUS;

        let line1 = with_checksum(&format!(
            "1 {id:05}U 00000A   {}  .00000000  00000-0  00000-0 0  999",
            format_epoch(epoch)
        ));
        let line2 = with_checksum(&format!(
            "2 {id:05} {inclination:8.4} {:8.4} 0000000 {:8.4} {:8.4} {mean_motion:11.8}{:05}",
            0.0, 0.0, 0.0, 0
        ));
        Self::from_lines(None, &line1, &line2, ElementSource::Synthesized)
    }

    pub fn catalog_id(&self) -> u32 { self.catalog_id }
    pub fn name(&self) -> Option<&str> { self.name.as_deref() }
    pub fn line1(&self) -> &str { &self.line1 }
    pub fn line2(&self) -> &str { &self.line2 }
    pub fn source(&self) -> ElementSource { self.source }
    pub fn parsed(&self) -> &sgp4::Elements { &self.parsed }
    /// Mean motion in revolutions per day.
    pub fn mean_motion(&self) -> f64 { self.parsed.mean_motion }
    /// Inclination in degrees.
    pub fn inclination(&self) -> f64 { self.parsed.inclination }
}

/// Formats `epoch` as the fixed-width `YYDDD.DDDDDDDD` element epoch field.
fn format_epoch(epoch: DateTime<Utc>) -> String {
    let secs_of_day = f64::from(epoch.num_seconds_from_midnight())
        + f64::from(epoch.timestamp_subsec_millis()) / 1000.0;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let fraction = ((secs_of_day / 86_400.0) * 1e8).round().min(99_999_999.0) as u64;
    format!("{:02}{:03}.{fraction:08}", epoch.year().rem_euclid(100), epoch.ordinal())
}

/// Modulo-10 checksum over the first 68 columns, counting digits by value and `-` as one.
pub(crate) fn checksum(line: &str) -> u32 {
    line.chars()
        .take(68)
        .map(|c| match c {
            '-' => 1,
            c => c.to_digit(10).unwrap_or(0),
        })
        .sum::<u32>()
        % 10
}

fn with_checksum(line: &str) -> String { format!("{line}{}", checksum(line)) }
