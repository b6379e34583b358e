//! Object catalog seam. A provider yields the records that seed trajectory requests and
//! the tracked-object count; it may be a live authenticated source or a fixed mock.

mod mock;
mod space_track;

pub use mock::MockCatalog;
pub use space_track::SpaceTrackCatalog;

use crate::http_handler::ResponseError;
use crate::trajectory::{ElementSource, ElementsError, OrbitalElementSet, TrajectoryRequest};
use strum_macros::Display;

/// One tracked object as listed by a catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    pub name: String,
    pub norad_id: u32,
    /// Inclination in degrees.
    pub inclination: f64,
    pub period_minutes: f64,
    /// Verbatim element lines, when the catalog publishes them.
    pub tle: Option<(String, String)>,
}

impl CatalogRecord {
    /// Trajectory request for this object with the default window.
    pub fn trajectory_request(&self) -> TrajectoryRequest {
        TrajectoryRequest::new(self.norad_id, self.inclination, self.period_minutes)
    }

    /// Authoritative element set built from the published lines, if any.
    pub fn element_set(&self) -> Option<Result<OrbitalElementSet, ElementsError>> {
        self.tle.as_ref().map(|(line1, line2)| {
            OrbitalElementSet::from_lines(Some(self.name.as_str()), line1, line2, ElementSource::Catalog)
        })
    }
}

#[derive(Debug, Display)]
pub enum CatalogError {
    Unauthorized,
    Request(ResponseError),
    Malformed(String),
}

impl std::error::Error for CatalogError {}

impl From<ResponseError> for CatalogError {
    fn from(value: ResponseError) -> Self {
        match value {
            ResponseError::Unauthorized => CatalogError::Unauthorized,
            other => CatalogError::Request(other),
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(value: reqwest::Error) -> Self { CatalogError::from(ResponseError::from(value)) }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self { CatalogError::Malformed(value.to_string()) }
}

/// A source of catalog records.
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;
    /// Fetches the current record list.
    async fn records(&self) -> Result<Vec<CatalogRecord>, CatalogError>;
}

#[cfg(test)]
mod tests;
