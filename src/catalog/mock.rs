use super::{CatalogError, CatalogProvider, CatalogRecord};

/// Name, catalog number, inclination (deg), period (min).
const MOCK_OBJECTS: [(&str, u32, f64, f64); 6] = [
    ("ISS (ZARYA)", 25544, 51.64, 92.9),
    ("HST", 20580, 28.47, 95.1),
    ("NOAA 19", 33591, 99.16, 101.9),
    ("STARLINK-1007", 44713, 53.05, 95.6),
    ("SENTINEL-2A", 40697, 98.57, 100.6),
    ("GOES 16", 41866, 0.05, 1436.1),
];

/// Deterministic catalog used when no live source is configured.
#[derive(Debug, Clone, Default)]
pub struct MockCatalog;

impl MockCatalog {
    pub fn new() -> Self { Self }

    pub fn list(&self) -> Vec<CatalogRecord> {
        MOCK_OBJECTS
            .iter()
            .map(|(name, norad_id, inclination, period_minutes)| CatalogRecord {
                name: (*name).to_string(),
                norad_id: *norad_id,
                inclination: *inclination,
                period_minutes: *period_minutes,
                tle: None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl CatalogProvider for MockCatalog {
    fn name(&self) -> &'static str { "mock" }

    async fn records(&self) -> Result<Vec<CatalogRecord>, CatalogError> { Ok(self.list()) }
}
