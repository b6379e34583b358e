use super::space_track::parse_records;
use super::{CatalogError, CatalogProvider, MockCatalog, SpaceTrackCatalog};
use crate::http_handler::ResponseError;
use crate::trajectory::{ElementSource, TrajectoryEngine};
use crate::util::Credentials;

const ISS_L1: &str = "1 25544U 98067A   24045.51724537  .00016717  00000-0  30571-3 0  9990";
const ISS_L2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.49815308440001";

#[tokio::test]
async fn test_mock_catalog_is_deterministic() {
    let catalog = MockCatalog::new();
    let first = catalog.records().await.unwrap();
    let second = catalog.records().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 6);
    assert_eq!(first[0].norad_id, 25544);
    assert!(first.iter().all(|r| r.tle.is_none() && r.element_set().is_none()));
    assert_eq!(catalog.name(), "mock");
}

#[test]
fn test_mock_records_seed_trajectories() {
    let engine = TrajectoryEngine::new();
    // known sets carry old epochs; only synthesized objects are propagated here
    for record in MockCatalog::new().list().into_iter().filter(|r| engine.known(r.norad_id).is_none()) {
        let request = record.trajectory_request().with_window(1, 1, 2);
        assert_eq!(request.catalog_id, record.norad_id);
        let trajectory = engine.build_history_and_future(&request).unwrap();
        assert_eq!(trajectory.elements().catalog_id(), record.norad_id);
        assert!(!trajectory.historical().is_empty() && !trajectory.future().is_empty());
    }
}

#[test]
fn test_parse_space_track_rows() {
    let body = format!(
        r#"[
            {{"OBJECT_NAME": "ISS (ZARYA)", "NORAD_CAT_ID": "25544", "INCLINATION": "51.6416",
              "MEAN_MOTION": "15.49815308", "TLE_LINE1": "{ISS_L1}", "TLE_LINE2": "{ISS_L2}"}},
            {{"OBJECT_NAME": "DEBRIS", "NORAD_CAT_ID": "99999", "INCLINATION": "72.0", "MEAN_MOTION": "0"}},
            {{"NORAD_CAT_ID": 43013, "INCLINATION": 97.7, "MEAN_MOTION": 14.8}}
        ]"#
    );
    let records = parse_records(&body).unwrap();
    assert_eq!(records.len(), 2);

    let iss = &records[0];
    assert_eq!(iss.name, "ISS (ZARYA)");
    assert!((iss.period_minutes - 1440.0 / 15.498_153_08).abs() < 1e-9);
    let set = iss.element_set().unwrap().unwrap();
    assert_eq!(set.source(), ElementSource::Catalog);
    assert_eq!(set.name(), Some("ISS (ZARYA)"));

    assert_eq!(records[1].name, "NORAD 43013");
    assert!(records[1].tle.is_none());

    let engine = TrajectoryEngine::new().with_known(records.iter().filter_map(|r| r.element_set()?.ok()));
    assert_eq!(engine.known(25544).unwrap().line1(), ISS_L1);
}

#[test]
fn test_parse_rejects_non_array_answer() {
    assert!(matches!(parse_records(r#"{"error": "You must be logged in"}"#), Err(CatalogError::Malformed(_))));
}

#[test]
fn test_query_url_lists_requested_ids() {
    let catalog =
        SpaceTrackCatalog::with_base_url("https://st.example/", Credentials::new("u", "p"), vec![25544, 20580]).unwrap();
    assert_eq!(
        catalog.query_url(),
        "https://st.example/basicspacedata/query/class/tle_latest/ORDINAL/1/NORAD_CAT_ID/25544,20580/format/json"
    );
}

#[test]
fn test_unauthorized_responses_map_to_catalog_error() {
    assert!(matches!(CatalogError::from(ResponseError::Unauthorized), CatalogError::Unauthorized));
    assert!(matches!(
        CatalogError::from(ResponseError::InternalServer),
        CatalogError::Request(ResponseError::InternalServer)
    ));
}
