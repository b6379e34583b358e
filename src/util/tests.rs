use super::credentials::{load_or_none, CredentialStore, Credentials, FileCredentialStore};
use super::Settings;
use std::{collections::HashMap, fs, time::Duration};

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> =
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_settings_defaults() {
    let settings = Settings::from_lookup(lookup_from(&[]));
    assert_eq!(settings.base_url(), "http://localhost:5000");
    assert_eq!(settings.max_retries(), 5);
    assert_eq!(settings.retry_backoff(), Duration::from_millis(2000));
    assert!(settings.space_track().is_none());
}

#[test]
fn test_settings_overrides_and_bad_numbers() {
    let settings = Settings::from_lookup(lookup_from(&[
        ("SENTINEL_BASE_URL", "http://ml.local:5000"),
        ("SENTINEL_MAX_RETRIES", "not-a-number"),
        ("SENTINEL_RETRY_BACKOFF_MS", "250"),
        ("SPACE_TRACK_USERNAME", "ops"),
        ("SPACE_TRACK_PASSWORD", ""),
    ]));
    assert_eq!(settings.base_url(), "http://ml.local:5000");
    assert_eq!(settings.max_retries(), 5);
    assert_eq!(settings.retry_backoff(), Duration::from_millis(250));
    assert!(settings.space_track().is_none());
}

#[test]
fn test_file_store_roundtrip_preserves_other_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

    let mut store = FileCredentialStore::new(&path);
    assert_eq!(store.load().unwrap(), None);
    store.save(&Credentials::new("ops", "hunter2")).unwrap();

    assert_eq!(store.load().unwrap(), Some(Credentials::new("ops", "hunter2")));
    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["theme"], "dark");
}

#[test]
fn test_file_store_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path().join("absent.json"));
    assert_eq!(load_or_none(&store), None);
}

#[test]
fn test_malformed_credentials_are_treated_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    fs::write(&path, r#"{"spacetrack_credentials": {"username": 7}}"#).unwrap();
    let store = FileCredentialStore::new(&path);
    assert!(store.load().is_err());
    assert_eq!(load_or_none(&store), None);

    fs::write(&path, "{not json").unwrap();
    assert_eq!(load_or_none(&store), None);
}

#[test]
fn test_credentials_debug_hides_password() {
    let rendered = format!("{:?}", Credentials::new("ops", "hunter2"));
    assert!(rendered.contains("ops"));
    assert!(!rendered.contains("hunter2"));
}
