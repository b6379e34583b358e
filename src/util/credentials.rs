use crate::warn;
use serde::{Deserialize, Serialize};
use std::{fs, io::ErrorKind, path::PathBuf};
use strum_macros::Display;

/// Username/password pair re-asserted to the monitoring service on every connection.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("username", &self.username).field("password", &"***").finish()
    }
}

#[derive(Debug, Display)]
pub enum StoreError {
    Io(String),
    Malformed(String),
}

impl std::error::Error for StoreError {}
impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self { StoreError::Io(value.to_string()) }
}
impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self { StoreError::Malformed(value.to_string()) }
}

/// Client-local persistence for the single credential record.
pub trait CredentialStore: Send {
    /// Reads the stored record, `Ok(None)` if nothing was stored yet.
    fn load(&self) -> Result<Option<Credentials>, StoreError>;
    /// Replaces the stored record.
    fn save(&mut self, credentials: &Credentials) -> Result<(), StoreError>;
}

/// Reads the credential record once, treating any fault as "no credentials".
pub fn load_or_none(store: &dyn CredentialStore) -> Option<Credentials> {
    match store.load() {
        Ok(creds) => creds,
        Err(e) => {
            warn!("Ignoring persisted credentials: {e}");
            None
        }
    }
}

/// A JSON object file acting as key/value storage, with the credential record living
/// under [`FileCredentialStore::KEY`]. Other keys in the file are preserved on save.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub const KEY: &'static str = "spacetrack_credentials";

    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    fn read_map(&self) -> Result<serde_json::Map<String, serde_json::Value>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(serde_json::Map::new()),
            Ok(content) => match serde_json::from_str(&content)? {
                serde_json::Value::Object(map) => Ok(map),
                _ => Err(StoreError::Malformed("state file is not a JSON object".into())),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(serde_json::Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, StoreError> {
        match self.read_map()?.remove(Self::KEY) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    fn save(&mut self, credentials: &Credentials) -> Result<(), StoreError> {
        // an unreadable file is replaced rather than blocking the update
        let mut map = self.read_map().unwrap_or_default();
        map.insert(Self::KEY.to_string(), serde_json::to_value(credentials)?);
        fs::write(&self.path, serde_json::to_string_pretty(&map)?)?;
        Ok(())
    }
}
