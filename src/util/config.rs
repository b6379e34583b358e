use std::{env, path::PathBuf, time::Duration};

/// Runtime settings gathered once from the process environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Address of the monitoring service exposing the event stream and command endpoints.
    base_url: String,
    /// Location of the client-local state file holding persisted credentials.
    state_file: PathBuf,
    /// Maximum number of reconnection attempts the stream channel performs.
    max_retries: usize,
    /// Fixed delay between reconnection attempts.
    retry_backoff: Duration,
    /// Optional Space-Track login; selects the live catalog when present.
    space_track: Option<(String, String)>,
}

impl Settings {
    const DEFAULT_BASE_URL: &'static str = "http://localhost:5000";
    const DEFAULT_STATE_FILE: &'static str = "./sentinel_state.json";
    const DEFAULT_MAX_RETRIES: usize = 5;
    const DEFAULT_RETRY_BACKOFF_MS: u64 = 2000;

    /// Reads all settings from the environment, falling back to defaults for
    /// absent or unparsable values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("SENTINEL_BASE_URL").unwrap_or_else(|| Self::DEFAULT_BASE_URL.into());
        let state_file =
            PathBuf::from(lookup("SENTINEL_STATE_FILE").unwrap_or_else(|| Self::DEFAULT_STATE_FILE.into()));
        let max_retries = lookup("SENTINEL_MAX_RETRIES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(Self::DEFAULT_MAX_RETRIES);
        let retry_backoff = Duration::from_millis(
            lookup("SENTINEL_RETRY_BACKOFF_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(Self::DEFAULT_RETRY_BACKOFF_MS),
        );
        let space_track = match (lookup("SPACE_TRACK_USERNAME"), lookup("SPACE_TRACK_PASSWORD")) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        };
        Self { base_url, state_file, max_retries, retry_backoff, space_track }
    }

    pub fn base_url(&self) -> &str { &self.base_url }
    pub fn state_file(&self) -> &PathBuf { &self.state_file }
    pub fn max_retries(&self) -> usize { self.max_retries }
    pub fn retry_backoff(&self) -> Duration { self.retry_backoff }
    pub fn space_track(&self) -> Option<&(String, String)> { self.space_track.as_ref() }
}
