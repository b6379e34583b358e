#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod catalog;
mod http_handler;
mod session;
mod stream;
mod telemetry;
mod trajectory;
mod util;

use crate::catalog::{CatalogProvider, CatalogRecord, MockCatalog, SpaceTrackCatalog};
use crate::http_handler::http_client::HTTPClient;
use crate::session::{LiveSession, SessionHandle};
use crate::stream::SseChannel;
use crate::telemetry::SyntheticTelemetry;
use crate::trajectory::TrajectoryEngine;
use crate::util::{CredentialStore, Credentials, FileCredentialStore, Settings};
use std::sync::Arc;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let settings = Settings::from_env();
    info!("Monitoring service at {}", settings.base_url());

    let records = fetch_records(&settings).await;
    let engine = TrajectoryEngine::new().with_known(records.iter().filter_map(|r| match r.element_set()? {
        Ok(set) => Some(set),
        Err(e) => {
            warn!("Ignoring published elements of {}: {e}", r.name);
            None
        }
    }));
    if let Some(record) = records.first() {
        log_trajectory(&engine, record);
    }

    let client = Arc::new(
        HTTPClient::new(settings.base_url()).unwrap_or_else(|e| fatal!("Could not build HTTP client: {e}")),
    );
    let (handle, rx) = SessionHandle::channel();
    let channel =
        SseChannel::new(client, Arc::new(handle.clone()), settings.retry_backoff(), settings.max_retries());
    let store = FileCredentialStore::new(settings.state_file().clone());
    let stored = store.load().ok().flatten();

    let mut session = LiveSession::new(channel, Box::new(store), Box::new(SyntheticTelemetry::new()));
    session.set_tracked_objects(records.len());
    session.set_lifecycle_listener(|state| log!("Connection {state}"));
    session.set_consumer(|snap| {
        let h = snap.header;
        info!(
            "Dashboard: {} alerts, {} tracked, {} techniques covered, score {}",
            h.alert_count, h.tracked_objects, h.coverage_count, h.score
        );
    });

    if handle.start().is_err() {
        fatal!("Session queue closed before start");
    }
    if let Some((user, pass)) = settings.space_track() {
        let creds = Credentials::new(user.as_str(), pass.as_str());
        if stored.as_ref() != Some(&creds) {
            forward_credentials(&handle, creds);
        }
    }

    tokio::select! {
        () = session.run(rx) => {}
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                error!("Could not listen for shutdown signal: {e}");
            }
            info!("Shutting down.");
        }
    }
    session.stop();
}

/// Loads catalog records, using the live catalog when configured and the mock otherwise.
async fn fetch_records(settings: &Settings) -> Vec<CatalogRecord> {
    let mock = MockCatalog::new();
    let Some((user, pass)) = settings.space_track() else {
        return mock.list();
    };
    let creds = Credentials::new(user.as_str(), pass.as_str());
    let live = match SpaceTrackCatalog::new(creds, SpaceTrackCatalog::DEFAULT_IDS.to_vec()) {
        Ok(live) => live,
        Err(e) => {
            warn!("Live catalog unavailable ({e}), using the {} catalog.", mock.name());
            return mock.list();
        }
    };
    match live.records().await {
        Ok(records) if !records.is_empty() => records,
        Ok(_) => {
            warn!("{} returned no records, using the {} catalog.", live.name(), mock.name());
            mock.list()
        }
        Err(e) => {
            warn!("{} fetch failed ({e}), using the {} catalog.", live.name(), mock.name());
            mock.list()
        }
    }
}

fn log_trajectory(engine: &TrajectoryEngine, record: &CatalogRecord) {
    match engine.build_history_and_future(&record.trajectory_request()) {
        Ok(trajectory) => {
            let now = trajectory.historical().last().or(trajectory.future().first());
            info!(
                "Trajectory of {} ({} elements): {} past / {} future points",
                record.name,
                trajectory.elements().source(),
                trajectory.historical().len(),
                trajectory.future().len()
            );
            if let Some(p) = now {
                info!(
                    "{} now at {:.2}°, {:.2}°, {:.1} km, {:.2} km/s",
                    record.name, p.latitude, p.longitude, p.altitude, p.velocity
                );
            }
        }
        Err(e) => warn!("No trajectory for {}: {e}", record.name),
    }
}

fn forward_credentials(handle: &SessionHandle, creds: Credentials) {
    match handle.update_credentials(creds) {
        Ok(ack) => {
            tokio::spawn(async move {
                match ack.await {
                    Ok(ack) if ack.success => info!("Service accepted credentials: {}", ack.message),
                    Ok(ack) => warn!("Service rejected credentials: {}", ack.message),
                    Err(_) => warn!("Credential update dropped without acknowledgment."),
                }
            });
        }
        Err(e) => error!("Could not forward credentials: {e}"),
    }
}
