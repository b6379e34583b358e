use super::{ChannelCommand, ChannelError, ChannelEvent, CredentialAck, EventSink, SseChannel, StreamChannel};
use crate::http_handler::http_client::HTTPClient;
use crate::session::Severity;
use crate::util::Credentials;
use std::sync::Arc;
use std::time::Duration;

const ANOMALY_JSON: &str = r#"{
    "id": "a1",
    "satellite_name": "ISS (ZARYA)",
    "norad_id": 25544,
    "anomaly": {"type": "Power Fluctuation", "severity": "high", "details": {"confidence": 0.93}},
    "timestamp": "2026-05-04T17:42:10Z",
    "location": {"lat": 12.5, "lon": -44.0, "alt": 418.2},
    "threat_context": {"tactic": "Impact"}
}"#;

#[test]
fn test_decode_new_anomaly() {
    let Some(ChannelEvent::NewAnomaly(event)) = ChannelEvent::decode("new_anomaly", ANOMALY_JSON).unwrap() else {
        panic!("expected an anomaly event");
    };
    assert_eq!(event.id(), "a1");
    assert_eq!(event.norad_id(), Some(25544));
    assert_eq!(*event.severity(), Severity::High);
    assert_eq!(event.anomaly().details()["confidence"], 0.93);
    assert!(event.predicted_trajectory().is_none());
    assert_eq!(event.threat_context().unwrap()["tactic"], "Impact");
    assert!(!event.is_reviewed());
}

#[test]
fn test_decode_keeps_unknown_severity() {
    let json = ANOMALY_JSON.replace("\"high\"", "\"elevated\"");
    let Some(ChannelEvent::NewAnomaly(event)) = ChannelEvent::decode("new_anomaly", &json).unwrap() else {
        panic!("expected an anomaly event");
    };
    assert_eq!(*event.severity(), Severity::Other("elevated".into()));
    assert_eq!(event.severity().weight(), 0);
    let back = serde_json::to_value(&event).unwrap();
    assert_eq!(back["anomaly"]["severity"], "elevated");
}

#[test]
fn test_decode_dashboard_partial() {
    let data = r#"{"header": {"alert_count": 3, "tracked_objects": 12, "coverage_count": 6, "score": 40},
                   "threat_map": {"hotspots": []}}"#;
    let Some(ChannelEvent::DashboardData(patch)) = ChannelEvent::decode("dashboard_data", data).unwrap() else {
        panic!("expected dashboard data");
    };
    assert_eq!(patch.header.unwrap().tracked_objects, 12);
    assert!(patch.telemetry.is_none());
    assert!(patch.panels.contains_key("threat_map"));
}

#[test]
fn test_decode_credential_ack_and_unknown_events() {
    let ack = ChannelEvent::decode("credentials_updated", r#"{"success": false, "message": "Login failed"}"#);
    assert_eq!(
        ack.unwrap(),
        Some(ChannelEvent::CredentialsUpdated(CredentialAck { success: false, message: "Login failed".into() }))
    );
    assert_eq!(ChannelEvent::decode("heartbeat", "not json").unwrap(), None);
    assert!(ChannelEvent::decode("new_anomaly", "{\"id\": 1}").is_err());
}

#[test]
fn test_command_wire_shape() {
    let creds = Credentials::new("ops", "hunter2");
    let cmd = ChannelCommand::UpdateCredentials(creds);
    assert_eq!(cmd.name(), "update_credentials");
    assert_eq!(cmd.body().unwrap(), serde_json::json!({"username": "ops", "password": "hunter2"}));
    assert_eq!(ChannelCommand::GetDashboardData.name(), "get_dashboard_data");
    assert_eq!(ChannelCommand::GetDashboardData.body().unwrap(), serde_json::json!({}));

    let manual = crate::session::AnomalyEvent::manual("TestSat", "Signal Loss", Severity::Low);
    let cmd = ChannelCommand::ManualAlert(manual.clone());
    assert_eq!(cmd.name(), "manual_alert");
    let body = cmd.body().unwrap();
    assert_eq!(body["id"], manual.id());
    assert_eq!(body["reviewed"], true);
    assert_eq!(body["anomaly"]["type"], "Signal Loss");
}

#[tokio::test]
async fn test_unbounded_sender_is_a_sink() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    tx.deliver(1, ChannelEvent::Connected);
    tx.deliver(2, ChannelEvent::Disconnected { will_retry: true });
    assert_eq!(rx.recv().await, Some((1, ChannelEvent::Connected)));
    assert_eq!(rx.recv().await, Some((2, ChannelEvent::Disconnected { will_retry: true })));
    drop(rx);
    // delivering into a closed queue is silent
    tx.deliver(3, ChannelEvent::Connected);
}

#[test]
fn test_sse_channel_rejects_commands_before_open() {
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel::<(u64, ChannelEvent)>();
    let client = Arc::new(HTTPClient::new("http://localhost:5000/").unwrap());
    assert_eq!(client.endpoint("stream"), "http://localhost:5000/stream");
    let mut channel = SseChannel::new(client, Arc::new(tx), Duration::from_millis(10), 1);
    assert_eq!(channel.emit(ChannelCommand::GetDashboardData), Err(ChannelError::NotOpen));
    assert_eq!(channel.generation(), 0);
    channel.close();
    channel.close();
}
