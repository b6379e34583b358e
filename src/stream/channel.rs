use crate::session::{AnomalyEvent, SnapshotPatch};
use crate::util::Credentials;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Acknowledgment of a credential update, relayed verbatim from the remote source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialAck {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl CredentialAck {
    pub fn failed(message: impl Into<String>) -> Self { Self { success: false, message: message.into() } }
}

/// Everything a streaming channel delivers to the session, in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Connected,
    /// The transport dropped. `will_retry` is false once the retry budget is spent.
    Disconnected { will_retry: bool },
    DashboardData(SnapshotPatch),
    NewAnomaly(AnomalyEvent),
    CredentialsUpdated(CredentialAck),
}

impl ChannelEvent {
    pub const DASHBOARD_DATA: &'static str = "dashboard_data";
    pub const NEW_ANOMALY: &'static str = "new_anomaly";
    pub const CREDENTIALS_UPDATED: &'static str = "credentials_updated";

    /// Decodes a named data event.
    ///
    /// # Returns
    /// `Ok(None)` for event names the session does not consume.
    pub fn decode(name: &str, data: &str) -> Result<Option<Self>, serde_json::Error> {
        let event = match name {
            Self::DASHBOARD_DATA => ChannelEvent::DashboardData(serde_json::from_str(data)?),
            Self::NEW_ANOMALY => ChannelEvent::NewAnomaly(serde_json::from_str(data)?),
            Self::CREDENTIALS_UPDATED => ChannelEvent::CredentialsUpdated(serde_json::from_str(data)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

/// Commands the session sends to the remote source.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelCommand {
    GetDashboardData,
    UpdateCredentials(Credentials),
    ManualAlert(AnomalyEvent),
}

impl ChannelCommand {
    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            ChannelCommand::GetDashboardData => "get_dashboard_data",
            ChannelCommand::UpdateCredentials(_) => "update_credentials",
            ChannelCommand::ManualAlert(_) => "manual_alert",
        }
    }

    /// JSON payload of the command.
    pub fn body(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            ChannelCommand::GetDashboardData => Ok(serde_json::json!({})),
            ChannelCommand::UpdateCredentials(creds) => serde_json::to_value(creds),
            ChannelCommand::ManualAlert(event) => serde_json::to_value(event),
        }
    }
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ChannelError {
    NotOpen,
    Transport(String),
}

impl std::error::Error for ChannelError {}

impl From<crate::http_handler::ResponseError> for ChannelError {
    fn from(value: crate::http_handler::ResponseError) -> Self { ChannelError::Transport(value.to_string()) }
}

/// Receiving end of the events a channel produces.
pub trait EventSink: Send + Sync {
    /// Forwards one event of the connection opened as `generation`.
    /// Events are delivered in the order of these calls.
    fn deliver(&self, generation: u64, event: ChannelEvent);
}

impl EventSink for tokio::sync::mpsc::UnboundedSender<(u64, ChannelEvent)> {
    fn deliver(&self, generation: u64, event: ChannelEvent) {
        // a closed receiver means nobody listens anymore
        let _ = self.send((generation, event));
    }
}

/// A bidirectional event channel to the remote inference source.
///
/// Implementations own reconnection. They report every open with
/// [`ChannelEvent::Connected`] and every drop with [`ChannelEvent::Disconnected`].
/// Each event is tagged with the generation of the `open` call that produced it.
pub trait StreamChannel: Send {
    /// Starts connecting. Events flow to the sink handed over on construction.
    /// Every effective open starts a new generation.
    fn open(&mut self) -> Result<(), ChannelError>;
    /// Generation of the most recent effective open, `0` before the first.
    fn generation(&self) -> u64;
    /// Cancels any in-flight connection. Safe to call in every state.
    fn close(&mut self);
    /// Queues a command for delivery, preserving emission order.
    fn emit(&mut self, command: ChannelCommand) -> Result<(), ChannelError>;
}
