use super::{AnomalyEvent, Severity};
use crate::stream::{ChannelError, ChannelEvent, CredentialAck, EventSink};
use crate::util::Credentials;
use strum_macros::Display;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum SessionError {
    NotRunning,
    Channel(ChannelError),
    QueueClosed,
}

impl std::error::Error for SessionError {}

impl From<ChannelError> for SessionError {
    fn from(value: ChannelError) -> Self { SessionError::Channel(value) }
}

/// One item of the session's single ordered work queue.
#[derive(Debug)]
pub enum SessionEvent {
    /// A channel event tagged with the generation of the connection that produced it.
    Channel { generation: u64, event: ChannelEvent },
    Start,
    Stop,
    Flag(String),
    ManualAlert {
        subject_name: String,
        anomaly_type: String,
        severity: Severity,
        reply: Option<oneshot::Sender<Result<AnomalyEvent, SessionError>>>,
    },
    UpdateCredentials {
        credentials: Credentials,
        ack: oneshot::Sender<CredentialAck>,
    },
    SetTrackedObjects(usize),
}

/// Cloneable entry point into a running [`super::LiveSession`].
///
/// Channel events and operator actions share one queue, so the session observes them
/// in a single total order.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    /// Creates a handle together with the receiving end the session drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: SessionEvent) -> Result<(), SessionError> {
        self.tx.send(event).map_err(|_| SessionError::QueueClosed)
    }

    pub fn start(&self) -> Result<(), SessionError> { self.send(SessionEvent::Start) }
    pub fn stop(&self) -> Result<(), SessionError> { self.send(SessionEvent::Stop) }
    pub fn flag(&self, id: impl Into<String>) -> Result<(), SessionError> { self.send(SessionEvent::Flag(id.into())) }

    pub fn set_tracked_objects(&self, count: usize) -> Result<(), SessionError> {
        self.send(SessionEvent::SetTrackedObjects(count))
    }

    /// Requests a manual alert and waits until the session has submitted it.
    ///
    /// # Returns
    /// The submitted event. The buffered copy arrives later through the stream.
    pub async fn create_manual_alert(
        &self,
        subject_name: &str,
        anomaly_type: &str,
        severity: impl Into<Severity>,
    ) -> Result<AnomalyEvent, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionEvent::ManualAlert {
            subject_name: subject_name.to_string(),
            anomaly_type: anomaly_type.to_string(),
            severity: severity.into(),
            reply: Some(reply),
        })?;
        rx.await.map_err(|_| SessionError::QueueClosed)?
    }

    /// Hands new credentials to the session.
    ///
    /// # Returns
    /// A receiver resolving with the remote acknowledgment of this update.
    pub fn update_credentials(
        &self,
        credentials: Credentials,
    ) -> Result<oneshot::Receiver<CredentialAck>, SessionError> {
        let (ack, rx) = oneshot::channel();
        self.send(SessionEvent::UpdateCredentials { credentials, ack })?;
        Ok(rx)
    }
}

impl EventSink for SessionHandle {
    fn deliver(&self, generation: u64, event: ChannelEvent) {
        // the session loop has ended, nothing left to deliver to
        let _ = self.tx.send(SessionEvent::Channel { generation, event });
    }
}
