use super::handle::{SessionError, SessionEvent};
use super::snapshot::{BucketGranularity, DashboardSnapshot, SnapshotPatch};
use super::{AnomalyBuffer, AnomalyEvent, Severity};
use crate::stream::{ChannelCommand, ChannelError, ChannelEvent, CredentialAck, StreamChannel};
use crate::telemetry::TelemetrySource;
use crate::util::credentials::{load_or_none, CredentialStore, Credentials};
use crate::{alert, error, event, info, log, warn};
use chrono::Utc;
use std::collections::VecDeque;
use strum_macros::Display;
use tokio::sync::{mpsc, oneshot};

/// Connection lifecycle as observed by the session.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

type SnapshotConsumer = Box<dyn FnMut(&DashboardSnapshot) + Send>;
type LifecycleListener = Box<dyn FnMut(ConnectionState) + Send>;

/// The live anomaly aggregation session.
///
/// All handlers run to completion before the next queue item is taken, so the buffer
/// and the lifecycle state need no locking.
pub struct LiveSession<C: StreamChannel> {
    channel: C,
    store: Box<dyn CredentialStore>,
    credentials: Option<Credentials>,
    telemetry: Box<dyn TelemetrySource>,
    buffer: AnomalyBuffer,
    running: bool,
    state: ConnectionState,
    tracked_objects: usize,
    granularity: BucketGranularity,
    consumer: Option<SnapshotConsumer>,
    listener: Option<LifecycleListener>,
    /// One slot per `update_credentials` in flight, answered in FIFO order.
    pending_acks: VecDeque<Option<oneshot::Sender<CredentialAck>>>,
    /// Ack of an update requested while disconnected, answered after the next handshake.
    deferred_ack: Option<oneshot::Sender<CredentialAck>>,
}

impl<C: StreamChannel> LiveSession<C> {
    /// Creates a stopped session. Persisted credentials are read once, here.
    pub fn new(channel: C, store: Box<dyn CredentialStore>, telemetry: Box<dyn TelemetrySource>) -> Self {
        let credentials = load_or_none(store.as_ref());
        if credentials.is_some() {
            log!("Loaded persisted service credentials.");
        }
        Self {
            channel,
            store,
            credentials,
            telemetry,
            buffer: AnomalyBuffer::new(),
            running: false,
            state: ConnectionState::Disconnected,
            tracked_objects: 0,
            granularity: BucketGranularity::default(),
            consumer: None,
            listener: None,
            pending_acks: VecDeque::new(),
            deferred_ack: None,
        }
    }

    pub fn buffer(&self) -> &AnomalyBuffer { &self.buffer }
    pub fn state(&self) -> ConnectionState { self.state }
    pub fn is_running(&self) -> bool { self.running }
    pub fn credentials(&self) -> Option<&Credentials> { self.credentials.as_ref() }
    pub fn channel(&self) -> &C { &self.channel }
    pub fn tracked_objects(&self) -> usize { self.tracked_objects }

    /// Registers the snapshot consumer, replacing any previous one.
    pub fn set_consumer(&mut self, consumer: impl FnMut(&DashboardSnapshot) + Send + 'static) {
        self.consumer = Some(Box::new(consumer));
    }

    /// Registers the listener for connection state changes, replacing any previous one.
    pub fn set_lifecycle_listener(&mut self, listener: impl FnMut(ConnectionState) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn set_tracked_objects(&mut self, count: usize) { self.tracked_objects = count; }
    pub fn set_granularity(&mut self, granularity: BucketGranularity) { self.granularity = granularity; }

    /// Marks the session running and opens the channel. No-op while running.
    ///
    /// # Errors
    /// Returns the [`ChannelError`] if the channel could not be opened; the session
    /// stays stopped in that case.
    pub fn start(&mut self) -> Result<(), ChannelError> {
        if self.running {
            return Ok(());
        }
        self.running = true;
        self.set_state(ConnectionState::Connecting);
        if let Err(e) = self.channel.open() {
            self.running = false;
            self.set_state(ConnectionState::Disconnected);
            return Err(e);
        }
        info!("Session started.");
        Ok(())
    }

    /// Marks the session stopped and closes the channel. No-op while stopped.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.channel.close();
        self.fail_pending_acks("session stopped");
        if let Some(ack) = self.deferred_ack.take() {
            let _ = ack.send(CredentialAck::failed("session stopped"));
        }
        self.set_state(ConnectionState::Disconnected);
        info!("Session stopped.");
    }

    /// Handles one event of the connection opened as `generation`.
    ///
    /// Events of earlier connections are dropped, so a reader that outlived a restart
    /// cannot act on the fresh connection.
    pub fn handle_from(&mut self, generation: u64, ev: ChannelEvent) {
        let current = self.channel.generation();
        if generation != current {
            event!("Dropping event of connection {generation} (current {current}): {ev:?}");
            return;
        }
        self.handle(ev);
    }

    /// Handles one event of the current connection. Events arriving while stopped are dropped.
    pub fn handle(&mut self, ev: ChannelEvent) {
        if !self.running {
            event!("Ignoring channel event while stopped: {ev:?}");
            return;
        }
        match ev {
            ChannelEvent::Connected => self.on_connect(),
            ChannelEvent::Disconnected { will_retry } => self.on_disconnect(will_retry),
            ChannelEvent::DashboardData(patch) => self.on_snapshot_push(patch),
            ChannelEvent::NewAnomaly(anomaly) => self.on_anomaly_push(anomaly),
            ChannelEvent::CredentialsUpdated(ack) => self.on_credential_ack(ack),
        }
    }

    fn on_connect(&mut self) {
        self.set_state(ConnectionState::Connected);
        // acks of a previous connection are never answered
        self.fail_pending_acks("connection reset");
        self.emit_logged(ChannelCommand::GetDashboardData);
        if let Some(creds) = self.credentials.clone() {
            let ack = self.deferred_ack.take();
            match self.channel.emit(ChannelCommand::UpdateCredentials(creds)) {
                Ok(()) => self.pending_acks.push_back(ack),
                Err(e) => {
                    warn!("Could not re-assert credentials: {e}");
                    if let Some(ack) = ack {
                        let _ = ack.send(CredentialAck::failed(e.to_string()));
                    }
                }
            }
        }
    }

    fn on_disconnect(&mut self, will_retry: bool) {
        self.set_state(ConnectionState::Disconnected);
        self.fail_pending_acks("disconnected");
        if will_retry {
            self.set_state(ConnectionState::Connecting);
        } else {
            error!("Channel gave up reconnecting; session stays disconnected.");
            self.stop();
        }
    }

    /// Merges `patch` over a fresh snapshot and hands the result to the consumer.
    pub fn on_snapshot_push(&mut self, patch: SnapshotPatch) {
        let snapshot = self.build_snapshot().merged(patch);
        self.deliver(&snapshot);
    }

    /// Ingests a pushed anomaly. Duplicates are dropped and nothing is rebuilt.
    pub fn on_anomaly_push(&mut self, anomaly: AnomalyEvent) {
        let (id, name, kind, severity) = (
            anomaly.id().to_string(),
            anomaly.satellite_name().to_string(),
            anomaly.anomaly().kind().to_string(),
            anomaly.severity().clone(),
        );
        if self.buffer.push(anomaly) {
            alert!("{severity} anomaly '{kind}' on {name} ({id})");
        } else {
            event!("Duplicate anomaly {id} dropped.");
        }
    }

    fn on_credential_ack(&mut self, ack: CredentialAck) {
        if ack.success {
            info!("Credentials accepted: {}", ack.message);
        } else {
            warn!("Credentials rejected: {}", ack.message);
        }
        if let Some(Some(tx)) = self.pending_acks.pop_front() {
            let _ = tx.send(ack);
        }
    }

    /// Marks a buffered anomaly reviewed and pushes a rebuilt snapshot.
    ///
    /// # Returns
    /// `false` without side effects if no such anomaly is buffered.
    pub fn flag(&mut self, id: &str) -> bool {
        if !self.buffer.flag(id) {
            return false;
        }
        let snapshot = self.build_snapshot();
        self.deliver(&snapshot);
        true
    }

    /// Submits an operator-authored alert for broadcast.
    ///
    /// The event is not buffered here; it comes back through the stream like any other.
    ///
    /// # Errors
    /// Fails if the session is stopped or the channel refuses the command.
    pub fn create_manual_alert(
        &mut self,
        subject_name: &str,
        anomaly_type: &str,
        severity: impl Into<Severity>,
    ) -> Result<AnomalyEvent, SessionError> {
        if !self.running {
            return Err(SessionError::NotRunning);
        }
        let anomaly = AnomalyEvent::manual(subject_name, anomaly_type, severity.into());
        self.channel.emit(ChannelCommand::ManualAlert(anomaly.clone()))?;
        log!("Submitted manual alert {} for {subject_name}.", anomaly.id());
        Ok(anomaly)
    }

    /// Persists and forwards new credentials.
    ///
    /// # Returns
    /// A receiver that resolves with the matching remote acknowledgment.
    pub fn update_credentials(&mut self, credentials: Credentials) -> oneshot::Receiver<CredentialAck> {
        let (tx, rx) = oneshot::channel();
        self.update_credentials_with(credentials, tx);
        rx
    }

    fn update_credentials_with(&mut self, credentials: Credentials, ack: oneshot::Sender<CredentialAck>) {
        if let Err(e) = self.store.save(&credentials) {
            warn!("Could not persist credentials: {e}");
        }
        self.credentials = Some(credentials.clone());
        if self.state != ConnectionState::Connected {
            // re-asserted by the next handshake
            if let Some(previous) = self.deferred_ack.replace(ack) {
                let _ = previous.send(CredentialAck::failed("superseded by a newer update"));
            }
            return;
        }
        match self.channel.emit(ChannelCommand::UpdateCredentials(credentials)) {
            Ok(()) => self.pending_acks.push_back(Some(ack)),
            Err(e) => {
                let _ = ack.send(CredentialAck::failed(e.to_string()));
            }
        }
    }

    /// Computes the full snapshot from the current session state.
    pub fn build_snapshot(&mut self) -> DashboardSnapshot {
        DashboardSnapshot::build(
            &self.buffer,
            self.tracked_objects,
            self.telemetry.series(Utc::now()),
            self.granularity,
        )
    }

    /// Drains the work queue until every sender is gone, then stops.
    pub async fn run(&mut self, mut rx: mpsc::UnboundedReceiver<SessionEvent>) {
        while let Some(item) = rx.recv().await {
            self.dispatch(item);
        }
        self.stop();
    }

    /// Applies one queue item.
    pub fn dispatch(&mut self, item: SessionEvent) {
        match item {
            SessionEvent::Channel { generation, event } => self.handle_from(generation, event),
            SessionEvent::Start => {
                if let Err(e) = self.start() {
                    error!("Could not open the event channel: {e}");
                }
            }
            SessionEvent::Stop => self.stop(),
            SessionEvent::Flag(id) => {
                if !self.flag(&id) {
                    event!("Flag for unknown anomaly {id} ignored.");
                }
            }
            SessionEvent::ManualAlert { subject_name, anomaly_type, severity, reply } => {
                let res = self.create_manual_alert(&subject_name, &anomaly_type, severity);
                match reply {
                    Some(reply) => {
                        let _ = reply.send(res);
                    }
                    None => {
                        if let Err(e) = res {
                            warn!("Manual alert for {subject_name} not submitted: {e}");
                        }
                    }
                }
            }
            SessionEvent::UpdateCredentials { credentials, ack } => {
                self.update_credentials_with(credentials, ack);
            }
            SessionEvent::SetTrackedObjects(count) => self.set_tracked_objects(count),
        }
    }

    fn deliver(&mut self, snapshot: &DashboardSnapshot) {
        if let Some(consumer) = self.consumer.as_mut() {
            consumer(snapshot);
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state == state {
            return;
        }
        event!("Connection state {} -> {state}", self.state);
        self.state = state;
        if let Some(listener) = self.listener.as_mut() {
            listener(state);
        }
    }

    fn emit_logged(&mut self, command: ChannelCommand) {
        let name = command.name();
        if let Err(e) = self.channel.emit(command) {
            warn!("Could not send '{name}': {e}");
        }
    }

    fn fail_pending_acks(&mut self, reason: &str) {
        for ack in self.pending_acks.drain(..).flatten() {
            let _ = ack.send(CredentialAck::failed(reason));
        }
    }
}
