use super::channel::{ChannelCommand, ChannelError, ChannelEvent, EventSink, StreamChannel};
use crate::http_handler::http_client::HTTPClient;
use crate::{error, event, info, warn};
use futures::StreamExt;
use reqwest_eventsource::{retry, Event, EventSource, ReadyState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

/// Streaming channel over server-sent events with commands posted as JSON.
///
/// Events are read from `GET {base}/stream`; the SSE `event:` field names the event.
/// Commands go to `POST {base}/{command}` through a single writer task, so they reach
/// the service in emission order.
pub struct SseChannel {
    client: Arc<HTTPClient>,
    sink: Arc<dyn EventSink>,
    backoff: Duration,
    max_retries: usize,
    cancel: Option<CancellationToken>,
    commands: Option<UnboundedSender<ChannelCommand>>,
    generation: u64,
}

impl SseChannel {
    const STREAM_ENDPOINT: &'static str = "stream";

    /// Creates a closed channel.
    ///
    /// # Arguments
    /// * `client` – Shared HTTP client carrying the service base URL.
    /// * `sink` – Receiver of every channel event.
    /// * `backoff` – Fixed delay between reconnection attempts.
    /// * `max_retries` – Reconnection attempts before the channel gives up.
    pub(crate) fn new(
        client: Arc<HTTPClient>,
        sink: Arc<dyn EventSink>,
        backoff: Duration,
        max_retries: usize,
    ) -> Self {
        Self { client, sink, backoff, max_retries, cancel: None, commands: None, generation: 0 }
    }

    fn is_open(&self) -> bool { self.cancel.as_ref().is_some_and(|tok| !tok.is_cancelled()) }

    async fn read_events(
        mut source: EventSource,
        sink: Arc<dyn EventSink>,
        generation: u64,
        c_tok: CancellationToken,
    ) {
        loop {
            tokio::select! {
                () = c_tok.cancelled() => {
                    source.close();
                    return;
                }
                next = source.next() => match next {
                    Some(Ok(Event::Open)) => {
                        info!("Event stream connected.");
                        sink.deliver(generation, ChannelEvent::Connected);
                    }
                    Some(Ok(Event::Message(msg))) => {
                        event!("Stream event '{}' ({} bytes)", msg.event, msg.data.len());
                        match ChannelEvent::decode(&msg.event, &msg.data) {
                            Ok(Some(ev)) => sink.deliver(generation, ev),
                            Ok(None) => {}
                            Err(e) => warn!("Dropping malformed '{}' payload: {e}", msg.event),
                        }
                    }
                    Some(Err(e)) => {
                        let will_retry = !matches!(source.ready_state(), ReadyState::Closed);
                        warn!("Event stream dropped: {e} (retrying: {will_retry})");
                        sink.deliver(generation, ChannelEvent::Disconnected { will_retry });
                        if !will_retry {
                            break;
                        }
                    }
                    None => {
                        sink.deliver(generation, ChannelEvent::Disconnected { will_retry: false });
                        break;
                    }
                }
            }
        }
        error!("Event stream closed after exhausting reconnection attempts.");
        c_tok.cancel();
    }

    async fn write_commands(client: Arc<HTTPClient>, mut rx: UnboundedReceiver<ChannelCommand>) {
        while let Some(cmd) = rx.recv().await {
            let body = match cmd.body() {
                Ok(body) => body,
                Err(e) => {
                    warn!("Could not encode '{}': {e}", cmd.name());
                    continue;
                }
            };
            event!("Posting '{}'", cmd.name());
            if let Err(e) = client.post_json(cmd.name(), &body).await {
                warn!("Command '{}' failed: {e}", cmd.name());
            }
        }
    }
}

impl StreamChannel for SseChannel {
    fn open(&mut self) -> Result<(), ChannelError> {
        if self.is_open() {
            return Ok(());
        }
        let request = self.client.client().get(self.client.endpoint(Self::STREAM_ENDPOINT));
        let mut source = EventSource::new(request).map_err(|e| ChannelError::Transport(e.to_string()))?;
        source.set_retry_policy(Box::new(retry::Constant::new(self.backoff, Some(self.max_retries))));

        self.close();
        self.generation += 1;
        let c_tok = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(Self::read_events(source, Arc::clone(&self.sink), self.generation, c_tok.clone()));
        tokio::spawn(Self::write_commands(Arc::clone(&self.client), rx));
        info!("Connecting to {}/{}", self.client.url(), Self::STREAM_ENDPOINT);
        self.cancel = Some(c_tok);
        self.commands = Some(tx);
        Ok(())
    }

    fn generation(&self) -> u64 { self.generation }

    fn close(&mut self) {
        if let Some(c_tok) = self.cancel.take() {
            c_tok.cancel();
        }
        self.commands = None;
    }

    fn emit(&mut self, command: ChannelCommand) -> Result<(), ChannelError> {
        let tx = self.commands.as_ref().ok_or(ChannelError::NotOpen)?;
        tx.send(command).map_err(|_| ChannelError::Transport("command writer stopped".into()))
    }
}

impl Drop for SseChannel {
    fn drop(&mut self) { self.close(); }
}
