//! One command, one response
//!
//! [`RequestEngine`] owns the accumulation state for a connection and runs
//! a single write/read round trip under an absolute deadline. It is not
//! re-entrant; the session serializes callers.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace, warn};

use macropad_frame::{FrameCodec, FrameMode};
use macropad_protocol::{
    AckResponse, Command, CommandKind, ConfigResponse, CorrelationCounter, ProtocolHeader, Response,
    parse_response,
};
use macropad_transport::{Direction, ReadOutcome, Transport, TransportError};

use crate::config::ClientConfig;
use crate::debug_log::{DebugLog, LogDirection};
use crate::error::{ClientError, ClientResult};

/// Sequential request/response runner for one connection
#[derive(Debug)]
pub struct RequestEngine {
    codec: FrameCodec,
    read_chunk: usize,
    timeout: Duration,
    empty_read_backoff: Duration,
    decode_backoff: Duration,
    drain_window: Duration,
    verify_correlation: bool,
    correlation: CorrelationCounter,
    needs_drain: bool,
    log: Option<DebugLog>,
}

impl RequestEngine {
    /// Create an engine using the timings and framing in `config`
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            codec: config.codec(),
            read_chunk: config.read_chunk_size,
            timeout: config.request_timeout(),
            empty_read_backoff: config.empty_read_backoff(),
            decode_backoff: config.decode_backoff(),
            drain_window: config.drain_window(),
            verify_correlation: config.verify_correlation,
            correlation: CorrelationCounter::new(),
            needs_drain: false,
            log: None,
        }
    }

    /// Record every sent and received payload in `log`
    pub fn with_debug_log(mut self, log: DebugLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Header for the next command
    pub fn next_header(&mut self) -> ProtocolHeader {
        self.correlation.next_header()
    }

    /// Framing in use
    pub fn frame_mode(&self) -> FrameMode {
        self.codec.mode()
    }

    /// Whether bytes from an abandoned request may still be in flight
    pub fn needs_drain(&self) -> bool {
        self.needs_drain
    }

    /// Send `command` and wait for its response.
    ///
    /// The deadline covers the write and every read. When it expires, or
    /// the incoming stream is corrupt, whatever the device sends next is
    /// discarded before the following command goes out. Replies that echo a
    /// different correlation id are skipped; if nothing else arrives before
    /// the deadline and verification is on, the call fails with
    /// [`ClientError::CorrelationMismatch`] instead of a timeout.
    pub async fn send(
        &mut self,
        transport: &mut dyn Transport,
        command: &Command,
    ) -> ClientResult<Response> {
        if self.needs_drain {
            self.drain_stale(transport).await?;
        }

        let payload = command.to_payload()?;
        let frame = self.codec.encode(&payload)?;
        let kind = command.kind();
        let sent_id = command.header().correlation_id;

        debug!(
            command = %kind,
            correlation_id = ?sent_id,
            bytes = frame.len(),
            mode = %self.codec.mode(),
            "sending command"
        );
        if let Some(log) = &self.log {
            log.record(LogDirection::Sent, &payload);
        }

        let deadline = Instant::now().checked_add(self.timeout).ok_or_else(|| {
            ClientError::InvalidConfig(format!("request timeout {:?} is out of range", self.timeout))
        })?;
        let mut stale = None;
        let exchange = self.exchange(transport, &frame, sent_id, &mut stale);
        let (received, response) = match tokio::time::timeout_at(deadline, exchange).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(error)) => {
                if matches!(error, ClientError::Framing(_)) {
                    self.needs_drain = true;
                }
                return Err(error);
            }
            Err(_) => {
                self.needs_drain = true;
                if let (true, Some(expected), Some(actual)) = (self.verify_correlation, sent_id, stale) {
                    warn!(command = %kind, expected, actual, "only replies to earlier commands before deadline");
                    return Err(ClientError::CorrelationMismatch { expected, actual });
                }
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(command = %kind, timeout_ms, "no complete response before deadline");
                return Err(ClientError::timeout(timeout_ms));
            }
        };

        debug!(
            response = %response.kind(),
            correlation_id = ?response.header().correlation_id,
            bytes = received.len(),
            "response received"
        );
        Ok(response)
    }

    /// Write `frame`, then read until a reply that is not addressed to an
    /// earlier command. Replies echoing another correlation id are dropped
    /// and their id is left in `stale`.
    async fn exchange(
        &self,
        transport: &mut dyn Transport,
        frame: &[u8],
        sent_id: Option<u64>,
        stale: &mut Option<u64>,
    ) -> ClientResult<(Vec<u8>, Response)> {
        let written = transport.write(frame).await?;
        if written != frame.len() {
            return Err(TransportError::ShortWrite {
                written,
                expected: frame.len(),
            }
            .into());
        }

        let mut decoder = self.codec.decoder();
        loop {
            match transport.read(self.read_chunk).await? {
                ReadOutcome::Stall => {
                    warn!("IN endpoint stalled, clearing halt");
                    transport.clear_halt(Direction::In).await?;
                }
                ReadOutcome::Babble => return Err(TransportError::Babble.into()),
                ReadOutcome::Data(chunk) if chunk.is_empty() => {
                    tokio::time::sleep(self.empty_read_backoff).await;
                }
                ReadOutcome::Data(chunk) => {
                    trace!(bytes = chunk.len(), buffered = decoder.buffered(), "chunk received");
                    let mut next = decoder.feed(&chunk)?;
                    while let Some(payload) = next {
                        if let Some(log) = &self.log {
                            log.record(LogDirection::Received, &payload);
                        }
                        let response = parse_response(&payload)?;
                        match (sent_id, response.header().correlation_id) {
                            (Some(expected), Some(actual)) if expected != actual => {
                                debug!(
                                    expected,
                                    actual,
                                    response = %response.kind(),
                                    "discarding reply to an earlier command"
                                );
                                *stale = Some(actual);
                                next = decoder.poll()?;
                            }
                            _ => {
                                let trailing = decoder.buffered();
                                if trailing > 0 {
                                    warn!(bytes = trailing, "discarding bytes after response");
                                }
                                return Ok((payload, response));
                            }
                        }
                    }
                    if decoder.mode() == FrameMode::Raw {
                        tokio::time::sleep(self.decode_backoff).await;
                    }
                }
            }
        }
    }

    /// Read and discard until the device stays quiet for one drain window
    async fn drain_stale(&mut self, transport: &mut dyn Transport) -> ClientResult<()> {
        let limit = self.codec.max_size();
        let mut discarded = 0usize;

        while discarded <= limit {
            let read = tokio::time::timeout(self.drain_window, transport.read(self.read_chunk)).await;
            match read {
                Err(_) => break,
                Ok(result) => match result? {
                    ReadOutcome::Data(chunk) if chunk.is_empty() => break,
                    ReadOutcome::Data(chunk) => {
                        discarded = discarded.saturating_add(chunk.len());
                    }
                    ReadOutcome::Stall => {
                        transport.clear_halt(Direction::In).await?;
                        break;
                    }
                    ReadOutcome::Babble => break,
                },
            }
        }

        if discarded > 0 {
            warn!(bytes = discarded, "drained stale bytes from abandoned request");
        }
        self.needs_drain = false;
        Ok(())
    }
}

/// Accept only a Config response
pub fn expect_config(response: Response) -> ClientResult<ConfigResponse> {
    match response {
        Response::Config(body) => Ok(body),
        Response::Error(body) => Err(ClientError::device(body.message, body.error_code)),
        Response::Ack(_) => Err(ClientError::MalformedResponse(format!(
            "invalid response structure: expected Config for {}, got Ack",
            CommandKind::GetConfig
        ))),
    }
}

/// Accept only a successful Ack for `kind`
pub fn expect_ack(kind: CommandKind, response: Response) -> ClientResult<AckResponse> {
    match response {
        Response::Ack(body) if body.success => Ok(body),
        Response::Ack(body) => Err(ClientError::DomainFailure(if body.message.is_empty() {
            format!("{kind} failed")
        } else {
            body.message
        })),
        Response::Error(body) => Err(ClientError::device(body.message, body.error_code)),
        Response::Config(_) => Err(ClientError::MalformedResponse(format!(
            "invalid response structure: expected Ack for {kind}, got Config"
        ))),
    }
}
