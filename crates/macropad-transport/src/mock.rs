//! Scripted in-memory transport for tests
//!
//! A [`MockTransport`] shares its state through `Arc`s, so a test can keep
//! one handle for scripting and inspection while the engine owns a boxed
//! clone.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{TransportError, TransportResult};
use crate::target::{PRODUCT_ID, UsbTarget, VENDOR_ID};
use crate::{DeviceInfo, Direction, ReadOutcome, Transport, TransportPort};

/// Closure producing read chunks in reply to each write
pub type Responder = Box<dyn FnMut(&[u8]) -> Vec<ReadStep> + Send>;

/// One scripted read result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadStep {
    /// Return these bytes
    Data(Vec<u8>),
    /// Report a stalled endpoint
    Stall,
    /// Report babble
    Babble,
    /// Fail with this error
    Fail(TransportError),
}

impl ReadStep {
    /// Split `bytes` into data steps of at most `chunk` bytes
    pub fn chunked(bytes: &[u8], chunk: usize) -> Vec<ReadStep> {
        bytes
            .chunks(chunk.max(1))
            .map(|piece| ReadStep::Data(piece.to_vec()))
            .collect()
    }
}

#[derive(Default)]
struct MockState {
    reads: VecDeque<ReadStep>,
    writes: Vec<Vec<u8>>,
    halts_cleared: Vec<Direction>,
    read_calls: usize,
    connected: bool,
    closed: bool,
    responder: Option<Responder>,
}

/// In-memory [`Transport`] with scripted reads and recorded writes
#[derive(Clone)]
pub struct MockTransport {
    info: DeviceInfo,
    state: Arc<Mutex<MockState>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl MockTransport {
    /// Create a connected mock reporting the MacroPad ids
    pub fn new() -> Self {
        Self::with_info(DeviceInfo {
            vendor_id: VENDOR_ID,
            product_id: PRODUCT_ID,
            product_name: Some("MacroPad".to_string()),
            serial_number: Some("MOCK-0001".to_string()),
        })
    }

    /// Create a connected mock reporting `info`
    pub fn with_info(info: DeviceInfo) -> Self {
        Self {
            info,
            state: Arc::new(Mutex::new(MockState {
                connected: true,
                ..MockState::default()
            })),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    /// Queue one chunk for a future read
    pub fn queue_read(&self, data: Vec<u8>) {
        self.with_state(|s| s.reads.push_back(ReadStep::Data(data)));
    }

    /// Queue `bytes` split into chunks of `chunk` bytes
    pub fn queue_chunked(&self, bytes: &[u8], chunk: usize) {
        self.with_state(|s| s.reads.extend(ReadStep::chunked(bytes, chunk)));
    }

    /// Queue an arbitrary read step
    pub fn queue_step(&self, step: ReadStep) {
        self.with_state(|s| s.reads.push_back(step));
    }

    /// Queue a stalled read
    pub fn queue_stall(&self) {
        self.queue_step(ReadStep::Stall);
    }

    /// Queue a babble read
    pub fn queue_babble(&self) {
        self.queue_step(ReadStep::Babble);
    }

    /// Reply to every write with the steps `responder` returns
    pub fn set_responder(&self, responder: impl FnMut(&[u8]) -> Vec<ReadStep> + Send + 'static) {
        self.with_state(|s| s.responder = Some(Box::new(responder)));
    }

    /// Every buffer written so far
    pub fn write_history(&self) -> Vec<Vec<u8>> {
        self.with_state(|s| s.writes.clone())
    }

    /// Directions on which a halt was cleared
    pub fn halts_cleared(&self) -> Vec<Direction> {
        self.with_state(|s| s.halts_cleared.clone())
    }

    /// Number of read calls made
    pub fn read_calls(&self) -> usize {
        self.with_state(|s| s.read_calls)
    }

    /// Steps still queued
    pub fn pending_reads(&self) -> usize {
        self.with_state(|s| s.reads.len())
    }

    /// Simulate unplugging the device
    pub fn disconnect(&self) {
        self.with_state(|s| s.connected = false);
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.with_state(|s| s.closed)
    }

    fn check_usable(state: &MockState) -> TransportResult<()> {
        if state.closed {
            return Err(TransportError::Closed);
        }
        if !state.connected {
            return Err(TransportError::Disconnected);
        }
        Ok(())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn write(&mut self, data: &[u8]) -> TransportResult<usize> {
        self.with_state(|s| {
            Self::check_usable(s)?;
            s.writes.push(data.to_vec());
            if let Some(responder) = s.responder.as_mut() {
                let steps = responder(data);
                s.reads.extend(steps);
            }
            Ok(data.len())
        })
    }

    async fn read(&mut self, max_len: usize) -> TransportResult<ReadOutcome> {
        self.with_state(|s| {
            Self::check_usable(s)?;
            s.read_calls = s.read_calls.saturating_add(1);
            match s.reads.pop_front() {
                None => Ok(ReadOutcome::Data(Vec::new())),
                Some(ReadStep::Data(mut data)) => {
                    if data.len() > max_len {
                        let rest = data.split_off(max_len);
                        s.reads.push_front(ReadStep::Data(rest));
                    }
                    Ok(ReadOutcome::Data(data))
                }
                Some(ReadStep::Stall) => Ok(ReadOutcome::Stall),
                Some(ReadStep::Babble) => Ok(ReadOutcome::Babble),
                Some(ReadStep::Fail(error)) => Err(error),
            }
        })
    }

    async fn clear_halt(&mut self, direction: Direction) -> TransportResult<()> {
        self.with_state(|s| {
            Self::check_usable(s)?;
            s.halts_cleared.push(direction);
            Ok(())
        })
    }

    async fn close(&mut self) -> TransportResult<()> {
        self.with_state(|s| s.closed = true);
        Ok(())
    }

    fn device_info(&self) -> &DeviceInfo {
        &self.info
    }
}

/// [`TransportPort`] handing out clones of registered mocks
#[derive(Debug, Default)]
pub struct MockPort {
    devices: Vec<MockTransport>,
    opens: Arc<Mutex<usize>>,
}

impl MockPort {
    /// Create a port with no devices
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a port with a single device
    pub fn with_device(device: MockTransport) -> Self {
        let mut port = Self::new();
        port.add_device(device);
        port
    }

    /// Register a device
    pub fn add_device(&mut self, device: MockTransport) {
        self.devices.push(device);
    }

    /// Number of successful opens
    pub fn open_count(&self) -> usize {
        *self.opens.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl TransportPort for MockPort {
    async fn open(&self, target: &UsbTarget) -> TransportResult<Box<dyn Transport>> {
        let device = self
            .devices
            .iter()
            .find(|d| target.matches(d.info.vendor_id, d.info.product_id))
            .ok_or_else(|| TransportError::not_found(target.vendor_id, target.product_id))?;

        let transport = device.clone();
        transport.with_state(|s| {
            s.closed = false;
        });
        let mut opens = self.opens.lock().unwrap_or_else(|e| e.into_inner());
        *opens = opens.saturating_add(1);
        Ok(Box::new(transport))
    }
}
