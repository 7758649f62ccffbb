//! Mock buzzer panel implementation for testing and development.
//!
//! This module provides a simulated panel of buzzers that can be pressed,
//! released, and made to fail programmatically, without a field device.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use quizbuzz_core::InputBits;
use tokio::sync::watch;

use crate::{
    HardwareError, Result,
    traits::InputSource,
    types::DeviceInfo,
};

/// A failure the mock panel should report on an upcoming poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFault {
    /// The device does not answer in time.
    Timeout,
    /// The response fails its checksum.
    Garbled,
    /// The adapter is unplugged.
    Disconnected,
    /// The port cannot be used at all.
    Misconfigured,
}

impl MockFault {
    fn into_error(self, name: &str) -> HardwareError {
        match self {
            Self::Timeout => HardwareError::timeout(500),
            Self::Garbled => HardwareError::invalid_data("CRC mismatch"),
            Self::Disconnected => HardwareError::disconnected(name),
            Self::Misconfigured => HardwareError::configuration("mock panel misconfigured"),
        }
    }
}

/// Mock buzzer panel for testing and development.
///
/// The panel samples a shared input vector that a [`MockBuzzerHandle`]
/// controls. Each poll returns the vector as it is at that instant, so a
/// press that is released before the next poll is never seen, exactly like
/// the real level-sampled inputs.
///
/// # Examples
///
/// ```
/// use quizbuzz_hardware::mock::MockBuzzerPanel;
/// use quizbuzz_hardware::traits::InputSource;
///
/// #[tokio::main]
/// async fn main() -> quizbuzz_hardware::Result<()> {
///     let (mut panel, handle) = MockBuzzerPanel::new(4);
///
///     handle.press(2);
///     let bits = panel.poll().await?;
///     assert!(bits.is_set(2));
///
///     handle.release_all();
///     assert!(!panel.poll().await?.any());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockBuzzerPanel {
    /// Current input vector, written by the handle.
    state_rx: watch::Receiver<InputBits>,

    /// Faults to report on the next polls, oldest first.
    faults: Arc<Mutex<VecDeque<MockFault>>>,

    /// Number of polls served, successful or not.
    polls: Arc<AtomicUsize>,

    /// Simulated transport latency.
    latency: Option<Duration>,

    /// Device name
    name: String,
}

impl MockBuzzerPanel {
    /// Create a mock panel with `inputs` buzzers, all released.
    pub fn new(inputs: usize) -> (Self, MockBuzzerHandle) {
        Self::with_name("Mock Buzzer Panel".to_string(), inputs)
    }

    /// Create a mock panel with a custom name.
    pub fn with_name(name: String, inputs: usize) -> (Self, MockBuzzerHandle) {
        let (state_tx, state_rx) = watch::channel(InputBits::empty(inputs));
        let faults = Arc::new(Mutex::new(VecDeque::new()));
        let polls = Arc::new(AtomicUsize::new(0));

        let panel = Self {
            state_rx,
            faults: Arc::clone(&faults),
            polls: Arc::clone(&polls),
            latency: None,
            name: name.clone(),
        };

        let handle = MockBuzzerHandle {
            state_tx: Arc::new(state_tx),
            faults,
            polls,
            name,
        };

        (panel, handle)
    }

    /// Delay every poll by `latency`, as a slow serial link would.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn next_fault(&self) -> Option<MockFault> {
        self.faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
    }
}

impl InputSource for MockBuzzerPanel {
    async fn poll(&mut self) -> Result<InputBits> {
        self.polls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(fault) = self.next_fault() {
            return Err(fault.into_error(&self.name));
        }

        if self.state_rx.has_changed().is_err() {
            return Err(HardwareError::disconnected(&self.name));
        }

        Ok(*self.state_rx.borrow_and_update())
    }

    fn input_count(&self) -> usize {
        self.state_rx.borrow().width()
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(
            self.name.clone(),
            "Mock Buzzer Panel v1.0",
            self.input_count(),
        ))
    }
}

/// Handle for controlling a mock buzzer panel.
///
/// This handle can be cloned and shared across tasks. Dropping every clone
/// makes the panel report itself disconnected.
#[derive(Debug, Clone)]
pub struct MockBuzzerHandle {
    state_tx: Arc<watch::Sender<InputBits>>,
    faults: Arc<Mutex<VecDeque<MockFault>>>,
    polls: Arc<AtomicUsize>,
    name: String,
}

impl MockBuzzerHandle {
    /// Hold buzzer `index` down.
    pub fn press(&self, index: usize) {
        self.state_tx.send_modify(|bits| bits.set(index));
    }

    /// Release buzzer `index`.
    pub fn release(&self, index: usize) {
        self.state_tx.send_modify(|bits| bits.unset(index));
    }

    /// Release every buzzer.
    pub fn release_all(&self) {
        self.state_tx.send_modify(|bits| bits.clear());
    }

    /// Replace the whole input vector.
    pub fn set(&self, bits: InputBits) {
        self.state_tx.send_replace(bits);
    }

    /// Current input vector.
    pub fn current(&self) -> InputBits {
        *self.state_tx.borrow()
    }

    /// Make the next poll fail with `fault`. Faults queue up in order.
    pub fn inject_fault(&self, fault: MockFault) {
        self.faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(fault);
    }

    /// Number of polls the panel has served.
    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
