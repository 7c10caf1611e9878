//! # Connection Manager
//!
//! Owns the single active transport session and moves job bytes reliably.
//!
//! ## State machine
//!
//! ```text
//! Disconnected ──connect──► Connecting ──ok──► Connected
//!      ▲                        │                  │
//!      └────────── fail (after one retry) ◄────────┘ disconnect / supersede
//! ```
//!
//! `Connecting` retries exactly once before surfacing
//! [`PrintError::ConnectionFailed`]. Connecting to address B while A is
//! active first attempts a best-effort close of A (failures ignored), so at
//! most one live session ever exists.
//!
//! ## Paced writes
//!
//! Cheap printers lose bytes when a whole receipt arrives in one write:
//! their input buffer is a few hundred bytes and RFCOMM delivers faster
//! than the head prints. Payloads are therefore split into fixed-size
//! chunks with a short pause between consecutive chunks. This pacing is a
//! correctness requirement, not tuning — uncapped writes are the primary
//! source of truncated receipts.

use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{PrintError, PrintResult};
use crate::transport::{Connector, PairedDevice, Transport};

/// Bytes per transport write.
pub const CHUNK_SIZE: usize = 256;

/// Pause between consecutive chunks.
pub const CHUNK_DELAY: Duration = Duration::from_millis(8);

/// Total connect attempts per `connect` call (initial + one retry).
const CONNECT_ATTEMPTS: u32 = 2;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

struct ActiveLink {
    address: String,
    transport: Box<dyn Transport>,
}

/// Exclusive owner of the active printer session. All transport mutation
/// goes through these methods; no other component writes to the channel.
pub struct ConnectionManager {
    connector: Box<dyn Connector>,
    active: Option<ActiveLink>,
    state: LinkState,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl ConnectionManager {
    pub fn new(connector: Box<dyn Connector>) -> Self {
        Self {
            connector,
            active: None,
            state: LinkState::Disconnected,
            chunk_size: CHUNK_SIZE,
            chunk_delay: CHUNK_DELAY,
        }
    }

    /// Override the write chunk size (bytes).
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    /// Override the inter-chunk pause.
    pub fn set_chunk_delay(&mut self, delay: Duration) {
        self.chunk_delay = delay;
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Address of the live session, if any.
    pub fn active_address(&self) -> Option<&str> {
        self.active.as_ref().map(|l| l.address.as_str())
    }

    /// Bonded peripherals, via the connector.
    pub fn paired_devices(&self) -> PrintResult<Vec<PairedDevice>> {
        self.connector.paired_devices()
    }

    /// Ensure a live session to `address`.
    ///
    /// No-op when already connected to that exact address. Any session to a
    /// different address is closed best-effort first. The underlying open
    /// is retried exactly once before the failure surfaces.
    pub fn connect(&mut self, address: &str) -> PrintResult<()> {
        if self
            .active
            .as_ref()
            .is_some_and(|link| link.address == address)
        {
            debug!(address, "already connected");
            return Ok(());
        }

        if let Some(mut old) = self.active.take() {
            info!(old = %old.address, new = address, "superseding active connection");
            if let Err(e) = old.transport.close() {
                debug!(error = %e, "ignoring close failure on superseded link");
            }
        }

        self.state = LinkState::Connecting;
        let mut last_err = None;
        for attempt in 1..=CONNECT_ATTEMPTS {
            match self.connector.open(address) {
                Ok(transport) => {
                    self.active = Some(ActiveLink {
                        address: address.to_string(),
                        transport,
                    });
                    self.state = LinkState::Connected;
                    info!(address, attempt, "connected");
                    return Ok(());
                }
                Err(e) => {
                    warn!(address, attempt, error = %e, "connect attempt failed");
                    // Only transient failures are worth the retry
                    if !e.is_retryable() {
                        self.state = LinkState::Disconnected;
                        return Err(e);
                    }
                    last_err = Some(e);
                }
            }
        }

        self.state = LinkState::Disconnected;
        Err(PrintError::ConnectionFailed(format!(
            "{address}: {}",
            last_err.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    /// Write one complete job to the live session, chunked and paced.
    ///
    /// Fails fast when no session is live. A chunk failure surfaces as a
    /// full print failure; there is no partial-success state.
    pub fn write(&mut self, data: &[u8]) -> PrintResult<()> {
        let chunk_size = self.chunk_size.max(1);
        let chunk_delay = self.chunk_delay;
        let Some(link) = self.active.as_mut() else {
            return Err(PrintError::ConnectionFailed(
                "no active connection".into(),
            ));
        };

        debug!(
            address = %link.address,
            bytes = data.len(),
            chunks = data.len().div_ceil(chunk_size),
            "writing job"
        );

        for (i, chunk) in data.chunks(chunk_size).enumerate() {
            if i > 0 && !chunk_delay.is_zero() {
                thread::sleep(chunk_delay);
            }
            link.transport.write_chunk(chunk).map_err(|e| {
                PrintError::WriteFailed(format!("chunk {} failed: {e}", i + 1))
            })?;
        }
        link.transport
            .flush()
            .map_err(|e| PrintError::WriteFailed(format!("flush failed: {e}")))?;
        Ok(())
    }

    /// Tear down the active session. Idempotent: the manager is left
    /// disconnected no matter what the transport reports.
    pub fn disconnect(&mut self) {
        if let Some(mut link) = self.active.take() {
            info!(address = %link.address, "disconnecting");
            if let Err(e) = link.transport.close() {
                debug!(error = %e, "ignoring close failure");
            }
        }
        self.state = LinkState::Disconnected;
    }
}

// ============================================================================
// TESTS
// ============================================================================
