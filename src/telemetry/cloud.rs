//! Collector handshake.
//!
//! The device writes `CLOUD_CONNECT` once per power-on and waits, without
//! blocking, for a `CLOUD_OK` or `CLOUD_FAIL` token.  If neither arrives
//! before the deadline the link is marked not connected.  Tokens that
//! arrive later still update the status.  The status is informational:
//! telemetry is emitted regardless of it.

use log::{info, warn};

use super::decoder::TOKEN_CLOUD_CONNECT;
use crate::app::ports::SerialPort;
use crate::error::CommsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStatus {
    /// No handshake attempted since boot or since the last power-off.
    #[default]
    Unknown,
    /// Request written, waiting for a token.
    Pending,
    Connected,
    NotConnected,
}

impl LinkStatus {
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Pending => "pending",
            Self::Connected => "connected",
            Self::NotConnected => "not connected",
        }
    }
}

pub struct CloudLink {
    status: LinkStatus,
    timeout_ms: u64,
    deadline_ms: Option<u64>,
}

impl CloudLink {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            status: LinkStatus::Unknown,
            timeout_ms,
            deadline_ms: None,
        }
    }

    pub fn status(&self) -> LinkStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == LinkStatus::Pending
    }

    /// Write the handshake request and arm the deadline.  A write failure
    /// marks the link not connected straight away.
    pub fn begin(&mut self, now_ms: u64, serial: &mut impl SerialPort) -> Result<(), CommsError> {
        if let Err(e) = serial.write_line(TOKEN_CLOUD_CONNECT) {
            warn!("Cloud handshake request not sent: {}", e);
            self.status = LinkStatus::NotConnected;
            self.deadline_ms = None;
            return Err(e);
        }
        self.status = LinkStatus::Pending;
        self.deadline_ms = Some(now_ms.saturating_add(self.timeout_ms));
        info!("Cloud handshake requested (timeout {} ms)", self.timeout_ms);
        Ok(())
    }

    /// Record an inbound token.  Returns the new status when it changed.
    pub fn on_token(&mut self, ok: bool) -> Option<LinkStatus> {
        let next = if ok { LinkStatus::Connected } else { LinkStatus::NotConnected };
        self.deadline_ms = None;
        self.update(next)
    }

    /// Check the deadline.  Returns `Some(NotConnected)` on the tick it
    /// expires.
    pub fn poll(&mut self, now_ms: u64) -> Option<LinkStatus> {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                warn!("Cloud handshake timed out");
                self.update(LinkStatus::NotConnected)
            }
            _ => None,
        }
    }

    /// Drop any pending handshake; used on power-off.
    pub fn abort(&mut self) {
        self.deadline_ms = None;
        self.status = LinkStatus::Unknown;
    }

    fn update(&mut self, next: LinkStatus) -> Option<LinkStatus> {
        if self.status == next {
            return None;
        }
        self.status = next;
        Some(next)
    }
}
