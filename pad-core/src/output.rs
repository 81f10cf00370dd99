//! Report sink trait and error types.

use core::future::Future;
use pad_proto::AssembledReport;

/// Error type for report transport operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// USB/communication I/O error.
    Io,
    /// Device not ready (e.g., USB not enumerated).
    NotReady,
    /// Report dropped (host not accepting reports this tick).
    Dropped,
    /// Endpoint busy.
    Busy,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "transport i/o error"),
            Self::NotReady => write!(f, "transport not ready"),
            Self::Dropped => write!(f, "report dropped"),
            Self::Busy => write!(f, "endpoint busy"),
        }
    }
}

/// Async trait for report transports.
///
/// This is the boundary to the USB stack: one packed report goes out per
/// poll opportunity, and a tick whose transport is not ready simply drops
/// its report. There is no retry queue anywhere behind this trait; stale
/// state is recomputed next tick, never resent.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait ReportSink {
    /// Deliver a packed report to the host.
    ///
    /// May wait for the current poll opportunity.
    fn send(&mut self, report: &AssembledReport) -> impl Future<Output = Result<(), TransportError>>;

    /// Check if the transport is ready to accept a report.
    fn is_ready(&self) -> bool;
}
