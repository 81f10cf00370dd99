//! Snapshot source trait and error types.

use core::future::Future;
use pad_proto::GamepadSnapshot;

/// Error type for snapshot sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceError {
    /// Communication I/O error.
    Io,
    /// Input subsystem lost / timeout.
    Disconnected,
    /// Malformed data from the input subsystem.
    Invalid,
}

impl core::fmt::Display for SourceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "input i/o error"),
            Self::Disconnected => write!(f, "input disconnected"),
            Self::Invalid => write!(f, "invalid input data"),
        }
    }
}

/// Async trait for gamepad snapshot sources.
///
/// Abstracts the producer of normalized snapshots, so the session can be fed
/// by a hardware input reader, a latest-value signal, or a test fixture.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait SnapshotSource {
    /// Wait for the next polling tick and return the snapshot to process.
    ///
    /// Implementations own the tick cadence: a firmware source typically
    /// resolves once per host polling interval with the latest published
    /// snapshot.
    fn next(&mut self) -> impl Future<Output = Result<GamepadSnapshot, SourceError>>;

    /// Check if the input subsystem is connected/ready.
    fn is_connected(&self) -> bool;
}
