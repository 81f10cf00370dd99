//! Platform-agnostic input-report translation pipeline for gamepad emulation.
//!
//! Each polling tick, the pipeline takes a normalized [`GamepadSnapshot`] and
//! a monotonic clock reading and produces the wire-exact input report of the
//! emulated protocol. All per-tick transformations live here:
//!
//! - [`axis`]: radial deadzone, gamma response curve, and boundary snapping
//! - [`remap`]: physical-to-virtual button translation table
//! - [`macros`]: timed holds, turbo, double-tap, and anti-recoil with their
//!   per-session timer state
//! - [`pipeline`]: the [`ReportPipeline`] tying the stages together, with
//!   per-protocol configuration presets
//! - [`session`]: a generic source-to-sink runner ([`PadSession`])
//! - [`input`]/[`output`]: the [`SnapshotSource`] and [`ReportSink`] seams to
//!   the input subsystem and the USB transport
//!
//! All timing is computed by comparing a caller-supplied millisecond clock
//! against stored start times with wraparound-safe arithmetic ([`time`]);
//! nothing in this crate sleeps or blocks.
//!
//! # Sessions
//!
//! The pipeline holds no global state. Every timer and edge detector lives in
//! the [`ReportPipeline`] value owned by the caller, so multiple controller
//! sessions can run side by side and tests can drive a pipeline tick by tick.
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod axis;
pub mod input;
pub mod macros;
pub mod output;
pub mod pipeline;
pub mod remap;
pub mod session;
pub mod time;

// Re-export main types at crate root
pub use axis::{shape_stick, AxisCurveConfig, ShapedStick};
pub use input::{SnapshotSource, SourceError};
pub use macros::{
    AntiRecoilConfig, DoubleTapConfig, MacroBank, MacroOverrides, MacroSet, TimedHoldConfig,
    TurboConfig,
};
pub use output::{ReportSink, TransportError};
pub use pipeline::{PipelineConfig, ReportPipeline};
pub use remap::RemapTable;
pub use session::{PadSession, SessionError};
pub use time::Millis;

// Re-export the wire-level types alongside the pipeline
pub use pad_proto::{
    AnalogStick, AssembledReport, Buttons, Dpad, GamepadSnapshot, ProtocolVariant, RumbleCommand,
};
