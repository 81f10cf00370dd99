//! Timed macros and assistive corrections.
//!
//! Each macro is a small state machine fed once per tick with the current
//! button set and a monotonic millisecond reading. Machines move through
//! idle, armed, active, and cooldown phases; while active (or cooling down)
//! they emit override directives that the pipeline merges into the translated
//! output. All state lives in a [`MacroBank`] owned by the session, and every
//! deadline is evaluated with wraparound-safe arithmetic.
//!
//! # Merge semantics and precedence
//!
//! Presses from all macros OR-merge with each other and with the translated
//! buttons. The only subtractive effect is the turbo low phase, and it may
//! not clear a bit that a timed-hold or double-tap macro is pressing: those
//! outrank turbo. Evaluation order is fixed (timed holds in slot order, then
//! double-tap, then turbo, then anti-recoil); when two timed holds force the
//! same trigger byte, the later slot wins.
//!
//! # Self-healing
//!
//! No machine can get stuck: timed holds expire on their deadline whether or
//! not the trigger is still down, turbo drops to idle the tick its trigger is
//! released, and a double-tap window that lapses resets to idle.

use crate::time::{self, Millis};
use pad_proto::{Buttons, GamepadSnapshot};

/// Maximum number of timed-hold macros in a [`MacroSet`].
pub const MAX_TIMED_HOLDS: usize = 4;

/// A press held for a fixed duration after a trigger edge.
///
/// The press starts on the rising edge of the trigger and ends exactly
/// `duration_ms` later, independent of when the trigger is released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimedHoldConfig {
    /// Button(s) whose rising edge starts the hold.
    pub trigger: Buttons,
    /// Button(s) pressed while the hold runs.
    pub press: Buttons,
    /// How long the hold runs, in milliseconds.
    pub duration_ms: u32,
    /// Force the left trigger byte to this value while the hold runs.
    pub left_trigger: Option<u8>,
    /// Force the right trigger byte to this value while the hold runs.
    pub right_trigger: Option<u8>,
}

impl TimedHoldConfig {
    /// A plain button hold with no trigger byte forcing.
    #[must_use]
    pub const fn new(trigger: Buttons, press: Buttons, duration_ms: u32) -> Self {
        Self {
            trigger,
            press,
            duration_ms,
            left_trigger: None,
            right_trigger: None,
        }
    }
}

/// Auto-fire: a held trigger becomes a square wave on the target button.
///
/// The wave is keyed to the wall clock, not the tick count, so the duty
/// cycle is independent of the polling rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TurboConfig {
    /// Button(s) that must be held for the wave to run.
    pub trigger: Buttons,
    /// Button driven by the wave.
    pub target: Buttons,
    /// Half period of the wave in milliseconds (time per pressed or
    /// released phase). 50 ms gives a 10 Hz press rate.
    pub half_period_ms: u32,
}

/// Two taps within a window latch a press until release plus a grace period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DoubleTapConfig {
    /// Button whose double tap activates the macro.
    pub trigger: Buttons,
    /// Button(s) pressed while active.
    pub press: Buttons,
    /// Maximum gap between the two rising edges, in milliseconds.
    pub window_ms: u32,
    /// Grace period the press persists after the trigger is released.
    pub cooldown_ms: u32,
}

/// Bias the right stick downward while the fire condition holds.
///
/// Deliberately falsifies the stick output to counteract an application's
/// recoil simulation. Ships disabled, and never touches the axis mapper:
/// the bias is applied to the already-shaped vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AntiRecoilConfig {
    /// Trigger bytes at or above this value count as firing.
    pub threshold: u8,
    /// Require both triggers past the threshold rather than just the right.
    pub both_triggers: bool,
    /// Downward bias in raw stick units (out of 32767).
    pub vertical_force: i16,
}

/// The macro configuration of one pipeline, plain data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacroSet {
    pub timed_holds: [Option<TimedHoldConfig>; MAX_TIMED_HOLDS],
    pub turbo: Option<TurboConfig>,
    pub double_tap: Option<DoubleTapConfig>,
    pub anti_recoil: Option<AntiRecoilConfig>,
}

impl MacroSet {
    /// No macros enabled.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            timed_holds: [None; MAX_TIMED_HOLDS],
            turbo: None,
            double_tap: None,
            anti_recoil: None,
        }
    }
}

impl Default for MacroSet {
    fn default() -> Self {
        Self::none()
    }
}

/// Override directives produced by one tick of the macro engine.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacroOverrides {
    /// Buttons forced active, OR-merged into the translated output.
    pub press: Buttons,
    /// Buttons forced released after the merge (turbo low phase only).
    pub suppress: Buttons,
    /// Forced left trigger byte, replacing the computed value.
    pub left_trigger: Option<u8>,
    /// Forced right trigger byte, replacing the computed value.
    pub right_trigger: Option<u8>,
    /// Downward bias applied to the shaped right stick Y, raw stick units.
    pub right_stick_down_bias: i16,
}

impl MacroOverrides {
    /// No overrides this tick.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            press: Buttons::NONE,
            suppress: Buttons::NONE,
            left_trigger: None,
            right_trigger: None,
            right_stick_down_bias: 0,
        }
    }
}

#[derive(Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct TimedHoldState {
    prev_pressed: bool,
    active: bool,
    started: Millis,
}

#[derive(Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct TurboState {
    active: bool,
    phase_origin: Millis,
}

#[derive(Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum TapPhase {
    #[default]
    Idle,
    /// First tap registered; waiting for the second edge inside the window.
    Armed { first_tap: Millis },
    Active,
    /// Trigger released; the press persists until the grace period lapses.
    Cooldown { released: Millis },
}

#[derive(Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct DoubleTapState {
    prev_pressed: bool,
    phase: TapPhase,
}

/// Per-session macro state, owned by the pipeline and mutated each tick.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacroBank {
    holds: [TimedHoldState; MAX_TIMED_HOLDS],
    turbo: TurboState,
    tap: DoubleTapState,
}

impl Default for MacroBank {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroBank {
    /// Fresh state with every machine idle.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            holds: [TimedHoldState {
                prev_pressed: false,
                active: false,
                started: 0,
            }; MAX_TIMED_HOLDS],
            turbo: TurboState {
                active: false,
                phase_origin: 0,
            },
            tap: DoubleTapState {
                prev_pressed: false,
                phase: TapPhase::Idle,
            },
        }
    }

    /// Advance every macro one tick and collect the override directives.
    ///
    /// `pressed` is the physical button set including the derived trigger
    /// bits; `snapshot` supplies the analog trigger values the anti-recoil
    /// condition reads.
    pub fn update(
        &mut self,
        set: &MacroSet,
        pressed: Buttons,
        snapshot: &GamepadSnapshot,
        now: Millis,
    ) -> MacroOverrides {
        let mut overrides = MacroOverrides::none();

        // Timed holds, slot order; a later slot wins trigger byte conflicts.
        for (slot, state) in self.holds.iter_mut().enumerate() {
            let Some(cfg) = &set.timed_holds[slot] else {
                state.prev_pressed = false;
                state.active = false;
                continue;
            };

            let held = pressed.contains(cfg.trigger);
            if held && !state.prev_pressed {
                state.active = true;
                state.started = now;
            }
            state.prev_pressed = held;

            if state.active && time::reached(now, state.started, cfg.duration_ms) {
                state.active = false;
            }

            if state.active {
                overrides.press |= cfg.press;
                if cfg.left_trigger.is_some() {
                    overrides.left_trigger = cfg.left_trigger;
                }
                if cfg.right_trigger.is_some() {
                    overrides.right_trigger = cfg.right_trigger;
                }
            }
        }

        // Double tap
        if let Some(cfg) = &set.double_tap {
            let held = pressed.contains(cfg.trigger);
            let edge = held && !self.tap.prev_pressed;
            self.tap.prev_pressed = held;

            self.tap.phase = match self.tap.phase {
                TapPhase::Idle => {
                    if edge {
                        TapPhase::Armed { first_tap: now }
                    } else {
                        TapPhase::Idle
                    }
                }
                TapPhase::Armed { first_tap } => {
                    if edge && !time::reached(now, first_tap, cfg.window_ms) {
                        TapPhase::Active
                    } else if edge {
                        // Window lapsed; this edge is a fresh first tap
                        TapPhase::Armed { first_tap: now }
                    } else if time::reached(now, first_tap, cfg.window_ms) {
                        TapPhase::Idle
                    } else {
                        TapPhase::Armed { first_tap }
                    }
                }
                TapPhase::Active => {
                    if held {
                        TapPhase::Active
                    } else {
                        TapPhase::Cooldown { released: now }
                    }
                }
                TapPhase::Cooldown { released } => {
                    if edge {
                        TapPhase::Active
                    } else if time::reached(now, released, cfg.cooldown_ms) {
                        TapPhase::Idle
                    } else {
                        TapPhase::Cooldown { released }
                    }
                }
            };

            if matches!(self.tap.phase, TapPhase::Active | TapPhase::Cooldown { .. }) {
                overrides.press |= cfg.press;
            }
        } else {
            self.tap = DoubleTapState::default();
        }

        // Turbo
        if let Some(cfg) = &set.turbo {
            let held = pressed.contains(cfg.trigger);
            if held && !self.turbo.active {
                self.turbo.active = true;
                self.turbo.phase_origin = now;
            } else if !held {
                self.turbo.active = false;
            }

            if self.turbo.active {
                let half_period = if cfg.half_period_ms == 0 {
                    1
                } else {
                    cfg.half_period_ms
                };
                let high = (time::elapsed(now, self.turbo.phase_origin) / half_period) % 2 == 0;
                if high {
                    overrides.press |= cfg.target;
                } else {
                    // Hold-type macros outrank the turbo low phase
                    overrides.suppress |= cfg.target & !overrides.press;
                }
            }
        } else {
            self.turbo = TurboState::default();
        }

        // Anti-recoil
        if let Some(cfg) = &set.anti_recoil {
            let right_firing = snapshot.right_trigger >= cfg.threshold;
            let left_firing = snapshot.left_trigger >= cfg.threshold;
            if right_firing && (!cfg.both_triggers || left_firing) {
                overrides.right_stick_down_bias = cfg.vertical_force;
            }
        }

        overrides
    }
}
