//! The per-session translation pipeline and its configuration presets.
//!
//! [`ReportPipeline`] is the one parameterized implementation of the tick
//! path: macro update, button translation, trigger handling, axis shaping,
//! and report assembly, in that order. Protocol differences and macro
//! loadouts are configuration data ([`PipelineConfig`]), not separate code
//! paths.
//!
//! Tick order:
//!
//! 1. Derive the digital trigger bits from the analog triggers.
//! 2. Advance the macro engine and collect overrides.
//! 3. Translate physical buttons through the remap table.
//! 4. Merge macro presses and suppressions.
//! 5. Compute trigger bytes (digitalization, remap forcing, macro forcing).
//! 6. Shape both sticks and apply the anti-recoil bias.
//! 7. Pack the protocol report.

use crate::axis::{shape_stick, AxisCurveConfig};
use crate::macros::{AntiRecoilConfig, MacroBank, MacroSet, TimedHoldConfig, TurboConfig};
use crate::remap::RemapTable;
use crate::time::Millis;
use pad_proto::{
    convert, minimal::MinimalReport, ps4, ps4::Ps4Report, report, xinput, xinput::XInputReport,
    AssembledReport, Buttons, GamepadSnapshot, ProtocolVariant, RumbleCommand,
};

/// Configuration of one pipeline session, constant after construction.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PipelineConfig {
    /// Which protocol's reports to assemble.
    pub protocol: ProtocolVariant,
    pub left_stick: AxisCurveConfig,
    pub right_stick: AxisCurveConfig,
    pub remap: RemapTable,
    pub macros: MacroSet,
    /// Analog trigger values above this set the derived LT/RT bits.
    pub trigger_threshold: u8,
    /// Report trigger bytes as 0x00/0xFF instead of passing analog through.
    pub digital_triggers: bool,
}

impl PipelineConfig {
    /// A plain pipeline for the given protocol: linear sticks, identity
    /// remap, no macros, analog triggers.
    #[must_use]
    pub const fn new(protocol: ProtocolVariant) -> Self {
        Self {
            protocol,
            left_stick: AxisCurveConfig::LINEAR,
            right_stick: AxisCurveConfig::LINEAR,
            remap: RemapTable::identity(),
            macros: MacroSet::none(),
            trigger_threshold: 13,
            digital_triggers: false,
        }
    }

    /// Tuned DualShock-4-style session matching the shipped controller
    /// build: curved sticks, the shoulder/trigger remap, the mute and home
    /// timed holds.
    #[must_use]
    pub const fn ps4() -> Self {
        let mut config = Self::new(ProtocolVariant::Ps4);
        config.left_stick = AxisCurveConfig::new(0.03, 1.8);
        config.right_stick = AxisCurveConfig::new(0.02, 1.3);
        config.digital_triggers = true;

        // Shoulder/trigger rotation: RB fires the right trigger, the right
        // trigger fires the left one, the left trigger fires RB. Back
        // doubles as the touchpad click.
        config.remap = RemapTable::identity()
            .with(Buttons::RB, Buttons::RT)
            .with(Buttons::RT, Buttons::LT)
            .with(Buttons::LT, Buttons::RB)
            .with(Buttons::BACK, Buttons(Buttons::BACK.0 | Buttons::TOUCHPAD.0));

        // Mute chord: Misc presses West+East for 483 ms
        config.macros.timed_holds[0] = Some(TimedHoldConfig::new(
            Buttons::MISC,
            Buttons(Buttons::X.0 | Buttons::B.0),
            483,
        ));
        // Home chord: Guide presses North+R1+L2 and holds the left trigger
        // full for 350 ms
        config.macros.timed_holds[1] = Some(TimedHoldConfig {
            trigger: Buttons::GUIDE,
            press: Buttons(Buttons::Y.0 | Buttons::RB.0 | Buttons::LT.0),
            duration_ms: 350,
            left_trigger: Some(0xFF),
            right_trigger: None,
        });

        config
    }

    /// Tuned Xbox-style session matching the shipped controller build: raw
    /// sticks, digital triggers, turbo on LB, anti-recoil while firing.
    #[must_use]
    pub const fn xinput() -> Self {
        let mut config = Self::new(ProtocolVariant::XInput);
        config.digital_triggers = true;

        config.macros.turbo = Some(TurboConfig {
            trigger: Buttons::LB,
            target: Buttons::A,
            half_period_ms: 50,
        });
        config.macros.anti_recoil = Some(AntiRecoilConfig {
            threshold: 200,
            both_triggers: true,
            vertical_force: 4500,
        });

        config
    }

    /// Plain cross-platform HID gamepad session: linear sticks, analog
    /// triggers, no macros.
    #[must_use]
    pub const fn minimal() -> Self {
        Self::new(ProtocolVariant::Minimal)
    }
}

/// The per-session translation pipeline.
///
/// Owns all per-tick state (macro timers, edge detectors, the frame
/// counter), so one value equals one controller-to-host session and multiple
/// sessions never share state.
#[derive(Clone, Copy, Debug)]
pub struct ReportPipeline {
    config: PipelineConfig,
    macros: MacroBank,
    /// 6-bit frame counter for protocols that carry one.
    frame_counter: u8,
}

impl ReportPipeline {
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            macros: MacroBank::new(),
            frame_counter: 0,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one polling tick: translate the snapshot into a packed report.
    ///
    /// `now` is a monotonic millisecond reading taken once for the tick.
    pub fn process_tick(&mut self, snapshot: &GamepadSnapshot, now: Millis) -> AssembledReport {
        let cfg = &self.config;

        // Physical buttons plus derived digital trigger bits
        let mut physical = snapshot.buttons;
        if snapshot.left_trigger > cfg.trigger_threshold {
            physical |= Buttons::LT;
        }
        if snapshot.right_trigger > cfg.trigger_threshold {
            physical |= Buttons::RT;
        }

        let overrides = self.macros.update(&cfg.macros, physical, snapshot, now);

        let translated = cfg.remap.apply(physical);
        let buttons = (translated | overrides.press) & !overrides.suppress;

        // Trigger bytes: digitalization or passthrough, then remap forcing,
        // then macro forcing, in increasing precedence. A passthrough
        // trigger keeps its analog value when only its own derived bit is
        // set; a remapped-in or macro-pressed bit forces full scale.
        let mut left_trigger = if cfg.digital_triggers {
            0
        } else {
            snapshot.left_trigger
        };
        let mut right_trigger = if cfg.digital_triggers {
            0
        } else {
            snapshot.right_trigger
        };
        if buttons.contains(Buttons::LT) && (cfg.digital_triggers || !physical.contains(Buttons::LT))
        {
            left_trigger = 0xFF;
        }
        if buttons.contains(Buttons::RT)
            && (cfg.digital_triggers || !physical.contains(Buttons::RT))
        {
            right_trigger = 0xFF;
        }
        if let Some(forced) = overrides.left_trigger {
            left_trigger = forced;
        }
        if let Some(forced) = overrides.right_trigger {
            right_trigger = forced;
        }

        // Sticks, with the anti-recoil bias folded into the shaped right Y
        let left = shape_stick(snapshot.left_stick.x, snapshot.left_stick.y, &cfg.left_stick);
        let mut right = shape_stick(
            snapshot.right_stick.x,
            snapshot.right_stick.y,
            &cfg.right_stick,
        );
        if overrides.right_stick_down_bias != 0 {
            let bias = overrides.right_stick_down_bias as f32 / 32767.0;
            right.y = (right.y + bias).clamp(-1.0, 1.0);
        }

        match cfg.protocol {
            ProtocolVariant::Ps4 => {
                let packed = Ps4Report {
                    left_stick_x: convert::stick_byte(left.x),
                    left_stick_y: convert::stick_byte(left.y),
                    right_stick_x: convert::stick_byte(right.x),
                    right_stick_y: convert::stick_byte(right.y),
                    hat: convert::hat_nibble(snapshot.dpad),
                    buttons: ps4::buttons_from_pad(buttons),
                    ps: buttons.contains(Buttons::GUIDE),
                    touchpad: buttons.contains(Buttons::TOUCHPAD),
                    counter: self.frame_counter,
                    left_trigger,
                    right_trigger,
                }
                .pack();
                self.frame_counter = (self.frame_counter + 1) & 0x3F;
                AssembledReport::Ps4(packed)
            }
            ProtocolVariant::XInput => {
                let (left_stick_x, left_stick_y) = xinput::stick_from_norm(left.x, left.y);
                let (right_stick_x, right_stick_y) = xinput::stick_from_norm(right.x, right.y);
                let packed = XInputReport {
                    buttons0: xinput::dpad_bits(snapshot.dpad) | xinput::buttons0_from_pad(buttons),
                    buttons1: xinput::buttons1_from_pad(buttons),
                    left_trigger,
                    right_trigger,
                    left_stick_x,
                    left_stick_y,
                    right_stick_x,
                    right_stick_y,
                }
                .pack();
                AssembledReport::XInput(packed)
            }
            ProtocolVariant::Minimal => {
                let packed = MinimalReport {
                    buttons,
                    hat: convert::hat_nibble(snapshot.dpad),
                    left_stick_x: convert::stick_byte(left.x),
                    left_stick_y: convert::stick_byte(left.y),
                    right_stick_x: convert::stick_byte(right.x),
                    right_stick_y: convert::stick_byte(right.y),
                    left_trigger,
                    right_trigger,
                }
                .pack();
                AssembledReport::Minimal(packed)
            }
        }
    }

    /// Parse a host-originated output report for this session's protocol.
    ///
    /// Malformed reports yield `None` and are otherwise ignored.
    #[must_use]
    pub fn parse_output_report(&self, buf: &[u8]) -> Option<RumbleCommand> {
        report::parse_output_report(self.config.protocol, buf)
    }
}
