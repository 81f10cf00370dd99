//! Radial stick shaping: deadzone, gamma response curve, boundary snapping.
//!
//! Shaping happens in a normalized `f32` domain. Raw signed stick components
//! come in, a shaped vector in [-1.0, 1.0] comes out; the protocol modules in
//! `pad_proto` turn that into wire bytes or words. The function is pure: the
//! same input and config always produce the same output, with no state and no
//! time dependence.
//!
//! Two snapping rules guard the boundaries:
//!
//! - **Axis snap**: a nearly-pure cardinal deflection (one axis at rest, the
//!   other near full) collapses to an exact `(0.0, ±1.0)` so host deadzone
//!   logic sees a clean cardinal instead of a slight diagonal.
//! - **Edge snap**: a vector close to the rim is normalized to unit length,
//!   letting the protocol conversion force exact extreme values.

use libm::{fabsf, powf, sqrtf};

/// Full scale of the raw signed stick domain.
const STICK_RANGE: f32 = 32767.0;

/// Magnitudes below this count as a resting stick regardless of deadzone.
const REST_EPSILON: f32 = 0.001;

/// Per-stick shaping parameters, constant for a session.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisCurveConfig {
    /// Deadzone as a fraction of full deflection, [0, 1).
    pub deadzone: f32,
    /// Response curve exponent (> 0). Above 1 flattens small inputs for
    /// precision; below 1 boosts them.
    pub gamma: f32,
    /// Output multiplier applied after the curve, clamped to full scale.
    pub sensitivity: f32,
    /// Axis snap: the minor axis must be at or below this fraction.
    pub snap_minor: f32,
    /// Axis snap: the major axis must be at or above this fraction.
    pub snap_major: f32,
    /// Edge snap: magnitudes at or above this are pushed to the rim.
    pub snap_edge: f32,
}

impl AxisCurveConfig {
    /// Shaping with the given deadzone and curve, default snap thresholds.
    #[must_use]
    pub const fn new(deadzone: f32, gamma: f32) -> Self {
        Self {
            deadzone,
            gamma,
            sensitivity: 1.0,
            snap_minor: 0.05,
            snap_major: 0.95,
            snap_edge: 0.98,
        }
    }

    /// Pass-through shaping: no deadzone, linear response.
    pub const LINEAR: Self = Self::new(0.0, 1.0);
}

impl Default for AxisCurveConfig {
    fn default() -> Self {
        Self::LINEAR
    }
}

/// A shaped stick vector, each component in [-1.0, 1.0].
///
/// Components equal exactly `0.0` or `±1.0` at the snap points, which the
/// protocol conversions rely on to emit exact center and extreme values.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShapedStick {
    pub x: f32,
    pub y: f32,
}

impl ShapedStick {
    pub const CENTER: Self = Self { x: 0.0, y: 0.0 };
}

#[inline]
fn sign(v: f32) -> f32 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Shape a raw stick vector through deadzone, curve, and snapping.
#[must_use]
pub fn shape_stick(raw_x: i16, raw_y: i16, cfg: &AxisCurveConfig) -> ShapedStick {
    let vx = raw_x as f32 / STICK_RANGE;
    let vy = raw_y as f32 / STICK_RANGE;

    let mut mag = sqrtf(vx * vx + vy * vy);

    // Resting or inside the deadzone: exact center, and no division by a
    // near-zero magnitude below.
    if mag <= cfg.deadzone || mag < REST_EPSILON {
        return ShapedStick::CENTER;
    }

    // Clamping the magnitude before the edge snap makes a full diagonal
    // divide to (±1, ±1): the corner saturates instead of shrinking to the
    // unit circle, so full deflection always yields exact extremes.
    if mag > 1.0 {
        mag = 1.0;
    }

    // Axis snap: collapse a near-cardinal deflection to the exact cardinal.
    if fabsf(vx) <= cfg.snap_minor && fabsf(vy) >= cfg.snap_major {
        return ShapedStick {
            x: 0.0,
            y: sign(vy),
        };
    }
    if fabsf(vy) <= cfg.snap_minor && fabsf(vx) >= cfg.snap_major {
        return ShapedStick {
            x: sign(vx),
            y: 0.0,
        };
    }

    // Edge snap: push the vector onto the rim and let the protocol
    // conversion force exact extremes on components at or beyond ±1.0.
    if mag >= cfg.snap_edge {
        return ShapedStick {
            x: (vx / mag).clamp(-1.0, 1.0),
            y: (vy / mag).clamp(-1.0, 1.0),
        };
    }

    // Curved region: rescale [deadzone, 1.0] onto [0.0, 1.0], apply the
    // gamma curve and sensitivity, then rebuild the vector preserving angle.
    let adjusted = ((mag - cfg.deadzone) / (1.0 - cfg.deadzone)).clamp(0.0, 1.0);
    let mut fraction = powf(adjusted, cfg.gamma) * cfg.sensitivity;
    if fraction > 1.0 {
        fraction = 1.0;
    }

    let scale = fraction / mag;
    ShapedStick {
        x: (vx * scale).clamp(-1.0, 1.0),
        y: (vy * scale).clamp(-1.0, 1.0),
    }
}
