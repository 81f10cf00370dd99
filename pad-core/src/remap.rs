//! Physical-to-virtual button translation.
//!
//! The remap table is total: every physical button bit maps to a set of
//! virtual buttons (possibly empty, possibly several). The default table is
//! the identity; presets override individual rows. Translation is pure and
//! timing-free, and the derived trigger bits ([`Buttons::LT`]/[`Buttons::RT`])
//! participate like any other button, which is how a shoulder button can
//! drive a trigger and vice versa.

use pad_proto::Buttons;

/// Static physical-to-virtual button mapping, one row per button bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RemapTable {
    targets: [Buttons; Buttons::COUNT],
}

impl RemapTable {
    /// Identity mapping: every button maps to itself.
    #[must_use]
    pub const fn identity() -> Self {
        let mut targets = [Buttons::NONE; Buttons::COUNT];
        let mut i = 0;
        while i < Buttons::COUNT {
            targets[i] = Buttons(1 << i);
            i += 1;
        }
        Self { targets }
    }

    /// Replace the mapping of a single physical button.
    ///
    /// `from` must be a single button bit; `to` may be empty (button
    /// disabled), one button, or several.
    #[must_use]
    pub const fn with(mut self, from: Buttons, to: Buttons) -> Self {
        assert!(from.0.count_ones() == 1, "remap source must be one button");
        self.targets[from.0.trailing_zeros() as usize] = to;
        self
    }

    /// The virtual buttons a physical button maps to.
    #[must_use]
    pub const fn target(&self, from: Buttons) -> Buttons {
        assert!(from.0.count_ones() == 1, "remap source must be one button");
        self.targets[from.0.trailing_zeros() as usize]
    }

    /// Translate a pressed set through the table.
    #[must_use]
    pub fn apply(&self, pressed: Buttons) -> Buttons {
        let mut out = Buttons::NONE;
        for (index, &target) in self.targets.iter().enumerate() {
            if pressed.0 & (1 << index) != 0 {
                out |= target;
            }
        }
        out
    }
}

impl Default for RemapTable {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_BUTTONS: [Buttons; Buttons::COUNT] = [
        Buttons::A,
        Buttons::B,
        Buttons::X,
        Buttons::Y,
        Buttons::LB,
        Buttons::RB,
        Buttons::BACK,
        Buttons::START,
        Buttons::GUIDE,
        Buttons::LS,
        Buttons::RS,
        Buttons::MISC,
        Buttons::TOUCHPAD,
        Buttons::LT,
        Buttons::RT,
    ];

    #[test]
    fn test_identity_maps_every_button_to_itself() {
        let table = RemapTable::identity();
        for button in ALL_BUTTONS {
            assert_eq!(table.apply(button), button);
        }
    }

    #[test]
    fn test_one_to_one_remap() {
        let table = RemapTable::identity().with(Buttons::LB, Buttons::RT);
        assert_eq!(table.apply(Buttons::LB), Buttons::RT);
        // Other rows untouched
        assert_eq!(table.apply(Buttons::A), Buttons::A);
    }

    #[test]
    fn test_one_to_many_remap() {
        let table = RemapTable::identity().with(Buttons::BACK, Buttons::BACK | Buttons::TOUCHPAD);
        assert_eq!(table.apply(Buttons::BACK), Buttons::BACK | Buttons::TOUCHPAD);
    }

    #[test]
    fn test_disabled_button_sets_nothing() {
        let table = RemapTable::identity().with(Buttons::MISC, Buttons::NONE);
        assert_eq!(table.apply(Buttons::MISC), Buttons::NONE);
    }

    #[test]
    fn test_unpressed_buttons_never_contribute() {
        let table = RemapTable::identity().with(Buttons::A, Buttons::X | Buttons::Y);
        // A not pressed: its row must not leak into the output
        assert_eq!(table.apply(Buttons::B | Buttons::LS), Buttons::B | Buttons::LS);
    }

    #[test]
    fn test_merged_output() {
        let table = RemapTable::identity()
            .with(Buttons::A, Buttons::X)
            .with(Buttons::B, Buttons::X);
        // Two sources can land on the same virtual button
        assert_eq!(table.apply(Buttons::A | Buttons::B), Buttons::X);
    }

    #[test]
    fn test_target_lookup() {
        let table = RemapTable::identity().with(Buttons::RB, Buttons::RT);
        assert_eq!(table.target(Buttons::RB), Buttons::RT);
        assert_eq!(table.target(Buttons::Y), Buttons::Y);
    }
}
