//! Per-pixel animation effects.

use super::LedError;
use crate::color::{color_wheel, scale_rgb, Rgb};

/// Animation applied to a single LED, selected by the host with a one-byte id.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Effect {
    /// Base color as-is. Phase still advances so spaced effects stay in step.
    #[default]
    Static = 0x00,
    /// Ramp from off to the base color.
    BreathingUp = 0x01,
    /// Ramp from the base color to off.
    BreathingDown = 0x02,
    /// Sweep the hue wheel, ignoring the base color.
    ColorCycle = 0x03,
}

impl TryFrom<u8> for Effect {
    type Error = LedError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0x00 => Ok(Effect::Static),
            0x01 => Ok(Effect::BreathingUp),
            0x02 => Ok(Effect::BreathingDown),
            0x03 => Ok(Effect::ColorCycle),
            other => Err(LedError::UnknownEffect(other)),
        }
    }
}

impl Effect {
    /// Output color for `base` at `phase`.
    #[must_use]
    pub fn render(self, base: Rgb, phase: u8) -> Rgb {
        match self {
            Effect::Static => base,
            Effect::BreathingUp => scale_rgb(base, phase),
            Effect::BreathingDown => scale_rgb(base, u8::MAX - phase),
            Effect::ColorCycle => color_wheel(phase),
        }
    }

    /// Envelope adjustment applied when the phase wraps from 255 to 0.
    #[inline]
    #[must_use]
    pub const fn envelope_step(self) -> i8 {
        match self {
            Effect::BreathingUp => 1,
            Effect::BreathingDown => -1,
            Effect::Static | Effect::ColorCycle => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Rgb = Rgb { r: 200, g: 100, b: 50 };

    #[test]
    fn test_effect_ids() {
        assert_eq!(Effect::try_from(0x03), Ok(Effect::ColorCycle));
        assert_eq!(Effect::try_from(0x04), Err(LedError::UnknownEffect(0x04)));
    }

    #[test]
    fn test_static_ignores_phase() {
        assert_eq!(Effect::Static.render(BASE, 0), BASE);
        assert_eq!(Effect::Static.render(BASE, 200), BASE);
    }

    #[test]
    fn test_breathing_ramps() {
        assert_eq!(Effect::BreathingUp.render(BASE, 0), Rgb { r: 0, g: 0, b: 0 });
        assert_eq!(Effect::BreathingUp.render(BASE, 255), BASE);
        assert_eq!(Effect::BreathingDown.render(BASE, 0), BASE);
        assert_eq!(Effect::BreathingDown.render(BASE, 255), Rgb { r: 0, g: 0, b: 0 });
        assert_eq!(
            Effect::BreathingUp.render(BASE, 128),
            Rgb { r: 100, g: 50, b: 25 }
        );
    }

    #[test]
    fn test_color_cycle_ignores_base() {
        assert_eq!(Effect::ColorCycle.render(BASE, 0), Rgb { r: 255, g: 0, b: 0 });
    }

    #[test]
    fn test_color_cycle_walks_the_hue_wheel() {
        // One third of the way round is green, two thirds is blue
        let green = Effect::ColorCycle.render(BASE, 85);
        assert_eq!(green.g, 255);
        assert!(green.r <= 1 && green.b <= 1, "{green:?}");

        let blue = Effect::ColorCycle.render(BASE, 170);
        assert_eq!(blue.b, 255);
        assert!(blue.r <= 1 && blue.g <= 1, "{blue:?}");

        // Halfway between red and green is yellow
        let yellow = Effect::ColorCycle.render(BASE, 43);
        assert_eq!(yellow.g, 255);
        assert!(yellow.r > 240 && yellow.b <= 1, "{yellow:?}");
    }
}
