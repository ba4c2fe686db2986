//! LED animation engine.
//!
//! The engine owns one [`Pixel`] per LED plus a table of [`Section`]s. Hosts
//! change pixel attributes through the fill operations; [`LedEngine::tick`]
//! evolves effect state and [`LedEngine::compose`] projects the result through
//! each pixel's brightness into the frame handed to the LED driver.
//!
//! ```
//! use controller_core::led::{LedEngine, LedValue, Section};
//! use controller_core::color::Rgb;
//!
//! let mut leds = LedEngine::<10, 1>::new([Section::new(0, 7)]).unwrap();
//! leds.fill_section(0, LedValue::BaseColor(Rgb { r: 255, g: 0, b: 0 })).unwrap();
//! leds.tick(0);
//! assert_eq!(leds.compose()[3], Rgb { r: 255, g: 0, b: 0 });
//! assert_eq!(leds.compose()[8], Rgb { r: 0, g: 0, b: 0 });
//! ```

mod effect;

pub use effect::Effect;

use crate::color::{scale_rgb, Rgb, BLACK};

/// Value-kind byte for each [`LedValue`] on the wire.
pub mod value_kind {
    pub const BASE_COLOR: u8 = 0x01;
    pub const EFFECT: u8 = 0x02;
    pub const EFFECT_SPACED: u8 = 0x03;
    pub const PHASE_OFFSET: u8 = 0x04;
    pub const SPEED: u8 = 0x05;
    pub const BRIGHTNESS: u8 = 0x06;
}

/// Error type for LED operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedError {
    /// Value-kind byte not recognized.
    UnknownValueKind(u8),
    /// Effect id not recognized.
    UnknownEffect(u8),
    /// Payload shorter than the value kind requires.
    MissingData,
    /// LED range outside the strip or reversed.
    OutOfRange,
    /// Section id past the section table.
    UnknownSection(u8),
    /// Section bounds outside the strip or reversed.
    InvalidSection,
}

impl core::fmt::Display for LedError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownValueKind(kind) => write!(f, "unknown value kind {kind:#04x}"),
            Self::UnknownEffect(id) => write!(f, "unknown effect {id:#04x}"),
            Self::MissingData => write!(f, "missing value data"),
            Self::OutOfRange => write!(f, "led range out of bounds"),
            Self::UnknownSection(id) => write!(f, "unknown section {id}"),
            Self::InvalidSection => write!(f, "invalid section bounds"),
        }
    }
}

/// One attribute to apply across a range of LEDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedValue {
    BaseColor(Rgb),
    /// Select an effect and restart its phase.
    Effect(Effect),
    /// Select an effect with phases spread evenly over the range.
    EffectSpaced(Effect),
    PhaseOffset(u8),
    /// Ticks per phase step. Zero holds the phase.
    Speed(u8),
    Brightness(u8),
}

impl LedValue {
    /// Decode a value-kind byte and its payload.
    ///
    /// # Errors
    ///
    /// Fails on an unknown kind or effect id, or a payload that is too short.
    pub fn from_wire(kind: u8, data: &[u8]) -> Result<Self, LedError> {
        let byte = || data.first().copied().ok_or(LedError::MissingData);

        match kind {
            value_kind::BASE_COLOR => match data {
                [r, g, b, ..] => Ok(LedValue::BaseColor(Rgb {
                    r: *r,
                    g: *g,
                    b: *b,
                })),
                _ => Err(LedError::MissingData),
            },
            value_kind::EFFECT => Ok(LedValue::Effect(Effect::try_from(byte()?)?)),
            value_kind::EFFECT_SPACED => Ok(LedValue::EffectSpaced(Effect::try_from(byte()?)?)),
            value_kind::PHASE_OFFSET => Ok(LedValue::PhaseOffset(byte()?)),
            value_kind::SPEED => Ok(LedValue::Speed(byte()?)),
            value_kind::BRIGHTNESS => Ok(LedValue::Brightness(byte()?)),
            other => Err(LedError::UnknownValueKind(other)),
        }
    }
}

/// Inclusive run of LEDs addressed by a section id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Section {
    pub start: u8,
    pub end: u8,
}

impl Section {
    #[must_use]
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// Number of LEDs covered.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end as usize - self.start as usize + 1
    }

    const fn fits(&self, led_count: usize) -> bool {
        self.start <= self.end && (self.end as usize) < led_count
    }
}

/// Animation state of a single LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pixel {
    base: Rgb,
    effect: Effect,
    phase: u8,
    speed: u8,
    brightness: u8,
    envelope: u8,
    output: Rgb,
}

impl Default for Pixel {
    fn default() -> Self {
        Self::new()
    }
}

impl Pixel {
    /// Black, static, full brightness, phase advancing every tick.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base: BLACK,
            effect: Effect::Static,
            phase: 0,
            speed: 1,
            brightness: u8::MAX,
            envelope: 0,
            output: BLACK,
        }
    }

    #[must_use]
    pub const fn base(&self) -> Rgb {
        self.base
    }

    #[must_use]
    pub const fn effect(&self) -> Effect {
        self.effect
    }

    #[must_use]
    pub const fn phase(&self) -> u8 {
        self.phase
    }

    #[must_use]
    pub const fn speed(&self) -> u8 {
        self.speed
    }

    #[must_use]
    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Number of completed breathing cycles (wrapping).
    #[must_use]
    pub const fn envelope(&self) -> u8 {
        self.envelope
    }

    /// Effect output from the last tick, before brightness.
    #[must_use]
    pub const fn output(&self) -> Rgb {
        self.output
    }

    fn tick(&mut self, t: u32) {
        self.output = self.effect.render(self.base, self.phase);

        if self.speed == 0 || t % u32::from(self.speed) != 0 {
            return;
        }
        if self.phase == u8::MAX {
            self.envelope = self
                .envelope
                .wrapping_add_signed(self.effect.envelope_step());
        }
        self.phase = self.phase.wrapping_add(1);
    }
}

/// LED state for a strip of `N` LEDs with `S` sections.
#[derive(Clone, Debug)]
pub struct LedEngine<const N: usize, const S: usize> {
    pixels: [Pixel; N],
    sections: [Section; S],
}

impl<const N: usize, const S: usize> LedEngine<N, S> {
    /// Create an engine with every pixel at its default.
    ///
    /// # Errors
    ///
    /// Returns [`LedError::InvalidSection`] if any section is reversed or runs
    /// past the strip.
    pub fn new(sections: [Section; S]) -> Result<Self, LedError> {
        const {
            assert!(N <= u8::MAX as usize, "LED indices are addressed with one byte");
            assert!(S <= u8::MAX as usize, "section ids are addressed with one byte");
        }

        if sections.iter().any(|section| !section.fits(N)) {
            return Err(LedError::InvalidSection);
        }

        Ok(Self {
            pixels: [Pixel::new(); N],
            sections,
        })
    }

    /// Return every pixel to its power-on default.
    pub fn reset(&mut self) {
        self.pixels = [Pixel::new(); N];
    }

    #[must_use]
    pub fn pixel(&self, index: usize) -> Option<&Pixel> {
        self.pixels.get(index)
    }

    #[must_use]
    pub fn pixels(&self) -> &[Pixel; N] {
        &self.pixels
    }

    #[must_use]
    pub fn section(&self, id: usize) -> Option<Section> {
        self.sections.get(id).copied()
    }

    /// Apply `value` to LEDs `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`LedError::OutOfRange`] without touching any pixel if the range
    /// is reversed or runs past the strip.
    pub fn fill_range(&mut self, start: usize, end: usize, value: LedValue) -> Result<(), LedError> {
        if start > end || end >= N {
            return Err(LedError::OutOfRange);
        }

        let count = end - start + 1;
        for (offset, pixel) in self.pixels[start..=end].iter_mut().enumerate() {
            match value {
                LedValue::BaseColor(color) => pixel.base = color,
                LedValue::Effect(effect) => {
                    pixel.effect = effect;
                    pixel.phase = 0;
                }
                LedValue::EffectSpaced(effect) => {
                    pixel.effect = effect;
                    pixel.phase = spaced_phase(offset, count);
                }
                LedValue::PhaseOffset(phase) => pixel.phase = phase,
                LedValue::Speed(speed) => pixel.speed = speed,
                LedValue::Brightness(brightness) => pixel.brightness = brightness,
            }
        }
        Ok(())
    }

    /// Apply `value` to every LED in section `id`.
    ///
    /// # Errors
    ///
    /// Returns [`LedError::UnknownSection`] if `id` is past the section table.
    #[allow(clippy::cast_possible_truncation)]
    pub fn fill_section(&mut self, id: usize, value: LedValue) -> Result<(), LedError> {
        let section = self
            .section(id)
            .ok_or(LedError::UnknownSection(id.min(usize::from(u8::MAX)) as u8))?;
        self.fill_range(usize::from(section.start), usize::from(section.end), value)
    }

    /// Apply `value` to the whole strip.
    pub fn fill_all(&mut self, value: LedValue) -> Result<(), LedError> {
        N.checked_sub(1)
            .map_or(Ok(()), |end| self.fill_range(0, end, value))
    }

    /// Evaluate every pixel's effect for tick `t`, then advance phases whose
    /// speed divides `t`.
    pub fn tick(&mut self, t: u32) {
        for pixel in &mut self.pixels {
            pixel.tick(t);
        }
    }

    /// Frame for the LED driver: each effect output scaled by its brightness.
    #[must_use]
    pub fn compose(&self) -> [Rgb; N] {
        let mut frame = [BLACK; N];
        for (out, pixel) in frame.iter_mut().zip(&self.pixels) {
            *out = scale_rgb(pixel.output, pixel.brightness);
        }
        frame
    }
}

#[allow(clippy::cast_possible_truncation)]
fn spaced_phase(offset: usize, count: usize) -> u8 {
    (offset * usize::from(u8::MAX) / count) as u8
}
