//! Bounded rotary encoder position shared between interrupt and thread context.
//!
//! Every mutation is a single compare-and-swap that clamps the new value into
//! `[min, max]`, so a quadrature interrupt and the polling loop can step the
//! same counter without losing updates. On cores without native CAS (RP2040)
//! `portable-atomic` runs the update inside a critical section, which masks
//! interrupts for the duration of that one update.

use portable_atomic::{AtomicI16, Ordering};

use crate::report::scale_axis;

/// Saturating counter for a rotary encoder.
///
/// ```
/// use controller_core::RotaryEncoder;
///
/// static ENCODER: RotaryEncoder = RotaryEncoder::new(-255, 255, 0);
///
/// ENCODER.decrement();
/// assert_eq!(ENCODER.position(), -1);
/// ```
#[derive(Debug)]
pub struct RotaryEncoder {
    position: AtomicI16,
    min: AtomicI16,
    max: AtomicI16,
}

impl Default for RotaryEncoder {
    fn default() -> Self {
        Self::new(-255, 255, 0)
    }
}

impl RotaryEncoder {
    /// Create an encoder with the given bounds. `initial` is clamped into range
    /// and swapped bounds are reordered.
    #[must_use]
    pub const fn new(min: i16, max: i16, initial: i16) -> Self {
        let (min, max) = ordered(min, max);
        Self {
            position: AtomicI16::new(clamp(initial, min, max)),
            min: AtomicI16::new(min),
            max: AtomicI16::new(max),
        }
    }

    /// Reconfigure bounds and position. Only meant for start-up, before the
    /// quadrature interrupt is enabled.
    pub fn init(&self, min: i16, max: i16, initial: i16) {
        let (min, max) = ordered(min, max);
        self.min.store(min, Ordering::Release);
        self.max.store(max, Ordering::Release);
        self.position
            .store(clamp(initial, min, max), Ordering::Release);
    }

    /// Step one count up. Dropped at `max`. Returns the resulting position.
    #[inline]
    pub fn increment(&self) -> i16 {
        self.step(1)
    }

    /// Step one count down. Dropped at `min`. Returns the resulting position.
    #[inline]
    pub fn decrement(&self) -> i16 {
        self.step(-1)
    }

    /// Store `position`, clamped into `[min, max]`.
    pub fn set_position(&self, position: i16) {
        let (min, max) = self.bounds();
        self.position
            .store(clamp(position, min, max), Ordering::Release);
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> i16 {
        self.position.load(Ordering::Acquire)
    }

    #[inline]
    #[must_use]
    pub fn min(&self) -> i16 {
        self.min.load(Ordering::Acquire)
    }

    #[inline]
    #[must_use]
    pub fn max(&self) -> i16 {
        self.max.load(Ordering::Acquire)
    }

    /// Current position scaled onto the full report axis range.
    #[must_use]
    pub fn axis_value(&self) -> i16 {
        let (min, max) = self.bounds();
        scale_axis(self.position(), min, max)
    }

    #[inline]
    fn bounds(&self) -> (i16, i16) {
        (self.min(), self.max())
    }

    fn step(&self, delta: i16) -> i16 {
        let (min, max) = self.bounds();
        let result = self
            .position
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                let next = clamp(current.saturating_add(delta), min, max);
                (next != current).then_some(next)
            });

        match result {
            Ok(previous) => clamp(previous.saturating_add(delta), min, max),
            Err(unchanged) => unchanged,
        }
    }
}

/// Steps a [`RotaryEncoder`] once per press of an up or down button, for
/// boards that emulate the encoder with two push buttons.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepButtons {
    up: bool,
    down: bool,
}

impl StepButtons {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            up: false,
            down: false,
        }
    }

    /// Feed the current pressed state of both buttons.
    pub fn update(&mut self, encoder: &RotaryEncoder, up: bool, down: bool) {
        if up && !self.up {
            encoder.increment();
        }
        if down && !self.down {
            encoder.decrement();
        }
        self.up = up;
        self.down = down;
    }
}

const fn ordered(a: i16, b: i16) -> (i16, i16) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

const fn clamp(value: i16, min: i16, max: i16) -> i16 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}
