//! Input report encoding: value scaling, feature configuration and the
//! little-endian report layout.
//!
//! The report is laid out in a fixed order and only enabled fields take space:
//!
//! ```text
//! [buttons: ceil(n/8) bytes][hats: 1 byte][X Y Z RX RY RZ: 2 bytes each][rudder throttle accelerator brake steering: 2 bytes each]
//! ```

use core::ops::BitOr;

/// Lowest value an axis field reports.
pub const AXIS_MIN: i16 = -32767;
/// Highest value an axis field reports.
pub const AXIS_MAX: i16 = 32767;

/// Maximum number of buttons a report can carry.
pub const MAX_BUTTONS: u8 = 64;
/// Maximum number of hat switches (both share one byte).
pub const MAX_HATS: u8 = 2;

/// Size of the largest possible report (64 buttons, hats, 11 axes).
pub const MAX_REPORT_LEN: usize = (MAX_BUTTONS as usize / 8) + 1 + 6 * 2 + 5 * 2;

/// Linearly map `value` from `[value_min, value_max]` onto `[out_min, out_max]`.
///
/// `value` is clamped into the source range first. If `value_min > value_max`
/// the source range is treated as inverted and the clamped value is reflected,
/// so a single function serves both increasing and decreasing mappings.
/// Division truncates toward zero, so results can be off by one near the ends
/// of the range.
///
/// A degenerate source range (`value_min == value_max`) yields `out_min`.
///
/// # Example
///
/// ```
/// use controller_core::report::scale;
///
/// assert_eq!(scale(0, -255, 255, -32767, 32767), 0);
/// assert_eq!(scale(255, -255, 255, -32767, 32767), 32767);
/// // Inverted source range
/// assert_eq!(scale(1024, 1024, 0, 0, 100), 0);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn scale(value: i32, value_min: i32, value_max: i32, out_min: i32, out_max: i32) -> i32 {
    let (real_min, real_max) = if value_min <= value_max {
        (value_min, value_max)
    } else {
        (value_max, value_min)
    };

    if real_min == real_max {
        return out_min;
    }

    let value = if value < real_min {
        real_min
    } else if value > real_max {
        real_max
    } else {
        value
    };

    // Offsets and the product span up to 2^64, so work in i128.
    let offset = if value_min > value_max {
        real_max as i128 - value as i128
    } else {
        value as i128 - real_min as i128
    };
    let span_in = real_max as i128 - real_min as i128;
    let span_out = out_max as i128 - out_min as i128;
    (offset * span_out / span_in + out_min as i128) as i32
}

/// Scale a bounded reading onto the full axis range `[AXIS_MIN, AXIS_MAX]`.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn scale_axis(value: i16, min: i16, max: i16) -> i16 {
    scale(
        value as i32,
        min as i32,
        max as i32,
        AXIS_MIN as i32,
        AXIS_MAX as i32,
    ) as i16
}

/// Positional axes, in report order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
    Z,
    Rx,
    Ry,
    Rz,
}

impl Axis {
    /// All positional axes in report order.
    pub const ALL: [Axis; 6] = [Axis::X, Axis::Y, Axis::Z, Axis::Rx, Axis::Ry, Axis::Rz];

    /// HID usage id on the Generic Desktop page.
    #[must_use]
    pub const fn usage(self) -> u8 {
        0x30 + self as u8
    }
}

/// Simulation controls, in report order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimulationAxis {
    Rudder,
    Throttle,
    Accelerator,
    Brake,
    Steering,
}

impl SimulationAxis {
    /// All simulation controls in report order.
    pub const ALL: [SimulationAxis; 5] = [
        SimulationAxis::Rudder,
        SimulationAxis::Throttle,
        SimulationAxis::Accelerator,
        SimulationAxis::Brake,
        SimulationAxis::Steering,
    ];

    /// HID usage id on the Simulation Controls page.
    #[must_use]
    pub const fn usage(self) -> u8 {
        match self {
            SimulationAxis::Rudder => 0xBA,
            SimulationAxis::Throttle => 0xBB,
            SimulationAxis::Accelerator => 0xC4,
            SimulationAxis::Brake => 0xC5,
            SimulationAxis::Steering => 0xC8,
        }
    }
}

/// Set of enabled positional axes (bit = [`Axis`] discriminant).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisSet(pub u8);

impl AxisSet {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b11_1111);

    #[must_use]
    pub const fn of(axis: Axis) -> Self {
        Self(1 << axis as u8)
    }

    #[must_use]
    pub const fn with(self, axis: Axis) -> Self {
        Self(self.0 | (1 << axis as u8))
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, axis: Axis) -> bool {
        self.0 & (1 << axis as u8) != 0
    }

    #[must_use]
    pub const fn count(self) -> usize {
        (self.0 & Self::ALL.0).count_ones() as usize
    }
}

impl BitOr for AxisSet {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Set of enabled simulation controls (bit = [`SimulationAxis`] discriminant).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SimulationSet(pub u8);

impl SimulationSet {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b1_1111);

    #[must_use]
    pub const fn of(axis: SimulationAxis) -> Self {
        Self(1 << axis as u8)
    }

    #[must_use]
    pub const fn with(self, axis: SimulationAxis) -> Self {
        Self(self.0 | (1 << axis as u8))
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, axis: SimulationAxis) -> bool {
        self.0 & (1 << axis as u8) != 0
    }

    #[must_use]
    pub const fn count(self) -> usize {
        (self.0 & Self::ALL.0).count_ones() as usize
    }
}

impl BitOr for SimulationSet {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Which inputs the device reports. Fixed for the lifetime of the firmware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FeatureConfig {
    /// Number of buttons (0..=64).
    pub buttons: u8,
    /// Number of hat switches (0..=2).
    pub hats: u8,
    pub axes: AxisSet,
    pub simulation: SimulationSet,
}

impl FeatureConfig {
    /// A single X axis and nothing else.
    #[must_use]
    pub const fn minimal() -> Self {
        Self {
            buttons: 0,
            hats: 0,
            axes: AxisSet::of(Axis::X),
            simulation: SimulationSet::NONE,
        }
    }

    /// 32 buttons, two hats, every positional and simulation axis.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            buttons: 32,
            hats: 2,
            axes: AxisSet::ALL,
            simulation: SimulationSet::ALL,
        }
    }

    /// Check the configuration against the report limits.
    pub const fn validate(&self) -> Result<(), ReportError> {
        if self.buttons > MAX_BUTTONS {
            return Err(ReportError::TooManyButtons);
        }
        if self.hats > MAX_HATS {
            return Err(ReportError::TooManyHats);
        }
        Ok(())
    }

    /// Bytes used by the button bitfield, padding included.
    #[inline]
    #[must_use]
    pub const fn button_bytes(&self) -> usize {
        (self.buttons as usize).div_ceil(8)
    }

    /// Unused bits at the end of the last button byte.
    #[inline]
    #[must_use]
    pub const fn button_padding(&self) -> u8 {
        (self.button_bytes() * 8 - self.buttons as usize) as u8
    }
}

/// Byte offsets of every enabled report field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportLayout {
    /// Offset of the first button byte.
    pub buttons: Option<usize>,
    /// Offset of the shared hat byte.
    pub hats: Option<usize>,
    /// Offsets of the positional axes, indexed by [`Axis`].
    pub axes: [Option<usize>; 6],
    /// Offsets of the simulation controls, indexed by [`SimulationAxis`].
    pub simulation: [Option<usize>; 5],
    /// Total report length in bytes.
    pub len: usize,
}

impl ReportLayout {
    #[must_use]
    pub const fn new(config: &FeatureConfig) -> Self {
        let mut cursor = 0;

        let buttons = if config.buttons > 0 {
            let offset = cursor;
            cursor += config.button_bytes();
            Some(offset)
        } else {
            None
        };

        let hats = if config.hats > 0 {
            let offset = cursor;
            cursor += 1;
            Some(offset)
        } else {
            None
        };

        let mut axes = [None; 6];
        let mut i = 0;
        while i < Axis::ALL.len() {
            if config.axes.contains(Axis::ALL[i]) {
                axes[i] = Some(cursor);
                cursor += 2;
            }
            i += 1;
        }

        let mut simulation = [None; 5];
        let mut i = 0;
        while i < SimulationAxis::ALL.len() {
            if config.simulation.contains(SimulationAxis::ALL[i]) {
                simulation[i] = Some(cursor);
                cursor += 2;
            }
            i += 1;
        }

        Self {
            buttons,
            hats,
            axes,
            simulation,
            len: cursor,
        }
    }
}

/// Hat switch direction. Values 0-7 go clockwise from up, 8 is released.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Hat {
    Up = 0,
    UpRight = 1,
    Right = 2,
    DownRight = 3,
    Down = 4,
    DownLeft = 5,
    Left = 6,
    UpLeft = 7,
    #[default]
    Centered = 8,
}

impl Hat {
    #[inline]
    #[must_use]
    pub const fn nibble(self) -> u8 {
        self as u8
    }
}

/// Snapshot of every input the report can carry.
///
/// Fields not enabled by the [`FeatureConfig`] are ignored when encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerState {
    /// Button bitfield, bit `n` = button `n`.
    pub buttons: u64,
    /// Hat 1 and hat 2.
    pub hats: [Hat; 2],
    pub axes: [i16; 6],
    pub simulation: [i16; 5],
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::neutral()
    }
}

impl ControllerState {
    /// No buttons pressed, hats centered, axes at zero.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            buttons: 0,
            hats: [Hat::Centered; 2],
            axes: [0; 6],
            simulation: [0; 5],
        }
    }

    /// Set or clear a button. Indices past [`MAX_BUTTONS`] are ignored.
    #[inline]
    pub fn set_button(&mut self, index: u8, pressed: bool) {
        if index >= MAX_BUTTONS {
            return;
        }
        if pressed {
            self.buttons |= 1 << index;
        } else {
            self.buttons &= !(1 << index);
        }
    }

    #[inline]
    #[must_use]
    pub const fn button(&self, index: u8) -> bool {
        index < MAX_BUTTONS && self.buttons & (1 << index) != 0
    }

    #[inline]
    pub fn set_axis(&mut self, axis: Axis, value: i16) {
        self.axes[axis as usize] = value;
    }

    #[inline]
    #[must_use]
    pub const fn axis(&self, axis: Axis) -> i16 {
        self.axes[axis as usize]
    }

    #[inline]
    pub fn set_simulation(&mut self, axis: SimulationAxis, value: i16) {
        self.simulation[axis as usize] = value;
    }
}

/// Error type for report encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// The output buffer is shorter than the report.
    BufferTooSmall,
    /// More than [`MAX_BUTTONS`] buttons configured.
    TooManyButtons,
    /// More than [`MAX_HATS`] hats configured.
    TooManyHats,
}

impl core::fmt::Display for ReportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::TooManyButtons => write!(f, "too many buttons"),
            Self::TooManyHats => write!(f, "too many hats"),
        }
    }
}

/// Writes bytes at a running cursor.
struct ReportCursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ReportCursor<'a> {
    #[inline]
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn put(&mut self, byte: u8) {
        self.buf[self.pos] = byte;
        self.pos += 1;
    }

    #[inline]
    fn put_i16_le(&mut self, value: i16) {
        for byte in value.to_le_bytes() {
            self.put(byte);
        }
    }
}

/// Encode `state` into `buf` following the layout of `config`.
///
/// Returns the number of bytes written, which always equals
/// [`ReportLayout::new(config).len`](ReportLayout::len). Bytes past the report
/// are left untouched.
///
/// # Errors
///
/// Returns [`ReportError::BufferTooSmall`] if `buf` cannot hold the report, or
/// a configuration error if `config` exceeds the report limits.
pub fn build_report(
    buf: &mut [u8],
    config: &FeatureConfig,
    state: &ControllerState,
) -> Result<usize, ReportError> {
    config.validate()?;
    let layout = ReportLayout::new(config);
    let out = buf
        .get_mut(..layout.len)
        .ok_or(ReportError::BufferTooSmall)?;
    let mut cursor = ReportCursor::new(out);

    for byte_index in 0..config.button_bytes() {
        let mut byte = 0u8;
        for bit in 0..8u8 {
            let index = (byte_index * 8) as u8 + bit;
            if index < config.buttons && state.button(index) {
                byte |= 1 << bit;
            }
        }
        cursor.put(byte);
    }

    if config.hats > 0 {
        let mut byte = state.hats[0].nibble() << 4;
        if config.hats > 1 {
            byte |= state.hats[1].nibble() & 0x0F;
        }
        cursor.put(byte);
    }

    for axis in Axis::ALL {
        if config.axes.contains(axis) {
            cursor.put_i16_le(state.axis(axis));
        }
    }

    for axis in SimulationAxis::ALL {
        if config.simulation.contains(axis) {
            cursor.put_i16_le(state.simulation[axis as usize]);
        }
    }

    Ok(cursor.pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_endpoints() {
        assert_eq!(scale(-255, -255, 255, -32767, 32767), -32767);
        assert_eq!(scale(255, -255, 255, -32767, 32767), 32767);
        assert_eq!(scale(0, -255, 255, -32767, 32767), 0);
    }

    #[test]
    fn test_scale_clamps_input() {
        assert_eq!(scale(1000, 0, 100, 0, 10), 10);
        assert_eq!(scale(-1000, 0, 100, 0, 10), 0);
    }

    #[test]
    fn test_scale_inverted_range_reflects() {
        assert_eq!(scale(1024, 1024, 0, 0, 1000), 0);
        assert_eq!(scale(0, 1024, 0, 0, 1000), 1000);
        assert_eq!(scale(1, 1, -1, -32767, 32767), -32767);
    }

    #[test]
    fn test_scale_truncates() {
        // 1 * 10 / 3 = 3.33
        assert_eq!(scale(1, 0, 3, 0, 10), 3);
    }

    #[test]
    fn test_scale_degenerate_range() {
        assert_eq!(scale(5, 7, 7, -10, 10), -10);
    }

    #[test]
    fn test_scale_stays_in_output_range() {
        let ranges = [(-255, 255), (255, -255), (0, 8), (1024, 0), (-3, -1)];
        let outputs = [(-32767, 32767), (32767, -32767), (0, 255), (100, -100)];
        for (vmin, vmax) in ranges {
            for (omin, omax) in outputs {
                let lo = omin.min(omax);
                let hi = omin.max(omax);
                for value in -300..=1100 {
                    let out = scale(value, vmin, vmax, omin, omax);
                    assert!(out >= lo && out <= hi, "{value} in {vmin}..{vmax} -> {out}");
                }
            }
        }
    }

    #[test]
    fn test_scale_full_i32_ranges() {
        assert_eq!(scale(i32::MAX, i32::MIN, i32::MAX, i32::MIN, i32::MAX), i32::MAX);
        assert_eq!(scale(i32::MIN, i32::MIN, i32::MAX, i32::MIN, i32::MAX), i32::MIN);
        assert_eq!(scale(i32::MIN, i32::MAX, i32::MIN, i32::MIN, i32::MAX), i32::MAX);
        assert_eq!(scale(i32::MAX, i32::MIN, i32::MAX, i32::MAX, i32::MIN), i32::MIN);

        for value in [i32::MIN, -1, 0, 1, i32::MAX] {
            let out = scale(value, i32::MAX, i32::MIN, -32767, 32767);
            assert!((-32767..=32767).contains(&out), "{value} -> {out}");
            let out = scale(value, -1, 1, i32::MIN, i32::MAX);
            assert!(out >= i32::MIN && out <= i32::MAX);
        }
    }

    #[test]
    fn test_scale_monotonic() {
        let mut previous = i32::MIN;
        for value in -300..=300 {
            let out = scale(value, -255, 255, -32767, 32767);
            assert!(out >= previous);
            previous = out;
        }

        let mut previous = i32::MAX;
        for value in -300..=300 {
            let out = scale(value, 255, -255, -32767, 32767);
            assert!(out <= previous);
            previous = out;
        }
    }

    #[test]
    fn test_scale_axis() {
        assert_eq!(scale_axis(-255, -255, 255), AXIS_MIN);
        assert_eq!(scale_axis(255, -255, 255), AXIS_MAX);
        assert_eq!(scale_axis(4, 0, 8), 0);
    }

    #[test]
    fn test_layout_full() {
        let layout = ReportLayout::new(&FeatureConfig::full());
        assert_eq!(layout.buttons, Some(0));
        assert_eq!(layout.hats, Some(4));
        assert_eq!(layout.axes[Axis::X as usize], Some(5));
        assert_eq!(layout.axes[Axis::Rz as usize], Some(15));
        assert_eq!(layout.simulation[SimulationAxis::Rudder as usize], Some(17));
        assert_eq!(layout.simulation[SimulationAxis::Steering as usize], Some(25));
        assert_eq!(layout.len, 27);
    }

    #[test]
    fn test_layout_skips_disabled_fields() {
        let config = FeatureConfig {
            buttons: 12,
            hats: 0,
            axes: AxisSet::of(Axis::Y),
            simulation: SimulationSet::of(SimulationAxis::Brake),
        };
        let layout = ReportLayout::new(&config);
        assert_eq!(layout.buttons, Some(0));
        assert_eq!(layout.hats, None);
        assert_eq!(layout.axes[Axis::X as usize], None);
        assert_eq!(layout.axes[Axis::Y as usize], Some(2));
        assert_eq!(layout.simulation[SimulationAxis::Brake as usize], Some(4));
        assert_eq!(layout.len, 6);
    }

    #[test]
    fn test_report_length_matches_layout_for_every_config() {
        let mut buf = [0u8; MAX_REPORT_LEN];
        let state = ControllerState::neutral();
        for buttons in [0u8, 1, 7, 8, 9, 12, 32, 63, 64] {
            for hats in 0..=MAX_HATS {
                for axes in 0..=AxisSet::ALL.0 {
                    for simulation in [0u8, 1, 0b1_0101, SimulationSet::ALL.0] {
                        let config = FeatureConfig {
                            buttons,
                            hats,
                            axes: AxisSet(axes),
                            simulation: SimulationSet(simulation),
                        };
                        let len = build_report(&mut buf, &config, &state).unwrap();
                        assert_eq!(len, ReportLayout::new(&config).len);
                    }
                }
            }
        }
    }

    #[test]
    fn test_report_all_disabled_is_empty() {
        let config = FeatureConfig {
            buttons: 0,
            hats: 0,
            axes: AxisSet::NONE,
            simulation: SimulationSet::NONE,
        };
        let mut buf = [0xAAu8; 4];
        assert_eq!(build_report(&mut buf, &config, &ControllerState::neutral()), Ok(0));
        assert_eq!(buf, [0xAA; 4]);
    }

    #[test]
    fn test_report_minimal_single_axis() {
        let mut state = ControllerState::neutral();
        state.set_axis(Axis::X, -2);
        let mut buf = [0u8; 2];
        let len = build_report(&mut buf, &FeatureConfig::minimal(), &state).unwrap();
        assert_eq!(len, 2);
        assert_eq!(buf, [0xFE, 0xFF]);
    }

    #[test]
    fn test_report_buttons_packed_lsb_first() {
        let config = FeatureConfig {
            buttons: 12,
            hats: 0,
            axes: AxisSet::NONE,
            simulation: SimulationSet::NONE,
        };
        let mut state = ControllerState::neutral();
        state.set_button(0, true);
        state.set_button(7, true);
        state.set_button(9, true);
        // Past the configured count, must not appear
        state.set_button(13, true);

        let mut buf = [0u8; 2];
        build_report(&mut buf, &config, &state).unwrap();
        assert_eq!(buf, [0b1000_0001, 0b0000_0010]);
    }

    #[test]
    fn test_report_hat_nibbles() {
        let config = FeatureConfig {
            buttons: 0,
            hats: 2,
            axes: AxisSet::NONE,
            simulation: SimulationSet::NONE,
        };
        let mut state = ControllerState::neutral();
        state.hats = [Hat::Right, Hat::Centered];
        let mut buf = [0u8; 1];
        build_report(&mut buf, &config, &state).unwrap();
        assert_eq!(buf[0], 0x28);

        let single = FeatureConfig { hats: 1, ..config };
        build_report(&mut buf, &single, &state).unwrap();
        assert_eq!(buf[0], 0x20);
    }

    #[test]
    fn test_report_full_field_positions() {
        let config = FeatureConfig::full();
        let mut state = ControllerState::neutral();
        state.set_button(31, true);
        state.hats = [Hat::Up, Hat::Down];
        state.set_axis(Axis::X, 0x1234);
        state.set_simulation(SimulationAxis::Steering, -1);

        let mut buf = [0u8; MAX_REPORT_LEN];
        let len = build_report(&mut buf, &config, &state).unwrap();
        assert_eq!(len, 27);
        assert_eq!(&buf[..4], &[0, 0, 0, 0x80]);
        assert_eq!(buf[4], 0x04);
        assert_eq!(&buf[5..7], &[0x34, 0x12]);
        assert_eq!(&buf[25..27], &[0xFF, 0xFF]);
    }

    #[test]
    fn test_report_buffer_too_small() {
        let mut buf = [0u8; 4];
        assert_eq!(
            build_report(&mut buf, &FeatureConfig::full(), &ControllerState::neutral()),
            Err(ReportError::BufferTooSmall)
        );
    }

    #[test]
    fn test_config_validation() {
        let config = FeatureConfig {
            hats: 3,
            ..FeatureConfig::full()
        };
        assert_eq!(config.validate(), Err(ReportError::TooManyHats));
        let config = FeatureConfig {
            buttons: 65,
            ..FeatureConfig::full()
        };
        assert_eq!(config.validate(), Err(ReportError::TooManyButtons));
    }
}
