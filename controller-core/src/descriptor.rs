//! HID report descriptor generation for a [`FeatureConfig`].
//!
//! The descriptor always matches the byte layout produced by
//! [`build_report`](crate::report::build_report): a gamepad application
//! collection with report id [`REPORT_ID`], then buttons, hats, positional axes
//! and simulation controls, each block present only when enabled.
//!
//! HID packs fields LSB first, so the hat byte declares its low nibble (hat 2,
//! or padding with a single hat) before the high nibble (hat 1).

use heapless::Vec;

use crate::report::{Axis, FeatureConfig, ReportError, SimulationAxis};

/// Report id prefixed to every input report on the wire.
pub const REPORT_ID: u8 = 0x01;

/// Longest descriptor any valid configuration produces.
pub const MAX_DESCRIPTOR_LEN: usize = HEADER_LEN
    + BUTTONS_LEN
    + PADDING_LEN
    + DESKTOP_PAGE_LEN
    + SINGLE_HAT_LEN
    + AXIS_BLOCK_LEN
    + 6 * 2
    + AXIS_BLOCK_LEN
    + 5 * 2
    + END_LEN;

const HEADER_LEN: usize = 8;
const BUTTONS_LEN: usize = 20;
const PADDING_LEN: usize = 6;
const DESKTOP_PAGE_LEN: usize = 2;
const DUAL_HAT_LEN: usize = 25;
const SINGLE_HAT_LEN: usize = PADDING_LEN + 23;
const AXIS_BLOCK_LEN: usize = 14 + 3;
const END_LEN: usize = 1;

/// Descriptor length for `config`, without building it.
///
/// Only meaningful for configurations that pass
/// [`FeatureConfig::validate`]; larger ones are still measured without
/// overflowing, but [`report_descriptor`] rejects them.
#[must_use]
pub const fn descriptor_len(config: &FeatureConfig) -> usize {
    let mut len = HEADER_LEN;

    if config.buttons > 0 {
        len += BUTTONS_LEN;
        if config.button_padding() > 0 {
            len += PADDING_LEN;
        }
    }

    let axes = config.axes.count();
    if config.hats > 0 || axes > 0 {
        len += DESKTOP_PAGE_LEN;
    }

    len += match config.hats {
        0 => 0,
        1 => SINGLE_HAT_LEN,
        _ => DUAL_HAT_LEN,
    };

    if axes > 0 {
        len += AXIS_BLOCK_LEN + axes * 2;
    }

    let simulation = config.simulation.count();
    if simulation > 0 {
        len += AXIS_BLOCK_LEN + simulation * 2;
    }

    len + END_LEN
}

/// Build the HID report descriptor for `config`.
///
/// # Errors
///
/// Returns a configuration error if `config` exceeds the report limits.
pub fn report_descriptor(
    config: &FeatureConfig,
) -> Result<Vec<u8, MAX_DESCRIPTOR_LEN>, ReportError> {
    config.validate()?;
    let mut desc = DescriptorWriter::default();

    desc.items(&[
        0x05, 0x01, // Usage Page (Generic Desktop)
        0x09, 0x05, // Usage (Gamepad)
        0xA1, 0x01, // Collection (Application)
        0x85, REPORT_ID, // Report ID
    ]);

    if config.buttons > 0 {
        desc.items(&[
            0x05, 0x09, // Usage Page (Button)
            0x19, 0x01, // Usage Minimum (Button 1)
            0x29, config.buttons, // Usage Maximum
            0x15, 0x00, // Logical Minimum (0)
            0x25, 0x01, // Logical Maximum (1)
            0x75, 0x01, // Report Size (1)
            0x95, config.buttons, // Report Count
            0x55, 0x00, // Unit Exponent (0)
            0x65, 0x00, // Unit (None)
            0x81, 0x02, // Input (Data, Variable, Absolute)
        ]);
        let padding = config.button_padding();
        if padding > 0 {
            desc.padding(1, padding);
        }
    }

    let axes = config.axes.count();
    if config.hats > 0 || axes > 0 {
        desc.items(&[0x05, 0x01]); // Usage Page (Generic Desktop)
    }

    match config.hats {
        0 => {}
        1 => {
            desc.padding(4, 1);
            desc.hat_switches(1);
        }
        _ => desc.hat_switches(2),
    }

    if axes > 0 {
        desc.items(&[
            0x09, 0x01, // Usage (Pointer)
            0xA1, 0x00, // Collection (Physical)
        ]);
        desc.axis_range(axes);
        for axis in Axis::ALL {
            if config.axes.contains(axis) {
                desc.items(&[0x09, axis.usage()]);
            }
        }
        desc.end_axis_block();
    }

    let simulation = config.simulation.count();
    if simulation > 0 {
        desc.items(&[
            0x05, 0x02, // Usage Page (Simulation Controls)
            0xA1, 0x00, // Collection (Physical)
        ]);
        desc.axis_range(simulation);
        for axis in SimulationAxis::ALL {
            if config.simulation.contains(axis) {
                desc.items(&[0x09, axis.usage()]);
            }
        }
        desc.end_axis_block();
    }

    desc.items(&[0xC0]); // End Collection
    Ok(desc.finish())
}

#[derive(Default)]
struct DescriptorWriter {
    buf: Vec<u8, MAX_DESCRIPTOR_LEN>,
}

impl DescriptorWriter {
    fn items(&mut self, bytes: &[u8]) {
        // MAX_DESCRIPTOR_LEN covers every valid configuration
        let _ = self.buf.extend_from_slice(bytes);
    }

    fn padding(&mut self, size: u8, count: u8) {
        self.items(&[
            0x75, size, // Report Size
            0x95, count, // Report Count
            0x81, 0x03, // Input (Constant, Variable, Absolute)
        ]);
    }

    fn hat_switches(&mut self, count: u8) {
        for _ in 0..count {
            self.items(&[0x09, 0x39]); // Usage (Hat Switch)
        }
        self.items(&[
            0x15, 0x00, // Logical Minimum (0)
            0x25, 0x07, // Logical Maximum (7)
            0x35, 0x00, // Physical Minimum (0)
            0x46, 0x3B, 0x01, // Physical Maximum (315)
            0x65, 0x14, // Unit (Degrees)
            0x75, 0x04, // Report Size (4)
            0x95, count, // Report Count
            0x81, 0x42, // Input (Data, Variable, Absolute, Null State)
            0x65, 0x00, // Unit (None)
            0x45, 0x00, // Physical Maximum (0)
        ]);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn axis_range(&mut self, count: usize) {
        self.items(&[
            0x16, 0x01, 0x80, // Logical Minimum (-32767)
            0x26, 0xFF, 0x7F, // Logical Maximum (32767)
            0x75, 0x10, // Report Size (16)
            0x95, count as u8, // Report Count
        ]);
    }

    fn end_axis_block(&mut self) {
        self.items(&[
            0x81, 0x02, // Input (Data, Variable, Absolute)
            0xC0, // End Collection
        ]);
    }

    fn finish(self) -> Vec<u8, MAX_DESCRIPTOR_LEN> {
        self.buf
    }
}
