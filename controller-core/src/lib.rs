//! Platform-agnostic core of the RGB encoder game controller.
//!
//! This crate holds everything that does not touch hardware, so the firmware
//! stays a thin layer of embassy drivers and the logic can be tested on host.
//!
//! # Overview
//!
//! - [`report`]: feature configuration, report layout and encoding ([`build_report`], [`scale`])
//! - [`descriptor`]: HID report descriptor generation matching the layout
//! - [`encoder`]: bounded rotary counter shared with interrupt context ([`RotaryEncoder`])
//! - [`color`]: channel scaling, HSL conversion, gamma ramp
//! - [`led`]: per-pixel animation engine with sections ([`LedEngine`])
//! - [`protocol`]: host command frames rewritten in place ([`dispatch`])
//! - [`transport`]: transport trait and command handler ([`CommandHandler`])
//! - [`input`] / [`output`] / [`bridge`]: input sampling to HID reports ([`ReportBridge`])
//!
//! # Example
//!
//! ```rust
//! use controller_core::{build_report, ControllerState, FeatureConfig, RotaryEncoder, Axis};
//!
//! let encoder = RotaryEncoder::new(-255, 255, 255);
//! let mut state = ControllerState::neutral();
//! state.set_axis(Axis::X, encoder.axis_value());
//!
//! let mut buf = [0u8; 2];
//! let len = build_report(&mut buf, &FeatureConfig::minimal(), &state).unwrap();
//! assert_eq!(&buf[..len], &32767i16.to_le_bytes());
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and command trace logging
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod bridge;
pub mod color;
pub mod descriptor;
pub mod encoder;
pub mod input;
pub mod led;
pub mod output;
pub mod protocol;
pub mod report;
pub mod transport;

#[cfg(test)]
mod test_util;

// Re-export main types at crate root
pub use bridge::{BridgeError, ReportBridge};
pub use color::Rgb;
pub use descriptor::{descriptor_len, report_descriptor, REPORT_ID};
pub use encoder::{RotaryEncoder, StepButtons};
pub use input::{InputError, InputSource};
pub use led::{Effect, LedEngine, LedError, LedValue, Section};
pub use output::{OutputError, ReportSink};
pub use protocol::{dispatch, CommandError, DeviceInfo, Outcome, FRAME_SIZE};
pub use report::{
    build_report, scale, Axis, AxisSet, ControllerState, FeatureConfig, Hat, ReportError,
    ReportLayout, SimulationAxis, SimulationSet, MAX_REPORT_LEN,
};
pub use transport::{Bootloader, CommandHandler, CommandTransport, TransportError};
