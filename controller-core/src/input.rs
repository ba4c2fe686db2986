//! Input source trait and error types.

use crate::report::ControllerState;

/// Error type for input operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// Sensor or GPIO read failed.
    Io,
    /// Input hardware not present or not yet initialized.
    Disconnected,
}

impl core::fmt::Display for InputError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "input i/o error"),
            Self::Disconnected => write!(f, "input disconnected"),
        }
    }
}

/// Trait for controller input sources.
///
/// Sampling is synchronous: the foreground loop paces reports with its own
/// ticker, and every input on this controller is readable without waiting.
pub trait InputSource {
    /// Snapshot the current buttons, hats and axes.
    fn sample(&mut self) -> Result<ControllerState, InputError>;

    /// Check if the input hardware is ready.
    fn is_connected(&self) -> bool;
}
