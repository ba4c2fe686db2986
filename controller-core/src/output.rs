//! Report sink trait and error types.

use core::future::Future;

/// Error type for output operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// USB/communication I/O error.
    Io,
    /// Device not ready (e.g., USB not enumerated).
    NotReady,
    /// Report larger than the endpoint accepts.
    TooLarge,
}

impl core::fmt::Display for OutputError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "output i/o error"),
            Self::NotReady => write!(f, "output not ready"),
            Self::TooLarge => write!(f, "report too large"),
        }
    }
}

/// Async trait for input report destinations.
///
/// The sink receives the encoded report body; any report id framing is the
/// sink's concern.
pub trait ReportSink {
    /// Send one encoded report.
    ///
    /// May block until the previous report has been sent.
    fn send(&mut self, report: &[u8]) -> impl Future<Output = Result<(), OutputError>>;

    /// Check if the output is ready to accept data.
    fn is_ready(&self) -> bool;
}
