//! Command transports and the foreground command handler.

use core::future::Future;

use embassy_futures::select::{select, Either};

use crate::led::LedEngine;
use crate::protocol::{dispatch, DeviceInfo, Outcome, FRAME_SIZE};

/// Error type for transport operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// USB I/O error.
    Io,
    /// Host closed the interface or the port.
    Disconnected,
    /// Host sent more than one frame's worth of data.
    Overflow,
    /// Host did not collect the response before the deadline.
    Timeout,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "transport i/o error"),
            Self::Disconnected => write!(f, "transport disconnected"),
            Self::Overflow => write!(f, "frame overflow"),
            Self::Timeout => write!(f, "response not collected"),
        }
    }
}

/// Async trait for a channel that carries command frames.
///
/// Implemented by the vendor HID interface and the CDC serial port.
pub trait CommandTransport {
    /// Wait for the next frame. Returns the number of bytes written into
    /// `frame`.
    fn receive(
        &mut self,
        frame: &mut [u8; FRAME_SIZE],
    ) -> impl Future<Output = Result<usize, TransportError>>;

    /// Send a response frame back to the host.
    fn send(&mut self, frame: &[u8]) -> impl Future<Output = Result<(), TransportError>>;
}

/// Hand-off to the ROM bootloader. Never returns.
pub trait Bootloader {
    fn enter(&mut self) -> !;
}

/// Owns the LED engine and answers command frames from any transport.
pub struct CommandHandler<B, const N: usize, const S: usize> {
    leds: LedEngine<N, S>,
    info: DeviceInfo,
    bootloader: B,
}

impl<B: Bootloader, const N: usize, const S: usize> CommandHandler<B, N, S> {
    pub fn new(leds: LedEngine<N, S>, info: DeviceInfo, bootloader: B) -> Self {
        Self {
            leds,
            info,
            bootloader,
        }
    }

    /// Receive one frame from `transport`, dispatch it and send the response
    /// back on the same transport.
    ///
    /// Frames shorter than [`FRAME_SIZE`] are zero-padded before dispatch and
    /// the response is always a full frame. Empty reads are ignored.
    pub async fn serve_one<T: CommandTransport>(
        &mut self,
        transport: &mut T,
        deadline: impl Future<Output = ()>,
    ) -> Result<(), TransportError> {
        let mut frame = [0u8; FRAME_SIZE];
        let len = transport.receive(&mut frame).await?;
        if len == 0 {
            return Ok(());
        }
        self.respond(transport, &mut frame, deadline).await
    }

    /// Dispatch an already received frame and send the response on
    /// `transport`. Bytes past the received length must be zero.
    ///
    /// The command takes effect even if the host never collects the
    /// response: once `deadline` completes the reply is dropped and
    /// [`TransportError::Timeout`] is returned. A bootloader request is
    /// honored whether or not its echo went out.
    pub async fn respond<T: CommandTransport>(
        &mut self,
        transport: &mut T,
        frame: &mut [u8; FRAME_SIZE],
        deadline: impl Future<Output = ()>,
    ) -> Result<(), TransportError> {
        let outcome = dispatch(frame, &mut self.leds, &self.info);
        let sent = match select(transport.send(frame), deadline).await {
            Either::First(sent) => sent,
            Either::Second(()) => Err(TransportError::Timeout),
        };

        if outcome == Outcome::EnterBootloader {
            #[cfg(feature = "defmt")]
            defmt::info!("entering bootloader");
            self.bootloader.enter();
        }
        sent
    }

    /// Advance every LED effect by one animation tick.
    pub fn tick(&mut self, t: u32) {
        self.leds.tick(t);
    }

    pub fn leds(&self) -> &LedEngine<N, S> {
        &self.leds
    }
}
