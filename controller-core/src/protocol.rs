//! Host command protocol.
//!
//! Every command is a fixed-size frame `[opcode, payload...]` that is rewritten
//! in place into its response. Failed commands replace the opcode with
//! [`ERROR_SENTINEL`]; everything else in the frame is echoed back.
//!
//! | Opcode | Command           | Request payload                   | Response                 |
//! |--------|-------------------|-----------------------------------|--------------------------|
//! | `0x01` | protocol version  | -                                 | `[1..3]` BE u16          |
//! | `0x02` | team number       | -                                 | `[1..5]` BE u32          |
//! | `0x03` | controller state  | reserved                          | echo                     |
//! | `0x04` | LED metadata      | `[1]` `0x01` count, `0x02` sections | `[2]` value            |
//! | `0x05` | get LED           | reserved                          | echo                     |
//! | `0x06` | set LED           | `[1]` mode, selector, kind, value | echo                     |
//! | `0xFE` | enter bootloader  | -                                 | echo, then reset         |
//!
//! Set LED modes and their selectors:
//!
//! | Mode   | Addressing | Selector bytes   |
//! |--------|------------|------------------|
//! | `0x01` | single     | index            |
//! | `0x02` | multiple   | start, end       |
//! | `0x03` | section    | section id       |
//! | `0x04` | all        | -                |
//!
//! Sub-selectors are read before any response byte is written, so the reply
//! may overwrite bytes the request already consumed.

use crate::led::{LedEngine, LedError, LedValue};

/// Version word reported by [`opcode::PROTOCOL_VERSION`].
pub const PROTOCOL_VERSION: u16 = 0x0100;

/// Size of a command frame on every transport.
pub const FRAME_SIZE: usize = 64;

/// Opcode written in place of the request opcode when a command fails.
pub const ERROR_SENTINEL: u8 = opcode::ERROR;

pub mod opcode {
    pub const PROTOCOL_VERSION: u8 = 0x01;
    pub const TEAM_NUMBER: u8 = 0x02;
    pub const CONTROLLER_STATE: u8 = 0x03;
    pub const LED_DATA: u8 = 0x04;
    pub const GET_LED: u8 = 0x05;
    pub const SET_LED: u8 = 0x06;
    pub const ENTER_BOOTLOADER: u8 = 0xFE;
    pub const ERROR: u8 = 0xFF;
}

/// Sub-selectors for [`opcode::LED_DATA`].
pub mod led_data {
    pub const LED_COUNT: u8 = 0x01;
    pub const SECTION_COUNT: u8 = 0x02;
}

/// Addressing modes for [`opcode::SET_LED`].
pub mod addressing {
    pub const SINGLE: u8 = 0x01;
    pub const MULTIPLE: u8 = 0x02;
    pub const SECTION: u8 = 0x03;
    pub const ALL: u8 = 0x04;
}

/// Static device metadata answered by queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceInfo {
    pub team_number: u32,
}

/// What the transport must do after sending the response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Send the frame back. Nothing else.
    Reply,
    /// Send the frame back, then hand off to the bootloader.
    EnterBootloader,
}

/// Reason a command was answered with [`ERROR_SENTINEL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Zero-length frame.
    Empty,
    UnknownOpcode(u8),
    UnknownSubcommand(u8),
    /// Frame too short for the command.
    Truncated,
    Led(LedError),
}

impl From<LedError> for CommandError {
    fn from(err: LedError) -> Self {
        CommandError::Led(err)
    }
}

impl core::fmt::Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty frame"),
            Self::UnknownOpcode(op) => write!(f, "unknown opcode {op:#04x}"),
            Self::UnknownSubcommand(sub) => write!(f, "unknown subcommand {sub:#04x}"),
            Self::Truncated => write!(f, "frame truncated"),
            Self::Led(err) => write!(f, "led: {err}"),
        }
    }
}

/// Execute the command in `frame` and rewrite it into the response.
///
/// Never fails: errors are reported to the host through the sentinel opcode.
pub fn dispatch<const N: usize, const S: usize>(
    frame: &mut [u8],
    leds: &mut LedEngine<N, S>,
    info: &DeviceInfo,
) -> Outcome {
    match execute(frame, leds, info) {
        Ok(outcome) => outcome,
        Err(_err) => {
            #[cfg(feature = "defmt")]
            defmt::debug!("command {=u8:#x} failed: {}", frame.first().copied().unwrap_or(0), _err);

            if let Some(op) = frame.first_mut() {
                *op = ERROR_SENTINEL;
            }
            Outcome::Reply
        }
    }
}

fn execute<const N: usize, const S: usize>(
    frame: &mut [u8],
    leds: &mut LedEngine<N, S>,
    info: &DeviceInfo,
) -> Result<Outcome, CommandError> {
    let (op, payload) = frame.split_first_mut().ok_or(CommandError::Empty)?;

    #[cfg(feature = "defmt")]
    defmt::trace!("command {=u8:#x}", *op);

    match *op {
        opcode::PROTOCOL_VERSION => write_at(payload, 0, &PROTOCOL_VERSION.to_be_bytes())?,
        opcode::TEAM_NUMBER => write_at(payload, 0, &info.team_number.to_be_bytes())?,
        // Reserved queries answer with the unchanged frame
        opcode::CONTROLLER_STATE | opcode::GET_LED => {}
        opcode::LED_DATA => {
            let value = match payload.first().copied() {
                Some(led_data::LED_COUNT) => count_byte(N),
                Some(led_data::SECTION_COUNT) => count_byte(S),
                Some(other) => return Err(CommandError::UnknownSubcommand(other)),
                None => return Err(CommandError::Truncated),
            };
            write_at(payload, 1, &[value])?;
        }
        opcode::SET_LED => set_led(payload, leds)?,
        opcode::ENTER_BOOTLOADER => return Ok(Outcome::EnterBootloader),
        other => return Err(CommandError::UnknownOpcode(other)),
    }

    Ok(Outcome::Reply)
}

fn set_led<const N: usize, const S: usize>(
    payload: &[u8],
    leds: &mut LedEngine<N, S>,
) -> Result<(), CommandError> {
    match payload {
        [addressing::SINGLE, index, kind, data @ ..] => {
            let value = LedValue::from_wire(*kind, data)?;
            let index = usize::from(*index);
            leds.fill_range(index, index, value)?;
        }
        [addressing::MULTIPLE, start, end, kind, data @ ..] => {
            let value = LedValue::from_wire(*kind, data)?;
            leds.fill_range(usize::from(*start), usize::from(*end), value)?;
        }
        [addressing::SECTION, id, kind, data @ ..] => {
            let value = LedValue::from_wire(*kind, data)?;
            leds.fill_section(usize::from(*id), value)?;
        }
        [addressing::ALL, kind, data @ ..] => {
            let value = LedValue::from_wire(*kind, data)?;
            leds.fill_all(value)?;
        }
        [addressing::SINGLE | addressing::MULTIPLE | addressing::SECTION | addressing::ALL, ..]
        | [] => return Err(CommandError::Truncated),
        [mode, ..] => return Err(CommandError::UnknownSubcommand(*mode)),
    }
    Ok(())
}

fn write_at(payload: &mut [u8], offset: usize, bytes: &[u8]) -> Result<(), CommandError> {
    payload
        .get_mut(offset..offset + bytes.len())
        .ok_or(CommandError::Truncated)?
        .copy_from_slice(bytes);
    Ok(())
}

fn count_byte(count: usize) -> u8 {
    u8::try_from(count).unwrap_or(u8::MAX)
}
