//! Wire format of the frames the meter streams once unlocked
//!
//! Every read returns 8 bytes:
//!
//! | offset | meaning                      |
//! |--------|------------------------------|
//! | 0      | operation code               |
//! | 1..=2  | value, big endian `u16`      |
//! | 3      | checksum                     |
//! | 4      | terminator, `0x0D`           |
//! | 5..=7  | reserved, zero               |
//!
//! Only the first three bytes are interpreted. The checksum, terminator and
//! reserved bytes are never checked, so frames are not rejected on them.

use std::fmt;

pub const FRAME_SIZE: usize = 8;

pub type RawFrame = [u8; FRAME_SIZE];

pub const CODE_TEMPERATURE: u8 = 0x42;
pub const CODE_CO2: u8 = 0x50;

/// Codes the meter is known to emit whose values have no known meaning.
pub const DIAGNOSTIC_CODES: [u8; 9] = [0x41, 0x43, 0x4f, 0x52, 0x56, 0x57, 0x6d, 0x6e, 0x71];

/// Length of the unlock feature report: report id plus an 8 byte key.
pub const UNLOCK_REPORT_LEN: usize = 1 + 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Temperature,
    Co2,
    Diagnostic(u8),
    Unrecognized(u8),
}

impl Operation {
    pub fn from_code(code: u8) -> Self {
        match code {
            CODE_TEMPERATURE => Operation::Temperature,
            CODE_CO2 => Operation::Co2,
            c if DIAGNOSTIC_CODES.contains(&c) => Operation::Diagnostic(c),
            c => Operation::Unrecognized(c),
        }
    }

    pub fn code(&self) -> u8 {
        match *self {
            Operation::Temperature => CODE_TEMPERATURE,
            Operation::Co2 => CODE_CO2,
            Operation::Diagnostic(c) | Operation::Unrecognized(c) => c,
        }
    }

    /// Gauge name consumers use to report this operation's value.
    ///
    /// Returns `None` for codes outside the known set; those are logged and
    /// skipped by the reporting side rather than treated as errors.
    pub fn name(&self) -> Option<String> {
        match *self {
            Operation::Temperature => Some("meter_temperature_celsius".into()),
            Operation::Co2 => Some("meter_co2_ppm".into()),
            Operation::Diagnostic(c) => Some(format!("meter_unknown_{c:02x}")),
            Operation::Unrecognized(_) => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Temperature => write!(f, "temperature"),
            Operation::Co2 => write!(f, "co2"),
            Operation::Diagnostic(c) => write!(f, "diagnostic {c:#04x}"),
            Operation::Unrecognized(c) => write!(f, "unrecognized {c:#04x}"),
        }
    }
}

/// A decoded frame: the operation code and its raw value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    pub code: u8,
    pub value: u16,
}

impl Frame {
    pub fn decode(raw: &RawFrame) -> Self {
        Frame {
            code: raw[0],
            value: u16::from_be_bytes([raw[1], raw[2]]),
        }
    }

    pub fn operation(&self) -> Operation {
        Operation::from_code(self.code)
    }
}
