use crate::frame::{Frame, Operation};

/// Temperature and CO2 concentration read from the meter.
///
/// A zero field means the value has not been received yet. A true reading of
/// 0 ppm or exactly 0.0 °C can't be told apart from a missing one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurement {
    /// Degrees Celsius, one decimal place
    pub temperature: f64,
    /// Parts per million
    pub co2: u16,
}

impl Measurement {
    pub fn is_complete(&self) -> bool {
        self.co2 != 0 && self.temperature != 0.0
    }
}

/// Convert the meter's 1/16 Kelvin fixed point value to Celsius, rounded to
/// one decimal with halves away from zero.
pub fn convert_temperature(raw: u16) -> f64 {
    ((f64::from(raw) / 16.0 - 273.15) * 10.0).round() / 10.0
}

/// Collects temperature and CO2 frames until both values are known
#[derive(Debug, Default)]
pub struct Assembler {
    current: Measurement,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The values gathered so far
    pub fn current(&self) -> Measurement {
        self.current
    }

    /// Feed one frame. Returns the measurement once both fields are non-zero.
    pub fn feed(&mut self, frame: Frame) -> Option<Measurement> {
        match frame.operation() {
            Operation::Temperature => self.current.temperature = convert_temperature(frame.value),
            Operation::Co2 => self.current.co2 = frame.value,
            Operation::Diagnostic(_) | Operation::Unrecognized(_) => {}
        }

        if self.current.is_complete() {
            Some(self.current)
        } else {
            None
        }
    }
}
