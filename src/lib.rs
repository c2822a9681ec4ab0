//! Reader for the USB CO2 meters sold as "KIT MT 8057", "AIRCO2NTROL" and
//! similar ZyAura based devices.
//!
//! On Linux the meter shows up as a hidraw node. Once a zeroed feature report
//! unlocks it, the meter streams 8 byte frames, each carrying an operation
//! code and a 16 bit value. [`Meter::read_one`] hands back every frame as it
//! arrives; [`Meter::read`] waits until both a temperature and a CO2 value
//! have been seen.
//!
//! ```no_run
//! # fn main() -> co2meter::MeterResult<()> {
//! let meter = co2meter::HidrawMeter::new();
//! meter.open("/dev/hidraw2")?;
//! let m = meter.read()?;
//! println!("{} °C, {} ppm", m.temperature, m.co2);
//! meter.close()
//! # }
//! ```
//!
//! Other platforms, or devices reached some other way, can plug in through
//! the [`RawDevice`] trait and [`Meter::attach`].

mod backend;
mod error;
pub mod frame;
mod measurement;
mod meter;

pub use backend::RawDevice;
pub use error::{MeterError, MeterResult};
pub use frame::{Frame, Operation};
pub use measurement::{convert_temperature, Assembler, Measurement};
pub use meter::Meter;

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        pub mod discover;
        mod hidraw;

        pub use hidraw::HidrawDevice;

        /// A [`Meter`] on a Linux hidraw node
        pub type HidrawMeter = Meter<HidrawDevice>;
    }
}
