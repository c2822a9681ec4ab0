use std::path::PathBuf;

use clap::Parser;
use co2meter::{convert_temperature, Frame, Meter, MeterError, Operation, RawDevice};
use color_eyre::eyre::{eyre, Report, WrapErr};
use tracing::warn;

#[derive(Parser)]
#[command(name = "co2meter")]
#[command(about = "Read temperature and CO2 levels from a USB CO2 meter")]
struct Cli {
    /// hidraw node of the meter, such as /dev/hidraw2
    device: Option<PathBuf>,

    /// Print every decoded frame instead of complete measurements
    #[arg(long)]
    frames: bool,

    /// Stop after this many lines of output
    #[arg(short = 'n', long)]
    count: Option<u64>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "co2meter=info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let Cli {
        device,
        frames,
        count,
    } = Cli::parse();
    let device = match device {
        Some(path) => path,
        None => default_device()?,
    };

    run(device, frames, count)
}

#[cfg(all(feature = "discover", target_os = "linux"))]
fn default_device() -> color_eyre::Result<PathBuf> {
    co2meter::discover::find_meter()
        .wrap_err("udev lookup failed")?
        .ok_or_else(|| eyre!("no CO2 meter found, pass the hidraw node explicitly"))
}

#[cfg(not(all(feature = "discover", target_os = "linux")))]
fn default_device() -> color_eyre::Result<PathBuf> {
    Err(eyre!("no device given, pass the hidraw node such as /dev/hidraw2"))
}

/// Output line for one frame, `None` for codes without a gauge name
fn frame_line(frame: Frame) -> Option<String> {
    let op = frame.operation();
    let name = op.name()?;
    Some(match op {
        Operation::Temperature => format!("{name} {}", convert_temperature(frame.value)),
        _ => format!("{name} {}", frame.value),
    })
}

/// Release a meter whose open failed part way. The open error is kept as the
/// cause; a failure to close is only logged.
fn abandon<D: RawDevice>(meter: &Meter<D>, err: MeterError) -> Report {
    if meter.is_open() {
        if let Err(e) = meter.close() {
            warn!(error = %e, "could not close meter after failed open");
        }
    }
    Report::new(err)
}

#[cfg(target_os = "linux")]
fn run(device: PathBuf, frames: bool, count: Option<u64>) -> color_eyre::Result<()> {
    use co2meter::HidrawMeter;
    use tracing::info;

    let meter = HidrawMeter::new();
    if let Err(e) = meter.open(&device) {
        return Err(abandon(&meter, e))
            .wrap_err_with(|| format!("could not open '{}'", device.display()));
    }

    let mut printed = 0;
    let res = loop {
        if count.is_some_and(|n| printed >= n) {
            break Ok(());
        }

        if frames {
            let frame = match meter.read_one() {
                Ok(f) => f,
                Err(e) => break Err(e),
            };
            let Some(line) = frame_line(frame) else {
                warn!(code = %format!("{:#04x}", frame.code), value = frame.value, "unknown operation");
                continue;
            };
            println!("{line}");
        } else {
            let m = match meter.read() {
                Ok(m) => m,
                Err(e) => break Err(e),
            };
            info!(temperature = m.temperature, co2 = m.co2, "measurement");
            println!("{:.1} °C\t{} ppm", m.temperature, m.co2);
        }
        printed += 1;
    };

    let closed = meter.close();
    res.wrap_err("reading from the meter failed")?;
    Ok(closed?)
}

#[cfg(not(target_os = "linux"))]
fn run(device: PathBuf, _frames: bool, _count: Option<u64>) -> color_eyre::Result<()> {
    Err(eyre!(
        "'{}': hidraw devices are only supported on Linux",
        device.display()
    ))
}

#[cfg(test)]
mod test {
    use std::io;

    use super::*;

    struct StuckDevice;

    impl RawDevice for StuckDevice {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::ErrorKind::WouldBlock.into())
        }

        fn send_feature_report(&mut self, _data: &[u8]) -> io::Result<()> {
            Err(io::Error::from_raw_os_error(libc::EPIPE))
        }

        fn close(self) -> io::Result<()> {
            Err(io::Error::from_raw_os_error(libc::EBADF))
        }
    }

    #[test]
    fn test_cli_args() {
        let cli = Cli::try_parse_from(["co2meter", "/dev/hidraw2", "--frames", "-n", "3"]).unwrap();
        assert_eq!(Some(PathBuf::from("/dev/hidraw2")), cli.device);
        assert!(cli.frames);
        assert_eq!(Some(3), cli.count);

        let cli = Cli::try_parse_from(["co2meter"]).unwrap();
        assert_eq!(None, cli.device);
        assert!(!cli.frames);
    }

    #[test]
    fn test_abandon_keeps_handshake_error() {
        let meter = Meter::new();
        let err = meter.attach("/dev/hidraw-test", StuckDevice).unwrap_err();

        let report = abandon(&meter, err);
        assert!(!meter.is_open());
        match report.downcast_ref::<MeterError>() {
            Some(e @ MeterError::Handshake(_)) => assert_eq!(Some(libc::EPIPE), e.raw_os_error()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_frame_lines() {
        assert_eq!(
            Some("meter_temperature_celsius 1.6".to_string()),
            frame_line(Frame {
                code: 0x42,
                value: 4396
            })
        );
        assert_eq!(
            Some("meter_co2_ppm 612".to_string()),
            frame_line(Frame {
                code: 0x50,
                value: 612
            })
        );
        assert_eq!(
            Some("meter_unknown_6d 2202".to_string()),
            frame_line(Frame {
                code: 0x6d,
                value: 2202
            })
        );
        assert_eq!(None, frame_line(Frame { code: 0x99, value: 1 }));
    }
}
