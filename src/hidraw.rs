//! This backend talks to the meter through a Linux hidraw node

mod ioctl;

use std::{
    fs::OpenOptions,
    io,
    os::{
        fd::{AsRawFd, IntoRawFd, OwnedFd},
        unix::fs::OpenOptionsExt,
    },
    path::Path,
};

use nix::unistd::{close, read};

use crate::backend::RawDevice;
use self::ioctl::hidraw_ioc_set_feature;

/// An open hidraw node, e.g. `/dev/hidraw2`
#[derive(Debug)]
pub struct HidrawDevice {
    fd: OwnedFd,
}

impl HidrawDevice {
    /// Open `path` for reading and writing. Reads on the returned device block.
    pub fn open(path: &Path) -> io::Result<Self> {
        let fd: OwnedFd = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_CLOEXEC)
            .open(path)?
            .into();

        Ok(Self { fd })
    }
}

impl RawDevice for HidrawDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(read(self.fd.as_raw_fd(), buf)?)
    }

    fn send_feature_report(&mut self, data: &[u8]) -> io::Result<()> {
        // The ioctl is marked as read-write so it needs a mutable buffer even
        // though nothing should get written back
        let mut report = data.to_vec();
        unsafe { hidraw_ioc_set_feature(self.fd.as_raw_fd(), &mut report) }?;
        Ok(())
    }

    fn close(self) -> io::Result<()> {
        Ok(close(self.fd.into_raw_fd())?)
    }
}

#[cfg(test)]
mod test {
    use std::{fs, process};

    use super::*;

    #[test]
    fn test_open_missing_node() {
        let err = HidrawDevice::open(Path::new("/nonexistent/hidraw99")).unwrap_err();
        assert_eq!(io::ErrorKind::NotFound, err.kind());
    }

    #[test]
    fn test_feature_report_on_regular_file() {
        let path = std::env::temp_dir().join(format!("co2meter-hidraw-{}", process::id()));
        fs::write(&path, [0u8; 8]).unwrap();

        let mut dev = HidrawDevice::open(&path).unwrap();
        let err = dev.send_feature_report(&[0; 9]).unwrap_err();
        assert!(err.raw_os_error().is_some());

        let mut buf = [0u8; 8];
        assert_eq!(8, dev.read(&mut buf).unwrap());
        dev.close().unwrap();
        fs::remove_file(&path).unwrap();
    }
}
