//! The blocking device operations the meter protocol is built on

use std::io;

/// Capability interface over an opened meter resource.
///
/// [`crate::HidrawDevice`] implements it on top of a Linux hidraw node.
pub trait RawDevice {
    /// One blocking read request into `buf`, returning the number of bytes
    /// read. The caller decides what a short read means.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Send a feature report. The first byte of `data` is the report id.
    fn send_feature_report(&mut self, data: &[u8]) -> io::Result<()>;

    /// Release the resource.
    fn close(self) -> io::Result<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::{
        collections::VecDeque,
        io,
        sync::{Arc, Mutex},
    };

    use super::RawDevice;

    /// One scripted response to a read request
    pub enum Step {
        Data(Vec<u8>),
        Fail(io::ErrorKind),
    }

    /// What the device saw, shared with the test after the device is moved
    #[derive(Default)]
    pub struct Log {
        pub feature_reports: Vec<Vec<u8>>,
        pub closed: bool,
    }

    /// Fake meter replaying a fixed sequence of reads
    pub struct ScriptedDevice {
        steps: VecDeque<Step>,
        handshake_errno: Option<i32>,
        log: Arc<Mutex<Log>>,
    }

    impl ScriptedDevice {
        pub fn new(steps: impl IntoIterator<Item = Step>) -> (Self, Arc<Mutex<Log>>) {
            let log = Arc::new(Mutex::new(Log::default()));
            let dev = Self {
                steps: steps.into_iter().collect(),
                handshake_errno: None,
                log: log.clone(),
            };
            (dev, log)
        }

        pub fn frames(frames: &[[u8; 8]]) -> (Self, Arc<Mutex<Log>>) {
            Self::new(frames.iter().map(|f| Step::Data(f.to_vec())))
        }

        pub fn failing_handshake(mut self, errno: i32) -> Self {
            self.handshake_errno = Some(errno);
            self
        }
    }

    impl RawDevice for ScriptedDevice {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.steps.pop_front() {
                Some(Step::Data(data)) => {
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    Ok(n)
                }
                Some(Step::Fail(kind)) => Err(kind.into()),
                None => Err(io::ErrorKind::UnexpectedEof.into()),
            }
        }

        fn send_feature_report(&mut self, data: &[u8]) -> io::Result<()> {
            self.log.lock().unwrap().feature_reports.push(data.to_vec());
            match self.handshake_errno {
                Some(errno) => Err(io::Error::from_raw_os_error(errno)),
                None => Ok(()),
            }
        }

        fn close(self) -> io::Result<()> {
            self.log.lock().unwrap().closed = true;
            Ok(())
        }
    }
}
