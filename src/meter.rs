use std::{
    io, mem,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use tracing::{debug, info, trace};

use crate::{
    backend::RawDevice,
    frame::{Frame, RawFrame, FRAME_SIZE, UNLOCK_REPORT_LEN},
    measurement::{Assembler, Measurement},
    MeterError, MeterResult,
};

enum MeterState<D> {
    Closed,
    Open { path: PathBuf, device: D },
}

/// Access to one CO2 meter. Open it before reading.
///
/// All calls block on the device. The state lock is held for the whole of a
/// read, so a `close` from another thread waits until the pending read
/// returns. Nothing times out: a silent meter blocks its reader forever.
pub struct Meter<D> {
    state: Mutex<MeterState<D>>,
}

impl<D> Default for Meter<D> {
    fn default() -> Self {
        Self {
            state: Mutex::new(MeterState::Closed),
        }
    }
}

impl<D: RawDevice> Meter<D> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MeterState<D>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_open(&self) -> bool {
        matches!(*self.lock(), MeterState::Open { .. })
    }

    /// Path of the open device
    pub fn path(&self) -> Option<PathBuf> {
        match &*self.lock() {
            MeterState::Open { path, .. } => Some(path.clone()),
            MeterState::Closed => None,
        }
    }

    /// Take ownership of an already opened device and unlock streaming.
    ///
    /// If the handshake fails the meter is left open and the error returned;
    /// the caller still has to [`close`](Self::close) it.
    pub fn attach(&self, path: impl Into<PathBuf>, mut device: D) -> MeterResult<()> {
        let mut state = self.lock();
        if let MeterState::Open { path, .. } = &*state {
            return Err(MeterError::AlreadyOpen { path: path.clone() });
        }

        let path = path.into();
        info!(path = %path.display(), "device opened");
        let res = handshake(&mut device);
        *state = MeterState::Open { path, device };
        res
    }

    /// Read and decode a single frame, whatever its operation code.
    pub fn read_one(&self) -> MeterResult<Frame> {
        let mut state = self.lock();
        let MeterState::Open { path, device } = &mut *state else {
            return Err(MeterError::NotOpen);
        };

        let raw = read_frame(device, path.as_path())?;
        let frame = Frame::decode(&raw);
        trace!(code = frame.code, value = frame.value, "frame");
        Ok(frame)
    }

    /// Read frames until both a temperature and a CO2 value have arrived.
    ///
    /// Other frames are consumed and dropped. There is no bound on the number
    /// of frames this may take.
    pub fn read(&self) -> MeterResult<Measurement> {
        let mut asm = Assembler::new();
        loop {
            if let Some(m) = asm.feed(self.read_one()?) {
                return Ok(m);
            }
        }
    }

    /// Release the device. Closing a closed meter fails with
    /// [`MeterError::NotOpen`].
    pub fn close(&self) -> MeterResult<()> {
        let mut state = self.lock();
        match mem::replace(&mut *state, MeterState::Closed) {
            MeterState::Closed => Err(MeterError::NotOpen),
            MeterState::Open { path, device } => {
                info!(path = %path.display(), "closing device");
                device
                    .close()
                    .map_err(|source| MeterError::Close { path, source })
            }
        }
    }
}

#[cfg(target_os = "linux")]
impl Meter<crate::HidrawDevice> {
    /// Open the hidraw node at `path`, e.g. `/dev/hidraw2`, and unlock
    /// streaming.
    pub fn open(&self, path: impl AsRef<Path>) -> MeterResult<()> {
        let path = path.as_ref();
        let device = crate::HidrawDevice::open(path).map_err(|source| MeterError::Open {
            path: path.to_owned(),
            source,
        })?;
        self.attach(path, device)
    }
}

/// Send the unlock feature report that puts the meter into plain streaming
/// mode. Without it the meter never sends a frame.
fn handshake<D: RawDevice>(device: &mut D) -> MeterResult<()> {
    const REPORT_ID: u8 = 0x00;
    const KEY: [u8; UNLOCK_REPORT_LEN - 1] = [0; UNLOCK_REPORT_LEN - 1];

    let mut report = [0u8; UNLOCK_REPORT_LEN];
    report[0] = REPORT_ID;
    report[1..].copy_from_slice(&KEY);

    debug!("sending unlock feature report");
    device
        .send_feature_report(&report)
        .map_err(MeterError::Handshake)
}

fn read_frame<D: RawDevice>(device: &mut D, path: &Path) -> MeterResult<RawFrame> {
    let mut raw = [0u8; FRAME_SIZE];
    let read_err = |source: io::Error| MeterError::Read {
        path: path.to_owned(),
        source,
    };

    let n = device.read(&mut raw).map_err(read_err)?;
    if n != FRAME_SIZE {
        return Err(read_err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("short read: {n}/{FRAME_SIZE} bytes"),
        )));
    }

    Ok(raw)
}
