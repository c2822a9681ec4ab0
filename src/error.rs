use std::{io, path::PathBuf};

pub type MeterResult<T> = Result<T, MeterError>;

#[derive(Debug, thiserror::Error)]
pub enum MeterError {
    #[error("failed to open '{}': {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("streaming handshake failed: {0}")]
    Handshake(io::Error),
    #[error("could not read from '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to close '{}': {source}", .path.display())]
    Close { path: PathBuf, source: io::Error },
    #[error("device needs to be opened")]
    NotOpen,
    #[error("device is already open at '{}'", .path.display())]
    AlreadyOpen { path: PathBuf },
}

impl MeterError {
    /// The OS error code behind a failure, if there is one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            MeterError::Open { source, .. }
            | MeterError::Read { source, .. }
            | MeterError::Close { source, .. } => source.raw_os_error(),
            MeterError::Handshake(e) => e.raw_os_error(),
            MeterError::NotOpen | MeterError::AlreadyOpen { .. } => None,
        }
    }
}
