//! MSR (Model-Specific Register) read primitives.
//!
//! Access goes through `/dev/cpu/<cpu>/msr`: seek to the register address,
//! read eight bytes. The device is read-only here; cpudump never writes MSRs.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

pub type Result<T> = std::result::Result<T, MsrError>;

/// Errors that can occur during MSR operations
#[derive(Debug, thiserror::Error)]
pub enum MsrError {
    #[error("Failed to open MSR device for CPU {cpu}: {source}")]
    OpenFailed { cpu: u32, source: std::io::Error },

    #[error("Failed to seek to MSR 0x{msr:X} on CPU {cpu}: {source}")]
    SeekFailed {
        cpu: u32,
        msr: u32,
        source: std::io::Error,
    },

    #[error("Failed to read MSR 0x{msr:X} on CPU {cpu}: {source}")]
    ReadFailed {
        cpu: u32,
        msr: u32,
        source: std::io::Error,
    },
}

/// An open handle to one CPU's MSR device.
///
/// Opening can fail (missing `msr` module, insufficient privileges) and is
/// expected to be done once, before any probing starts. Reads of registers the
/// processor does not implement fail with `EIO`; the default probe tables only
/// list registers known to be safe, so a read failure is surfaced rather than
/// recovered from.
#[derive(Debug)]
pub struct MsrDevice {
    file: File,
    cpu: u32,
}

impl MsrDevice {
    /// Open `/dev/cpu/<cpu>/msr` for reading.
    pub fn open(cpu: u32) -> Result<Self> {
        let path = format!("/dev/cpu/{cpu}/msr");
        let file = File::open(&path).map_err(|e| MsrError::OpenFailed { cpu, source: e })?;
        Ok(Self { file, cpu })
    }

    /// Read the 64-bit contents of the register at `msr`.
    pub fn read(&mut self, msr: u32) -> Result<u64> {
        self.file
            .seek(SeekFrom::Start(u64::from(msr)))
            .map_err(|e| MsrError::SeekFailed {
                cpu: self.cpu,
                msr,
                source: e,
            })?;

        let mut buffer = [0u8; 8];
        self.file
            .read_exact(&mut buffer)
            .map_err(|e| MsrError::ReadFailed {
                cpu: self.cpu,
                msr,
                source: e,
            })?;

        Ok(u64::from_le_bytes(buffer))
    }

    pub fn cpu(&self) -> u32 {
        self.cpu
    }
}
