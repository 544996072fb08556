use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DumpError {
    #[error("write failed: {0}")]
    WriteFailed(#[from] io::Error),

    #[error("partial write: wrote {written} of {requested} bytes")]
    PartialWrite { written: usize, requested: usize },

    #[error("MSR probe failed: {0}")]
    Msr(#[from] cpudump_raw::MsrError),

    #[error("affinity operation failed: {0}")]
    Affinity(String),
}

pub type Result<T> = std::result::Result<T, DumpError>;
