pub mod affinity;
pub mod engine;
pub mod error;
pub mod probe;

pub use affinity::AffinityGuard;
pub use engine::{probe_sequence, run, Report, Selector, PROBE_COUNT};
pub use error::{DumpError, Result};
pub use probe::{HardwareProbe, ProbeSource};
