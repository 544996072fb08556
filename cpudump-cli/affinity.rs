use nix::sched::{sched_getaffinity, sched_setaffinity, CpuSet};
use nix::unistd::Pid;

use crate::error::{DumpError, Result};

/// Pins the calling thread to a single CPU for its lifetime and restores the
/// previous affinity mask on drop. CPUID executes on whichever CPU the thread
/// happens to run on, so the whole dump runs under one guard to keep every
/// probe on the CPU the MSR reads target.
pub struct AffinityGuard {
    old_affinity: CpuSet,
}

impl AffinityGuard {
    pub fn new(cpu: u32) -> Result<Self> {
        let old_affinity = sched_getaffinity(Pid::from_raw(0))
            .map_err(|e| DumpError::Affinity(format!("Failed to get affinity: {e}")))?;

        let mut new_affinity = CpuSet::new();
        new_affinity
            .set(cpu as usize)
            .map_err(|e| DumpError::Affinity(format!("Failed to set CPU {cpu} in set: {e}")))?;

        sched_setaffinity(Pid::from_raw(0), &new_affinity)
            .map_err(|e| DumpError::Affinity(format!("Failed to set affinity to CPU {cpu}: {e}")))?;

        Ok(Self { old_affinity })
    }
}

impl Drop for AffinityGuard {
    fn drop(&mut self) {
        let _ = sched_setaffinity(Pid::from_raw(0), &self.old_affinity);
    }
}
