use cpudump_raw::{cpuid, CpuidResult, MsrDevice};

use crate::error::Result;

/// Source of raw probe results.
///
/// The engine only talks to hardware through this seam, so tests substitute a
/// deterministic stub. Leaf probes cannot fail; MSR reads can (the kernel
/// rejects registers the processor does not implement).
pub trait ProbeSource {
    /// Execute CPUID for `leaf`, sub-leaf 0.
    fn cpuid(&mut self, leaf: u32) -> CpuidResult;

    /// Read the 64-bit contents of a model-specific register.
    fn read_msr(&mut self, addr: u32) -> Result<u64>;
}

/// Probes the live CPU: CPUID executes directly, MSR reads go through the
/// `/dev/cpu/<cpu>/msr` device opened at construction.
pub struct HardwareProbe {
    msr: MsrDevice,
}

impl HardwareProbe {
    /// Open the MSR device for `cpu`. Fails up front (missing `msr` module,
    /// insufficient privileges) so a run never starts half-capable.
    pub fn open(cpu: u32) -> Result<Self> {
        Ok(Self {
            msr: MsrDevice::open(cpu)?,
        })
    }
}

impl ProbeSource for HardwareProbe {
    fn cpuid(&mut self, leaf: u32) -> CpuidResult {
        cpuid(leaf, 0)
    }

    fn read_msr(&mut self, addr: u32) -> Result<u64> {
        Ok(self.msr.read(addr)?)
    }
}
