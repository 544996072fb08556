//! Fixed probe selector tables.
//!
//! The dump always visits the same selectors in the same order: the two MSRs
//! first, then every CPUID leaf. Order is significant on the leaf side — leaf
//! 0x0 reports the maximum supported basic leaf and the vendor string, and
//! several later leaves are only meaningful once the earlier ones have been
//! captured — so consumers must not reorder these tables.

/// MSR addresses probed (or deliberately skipped) by the dump
pub mod msr {
    /// Platform identification register
    pub const IA32_PLATFORM_ID: u32 = 0x17;

    /// Processor hard power-on / boot configuration register
    pub const EBL_CR_POWERON: u32 = 0x2A;

    /// Miscellaneous feature enables. NOT in [`super::MSR_PROBES`]: reading it
    /// faults on some processor models, and the dump excludes it rather than
    /// carrying a recovery policy for a single register.
    pub const IA32_MISC_ENABLE: u32 = 0x1A0;
}

/// One model-specific register in the probe sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsrId {
    /// Name as it appears in the output record, e.g. `IA32_PLATFORM_ID`.
    pub name: &'static str,
    pub addr: u32,
}

/// The model-specific registers probed before the CPUID leaves.
pub const MSR_PROBES: [MsrId; 2] = [
    MsrId {
        name: "IA32_PLATFORM_ID",
        addr: msr::IA32_PLATFORM_ID,
    },
    MsrId {
        name: "EBL_CR_POWERON",
        addr: msr::EBL_CR_POWERON,
    },
];

/// Every CPUID leaf the dump captures, in output order: the basic leaves, the
/// hypervisor range (0x4000_00xx), the extended range (0x8000_00xx), and the
/// Centaur range (0xC000_00xx). Sub-leaf is always 0.
#[rustfmt::skip]
pub const CPUID_LEAVES: [u32; 34] = [
    0x0,        0x1,        0x2,        0x3,        0x4,        0x5,
    0x06,       0x07,       0x09,       0x0A,       0x0B,       0x1F,
    0x0D,       0x14,       0x40000000, 0x40000001, 0x80000000, 0x80000001,
    0x80000002, 0x80000003, 0x80000004, 0x80000005, 0x80000006, 0x80000007,
    0x80000008, 0x8000000A, 0x8000001D, 0x8000001E, 0xC0000000, 0xC0000001,
    0xC0000002, 0xC0000003, 0xC0000004, 0x8000001F,
];
