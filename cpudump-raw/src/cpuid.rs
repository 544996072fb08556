//! CPUID instruction wrapper.

/// Raw register contents returned by one CPUID invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuidResult {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
}

/// Execute CPUID for the given leaf and sub-leaf and capture all four result
/// registers.
///
/// The instruction itself cannot fault for any leaf value; unsupported leaves
/// simply return whatever the highest supported leaf reports. The inline
/// assembly is the only unsafe code in the workspace: it clobbers exactly the
/// four CPUID registers and restores `rbx`, which LLVM reserves.
#[cfg(target_arch = "x86_64")]
pub fn cpuid(leaf: u32, subleaf: u32) -> CpuidResult {
    let mut ebx: u32;
    let mut edx: u32;
    let mut eax = leaf;
    let mut ecx = subleaf;

    unsafe {
        std::arch::asm!(
            "mov {0:r}, rbx",
            "cpuid",
            "xchg {0:r}, rbx",
            out(reg) ebx,
            inout("eax") eax,
            inout("ecx") ecx,
            out("edx") edx,
            options(nostack, preserves_flags)
        );
    }

    CpuidResult { eax, ebx, ecx, edx }
}

/// Stub for non-x86_64 hosts so the workspace still builds and the engine
/// tests (which never touch real hardware) can run anywhere.
#[cfg(not(target_arch = "x86_64"))]
pub fn cpuid(_leaf: u32, _subleaf: u32) -> CpuidResult {
    CpuidResult {
        eax: 0,
        ebx: 0,
        ecx: 0,
        edx: 0,
    }
}
