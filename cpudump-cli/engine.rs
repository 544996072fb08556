//! The probe-and-record engine.
//!
//! [`run`] walks the fixed selector sequence, probes each selector, formats
//! one text record per probe, and appends it to the sink. The first I/O
//! failure of any kind halts the run; whatever was already written stays in
//! the sink, so a failed run still leaves a valid truncated dump behind.

use std::fmt;
use std::io::Write;

use cpudump_raw::tables::{MsrId, CPUID_LEAVES, MSR_PROBES};
use cpudump_raw::CpuidResult;

use crate::error::DumpError;
use crate::probe::ProbeSource;

/// Total number of records a complete run produces.
pub const PROBE_COUNT: usize = MSR_PROBES.len() + CPUID_LEAVES.len();

/// One entry in the fixed probe sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Msr(MsrId),
    Leaf(u32),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Msr(msr) => write!(f, "MSR {} (0x{:X})", msr.name, msr.addr),
            Selector::Leaf(leaf) => write!(f, "CPUID leaf 0x{leaf:X}"),
        }
    }
}

/// The fixed probe order: both MSRs first, then every CPUID leaf.
pub fn probe_sequence() -> impl Iterator<Item = Selector> {
    MSR_PROBES
        .into_iter()
        .map(Selector::Msr)
        .chain(CPUID_LEAVES.into_iter().map(Selector::Leaf))
}

/// Outcome of one full run.
#[derive(Debug)]
pub enum Report {
    Completed {
        records: usize,
    },
    Failed {
        /// 0-based position in the probe sequence where the run halted.
        index: usize,
        selector: Selector,
        source: DumpError,
    },
}

impl Report {
    pub fn is_success(&self) -> bool {
        matches!(self, Report::Completed { .. })
    }
}

/// Render one CPUID leaf record. Field widths are fixed; consumers parse this
/// byte-for-byte.
pub fn format_leaf_record(leaf: u32, regs: CpuidResult) -> String {
    format!(
        "MODE=0x{:08X}, EAX=0x{:08X}, EBX=0x{:08X}, ECX=0x{:08X}, EDX=0x{:08X}\n",
        leaf, regs.eax, regs.ebx, regs.ecx, regs.edx
    )
}

/// Render one MSR record, high half first, no separator and no trailing
/// newline. The caller is responsible for line termination.
pub fn format_register_record(name: &str, high: u32, low: u32) -> String {
    format!("{name}: 0x{high:08X}{low:08X}")
}

/// Probe every selector in order, appending one record per probe to `sink`.
///
/// Each record is written with a single `write` call and a short write
/// (including zero bytes) is treated exactly like a rejected write: the run
/// halts at that index with no retry. This is a scan, not a transaction, so
/// nothing already written is rolled back.
pub fn run<P: ProbeSource, W: Write>(probes: &mut P, sink: &mut W) -> Report {
    for (index, selector) in probe_sequence().enumerate() {
        let record = match selector {
            Selector::Msr(msr) => match probes.read_msr(msr.addr) {
                Ok(value) => {
                    let low = value as u32;
                    let high = (value >> 32) as u32;
                    let mut line = format_register_record(msr.name, high, low);
                    line.push('\n'); // keeps the output file line-oriented
                    line
                }
                Err(source) => {
                    return Report::Failed {
                        index,
                        selector,
                        source,
                    }
                }
            },
            Selector::Leaf(leaf) => format_leaf_record(leaf, probes.cpuid(leaf)),
        };

        tracing::debug!("{}", record.trim_end());

        if let Err(source) = write_record(sink, record.as_bytes()) {
            return Report::Failed {
                index,
                selector,
                source,
            };
        }
    }

    Report::Completed {
        records: PROBE_COUNT,
    }
}

fn write_record<W: Write>(sink: &mut W, bytes: &[u8]) -> Result<(), DumpError> {
    let written = sink.write(bytes).map_err(DumpError::WriteFailed)?;
    if written != bytes.len() {
        return Err(DumpError::PartialWrite {
            written,
            requested: bytes.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use std::io;

    /// Deterministic fake hardware: leaf 0 returns the recognizable
    /// 0xDEADBEEF pattern, other leaves derive registers from the leaf value,
    /// and MSR reads fold the address into both halves.
    struct StubProbe;

    impl ProbeSource for StubProbe {
        fn cpuid(&mut self, leaf: u32) -> CpuidResult {
            if leaf == 0 {
                CpuidResult {
                    eax: 0xDEADBEEF,
                    ebx: 0,
                    ecx: 0,
                    edx: 0,
                }
            } else {
                CpuidResult {
                    eax: leaf,
                    ebx: leaf.rotate_left(8),
                    ecx: leaf.rotate_left(16),
                    edx: leaf.rotate_left(24),
                }
            }
        }

        fn read_msr(&mut self, addr: u32) -> Result<u64> {
            Ok((u64::from(addr) << 32) | 0x1234_5678)
        }
    }

    /// Probe source whose MSR reads always fail.
    struct BrokenMsrProbe;

    impl ProbeSource for BrokenMsrProbe {
        fn cpuid(&mut self, leaf: u32) -> CpuidResult {
            StubProbe.cpuid(leaf)
        }

        fn read_msr(&mut self, addr: u32) -> Result<u64> {
            Err(cpudump_raw::MsrError::ReadFailed {
                cpu: 0,
                msr: addr,
                source: io::Error::from(io::ErrorKind::Other),
            }
            .into())
        }
    }

    /// Sink that accepts `ok_writes` whole writes, then rejects everything.
    struct FailAfter {
        buf: Vec<u8>,
        ok_writes: usize,
    }

    impl FailAfter {
        fn new(ok_writes: usize) -> Self {
            Self {
                buf: Vec::new(),
                ok_writes,
            }
        }
    }

    impl io::Write for FailAfter {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            if self.ok_writes == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "sink rejected write"));
            }
            self.ok_writes -= 1;
            self.buf.extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Sink that claims zero bytes written on every call.
    struct ShortWrite;

    impl io::Write for ShortWrite {
        fn write(&mut self, _bytes: &[u8]) -> io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn full_dump() -> Vec<u8> {
        let mut sink = Vec::new();
        let report = run(&mut StubProbe, &mut sink);
        assert!(report.is_success());
        sink
    }

    #[test]
    fn test_sequence_is_msrs_then_leaves() {
        let seq: Vec<Selector> = probe_sequence().collect();
        assert_eq!(seq.len(), PROBE_COUNT);
        assert_eq!(seq[0], Selector::Msr(MSR_PROBES[0]));
        assert_eq!(seq[1], Selector::Msr(MSR_PROBES[1]));
        for (i, &leaf) in CPUID_LEAVES.iter().enumerate() {
            assert_eq!(seq[2 + i], Selector::Leaf(leaf));
        }
    }

    #[test]
    fn test_run_emits_all_records_in_order() {
        let out = String::from_utf8(full_dump()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), PROBE_COUNT);
        assert!(lines[0].starts_with("IA32_PLATFORM_ID: 0x"));
        assert!(lines[1].starts_with("EBL_CR_POWERON: 0x"));
        for (i, &leaf) in CPUID_LEAVES.iter().enumerate() {
            let prefix = format!("MODE=0x{leaf:08X}, ");
            assert!(
                lines[2 + i].starts_with(&prefix),
                "line {} does not start with {prefix:?}: {:?}",
                2 + i,
                lines[2 + i]
            );
        }
        // every byte accounted for: no output without a terminating newline
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_leaf_record_layout() {
        let regs = CpuidResult {
            eax: 0x0000_0001,
            ebx: 0xABCD_EF01,
            ecx: 0,
            edx: 0xFFFF_FFFF,
        };
        assert_eq!(
            format_leaf_record(0x8000001F, regs),
            "MODE=0x8000001F, EAX=0x00000001, EBX=0xABCDEF01, ECX=0x00000000, EDX=0xFFFFFFFF\n"
        );
    }

    #[test]
    fn test_register_record_layout() {
        let rec = format_register_record("EBL_CR_POWERON", 0x00AB_CDEF, 0x0123_4567);
        assert_eq!(rec, "EBL_CR_POWERON: 0x00ABCDEF01234567");
        assert!(!rec.ends_with('\n'));
    }

    #[test]
    fn test_first_leaf_line_with_known_registers() {
        let out = String::from_utf8(full_dump()).unwrap();
        let first_leaf = out.lines().nth(MSR_PROBES.len()).unwrap();
        assert_eq!(
            first_leaf,
            "MODE=0x00000000, EAX=0xDEADBEEF, EBX=0x00000000, ECX=0x00000000, EDX=0x00000000"
        );
    }

    #[test]
    fn test_failure_at_index_k_keeps_k_records() {
        let complete = full_dump();
        for k in [0, 1, 2, 5, PROBE_COUNT - 1] {
            let mut sink = FailAfter::new(k);
            match run(&mut StubProbe, &mut sink) {
                Report::Failed { index, source, .. } => {
                    assert_eq!(index, k);
                    assert!(matches!(source, DumpError::WriteFailed(_)));
                }
                Report::Completed { .. } => panic!("run should have failed at {k}"),
            }
            let prior: Vec<&[u8]> = complete.split_inclusive(|&b| b == b'\n').collect();
            let expected: Vec<u8> = prior[..k].concat();
            assert_eq!(sink.buf, expected, "sink after failure at {k}");
        }
    }

    #[test]
    fn test_zero_byte_write_is_partial_write() {
        match run(&mut StubProbe, &mut ShortWrite) {
            Report::Failed {
                index,
                source: DumpError::PartialWrite { written, requested },
                ..
            } => {
                assert_eq!(index, 0);
                assert_eq!(written, 0);
                assert!(requested > 0);
            }
            other => panic!("expected partial write failure, got {other:?}"),
        }
    }

    #[test]
    fn test_msr_probe_failure_halts_before_writing() {
        let mut sink = Vec::new();
        match run(&mut BrokenMsrProbe, &mut sink) {
            Report::Failed { index, source, .. } => {
                assert_eq!(index, 0);
                assert!(matches!(source, DumpError::Msr(_)));
            }
            Report::Completed { .. } => panic!("run should have failed on the first MSR"),
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn test_runs_are_byte_identical() {
        assert_eq!(full_dump(), full_dump());
    }
}
