//! # cpudump-raw
//!
//! Hardware definitions and probe primitives for the `cpudump` utility.
//!
//! This crate holds the fixed probe selector tables (which CPUID leaves and
//! model-specific registers the dump visits, and in what order) together with
//! the two low-level access paths:
//!
//! - [`cpuid`] executes the CPUID instruction directly via inline assembly.
//! - [`MsrDevice`] reads MSRs through `/dev/cpu/<cpu>/msr` (requires the `msr`
//!   kernel module and root or `CAP_SYS_RAWIO`).
//!
//! All interpretation of the returned register values is out of scope; the
//! crate deals in raw bits only.

pub mod cpuid;
pub mod msr;
pub mod tables;

// Re-export for convenience
pub use cpuid::{cpuid, CpuidResult};
pub use msr::{MsrDevice, MsrError, Result};
pub use tables::{MsrId, CPUID_LEAVES, MSR_PROBES};
