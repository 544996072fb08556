use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use cpudump::{engine, AffinityGuard, HardwareProbe, Report};

#[derive(Parser, Debug)]
#[command(name = "cpudump")]
#[command(about = "Dump raw CPUID leaves and selected MSRs to a text file")]
struct Args {
    #[arg(
        short,
        long,
        default_value = "cpuid.txt",
        help = "Output file (created or truncated)"
    )]
    output: PathBuf,

    #[arg(
        long,
        default_value_t = 0,
        help = "CPU to probe; the whole run is pinned to it"
    )]
    cpu: u32,

    #[arg(short, long, help = "Enable verbose logging (shows every record)")]
    verbose: bool,
}

fn check_msr_device(cpu: u32) {
    let path = format!("/dev/cpu/{cpu}/msr");
    if std::fs::metadata(&path).is_err() {
        tracing::warn!(
            "{path} is not present; the msr kernel module may not be loaded (run: modprobe msr)"
        );
    } else if let Err(e) = File::open(&path) {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            tracing::warn!("permission denied on {path}; root or CAP_SYS_RAWIO is required");
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    check_msr_device(args.cpu);

    // Pin before anything probes so CPUID and the MSR reads observe the same
    // CPU; restored on exit by the guard.
    let _affinity = AffinityGuard::new(args.cpu)
        .with_context(|| format!("failed to pin to CPU {}", args.cpu))?;

    let mut probes = HardwareProbe::open(args.cpu)
        .with_context(|| format!("failed to open MSR device for CPU {}", args.cpu))?;
    let mut sink = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    tracing::info!("dumping CPUID results to {}", args.output.display());

    match engine::run(&mut probes, &mut sink) {
        Report::Completed { records } => {
            tracing::info!("wrote {records} records to {}", args.output.display());
            Ok(())
        }
        Report::Failed {
            index,
            selector,
            source,
        } => {
            tracing::error!("dump failed at probe {index} ({selector}): {source}");
            std::process::exit(1);
        }
    }
}
