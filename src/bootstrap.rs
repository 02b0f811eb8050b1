//! Base system bootstrap: pacstrap, microcode detection, fstab generation.

use anyhow::{Context, Result};
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::cmd::{self, CommandSpec};
use crate::config::InstallConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuVendor {
    Intel,
    Amd,
    Other,
}

/// Parse a /proc/cpuinfo dump. Only the first vendor_id line matters.
pub fn detect_cpu_vendor(cpuinfo: &str) -> CpuVendor {
    for line in cpuinfo.lines() {
        if let Some(value) = line.strip_prefix("vendor_id") {
            let vendor = value.trim_start_matches([' ', '\t', ':']).trim();
            return match vendor {
                "GenuineIntel" => CpuVendor::Intel,
                "AuthenticAMD" => CpuVendor::Amd,
                _ => CpuVendor::Other,
            };
        }
    }
    CpuVendor::Other
}

pub fn microcode_package(vendor: CpuVendor) -> Option<&'static str> {
    match vendor {
        CpuVendor::Intel => Some("intel-ucode"),
        CpuVendor::Amd => Some("amd-ucode"),
        CpuVendor::Other => None,
    }
}

pub fn pacstrap_spec(cfg: &InstallConfig, microcode: Option<&str>) -> CommandSpec {
    let root = cfg.staging_root.display().to_string();
    let mut args = vec!["-K".to_string(), root];
    args.extend(cfg.packages.iter().cloned());
    if let Some(pkg) = microcode {
        args.push(pkg.to_string());
    }
    CommandSpec {
        program: "pacstrap".to_string(),
        args,
    }
}

/// Bootstrap packages into the staging root. Returns the microcode package
/// selected for this machine, which the boot entry later references.
pub fn run(cfg: &InstallConfig, dry_run: bool) -> Result<Option<&'static str>> {
    let cpuinfo = fs::read_to_string("/proc/cpuinfo").context("failed to read /proc/cpuinfo")?;
    let vendor = detect_cpu_vendor(&cpuinfo);
    let microcode = microcode_package(vendor);
    match microcode {
        Some(pkg) => log::info!("🧠 CPU vendor {vendor:?}: adding {pkg}"),
        None => log::info!("🧠 CPU vendor {vendor:?}: no microcode package"),
    }

    log::info!("📦 pacstrap into {}", cfg.staging_root.display());
    cmd::run(&pacstrap_spec(cfg, microcode), dry_run)?;

    generate_fstab(&cfg.staging_root, dry_run)?;
    Ok(microcode)
}

/// genfstab -U output appended to the staged /etc/fstab.
pub fn generate_fstab(staging_root: &Path, dry_run: bool) -> Result<()> {
    if dry_run {
        log::info!("DRY RUN: genfstab -U {}", staging_root.display());
        return Ok(());
    }
    let table = cmd::output(&CommandSpec::new(
        "genfstab",
        &["-U", &staging_root.display().to_string()],
    ))?;
    let fstab = staging_root.join("etc/fstab");
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&fstab)
        .with_context(|| format!("failed to open {}", fstab.display()))?;
    writeln!(file, "{table}")?;
    log::info!("Wrote {}", fstab.display());
    Ok(())
}
