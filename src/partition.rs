//! GPT partitioning via sgdisk: one EFI system partition, one LVM partition
//! spanning the rest of the disk.

use anyhow::Result;

use crate::cmd::{self, CommandSpec};
use crate::config::InstallConfig;

pub fn zap_spec(disk: &str) -> CommandSpec {
    CommandSpec::new("sgdisk", &["--zap-all", disk])
}

pub fn efi_partition_spec(disk: &str, efi_size: &str) -> CommandSpec {
    CommandSpec::new(
        "sgdisk",
        &[
            "-n",
            &format!("1:0:+{efi_size}"),
            "-t",
            "1:ef00",
            "-c",
            "1:EFI",
            disk,
        ],
    )
}

/// Second partition takes everything after the ESP (end sector 0 = rest of disk).
pub fn lvm_partition_spec(disk: &str) -> CommandSpec {
    CommandSpec::new(
        "sgdisk",
        &["-n", "2:0:0", "-t", "2:8e00", "-c", "2:cryptlvm", disk],
    )
}

pub fn run(cfg: &InstallConfig, disk: &str, dry_run: bool) -> Result<()> {
    log::info!("📐 Partitioning {disk}: ESP {} + LVM remainder", cfg.efi_size);
    cmd::run(&zap_spec(disk), dry_run)?;
    cmd::run(&efi_partition_spec(disk, &cfg.efi_size), dry_run)?;
    cmd::run(&lvm_partition_spec(disk), dry_run)?;
    // Let udev settle the new partition nodes before they are used.
    cmd::run(&CommandSpec::new("partprobe", &[disk]), dry_run)?;
    Ok(())
}
