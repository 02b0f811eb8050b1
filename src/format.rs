//! Filesystem creation. The root filesystem is deliberately shrunk below the
//! logical volume so later snapshot space never competes with the fs.

use anyhow::{Context, Result};

use crate::cmd::{self, CommandSpec};
use crate::config::InstallConfig;

pub fn mkfs_boot_spec(partition: &str) -> CommandSpec {
    CommandSpec::new("mkfs.fat", &["-F32", partition])
}

pub fn mkfs_root_spec(device: &str) -> CommandSpec {
    CommandSpec::new("mkfs.ext4", &["-F", device])
}

/// resize2fs target: device size minus the configured reserve.
pub fn shrink_target_mib(device_bytes: u64, reserve_mib: u64) -> u64 {
    (device_bytes / (1024 * 1024)).saturating_sub(reserve_mib)
}

pub fn shrink_spec(device: &str, target_mib: u64) -> CommandSpec {
    CommandSpec::new("resize2fs", &[device, &format!("{target_mib}M")])
}

pub fn run(cfg: &InstallConfig, boot_partition: &str, dry_run: bool) -> Result<()> {
    let root_dev = cfg.lv_device();
    log::info!("🧪 Formatting: {boot_partition} (FAT32), {root_dev} (ext4)");
    cmd::run(&mkfs_boot_spec(boot_partition), dry_run)?;
    cmd::run(&mkfs_root_spec(&root_dev), dry_run)?;

    if dry_run {
        log::info!(
            "DRY RUN: would shrink {root_dev} by {} MiB reserve",
            cfg.root_reserve_mib
        );
        return Ok(());
    }

    let size_raw = cmd::output(&CommandSpec::new("blockdev", &["--getsize64", &root_dev]))?;
    let device_bytes: u64 = size_raw
        .parse()
        .with_context(|| format!("unexpected blockdev output: {size_raw:?}"))?;
    let target = shrink_target_mib(device_bytes, cfg.root_reserve_mib);
    log::info!(
        "Reserving {} MiB: shrinking {root_dev} to {target} MiB",
        cfg.root_reserve_mib
    );
    // resize2fs refuses to shrink without a prior clean check.
    cmd::run(&CommandSpec::new("e2fsck", &["-f", "-y", &root_dev]), dry_run)?;
    cmd::run(&shrink_spec(&root_dev, target), dry_run)?;
    Ok(())
}
