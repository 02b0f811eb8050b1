//! Staging mounts. Mount order matters: root first, then boot inside it.

use anyhow::{Context, Result};
use nix::mount::{mount as nix_mount, MsFlags};
use std::fs;
use std::path::Path;

use crate::config::InstallConfig;

pub fn mount_device(device: &str, target: &Path, fstype: &str, dry_run: bool) -> Result<()> {
    if dry_run {
        log::info!("DRY RUN: mount -t {fstype} {device} {}", target.display());
        return Ok(());
    }
    nix_mount(
        Some(device),
        target,
        Some(fstype),
        MsFlags::empty(),
        None::<&str>,
    )
    .with_context(|| format!("failed to mount {device} on {}", target.display()))?;
    Ok(())
}

pub fn run(cfg: &InstallConfig, boot_partition: &str, dry_run: bool) -> Result<()> {
    let root = &cfg.staging_root;
    log::info!("📂 Mounting {} at {}", cfg.lv_device(), root.display());
    if !dry_run {
        fs::create_dir_all(root)
            .with_context(|| format!("failed to create {}", root.display()))?;
    }
    mount_device(&cfg.lv_device(), root, "ext4", dry_run)?;

    let boot = root.join("boot");
    if !dry_run && !boot.exists() {
        fs::create_dir(&boot).with_context(|| format!("failed to create {}", boot.display()))?;
    }
    log::info!("📂 Mounting {boot_partition} at {}", boot.display());
    mount_device(boot_partition, &boot, "vfat", dry_run)?;
    Ok(())
}
