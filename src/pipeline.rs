//! The install pipeline: nine stages, forward-only, first failure aborts
//! the whole run. There is no rollback; a partial run leaves the disk in a
//! partially provisioned state that needs manual cleanup.

use anyhow::Result;
use std::fmt;
use std::io::{self, BufRead};

use crate::config::InstallConfig;
use crate::errors::InstallerError;
use crate::{bootstrap, chroot, crypt, disk, format, lvm, mount, partition, preflight};

#[derive(Debug, Clone)]
pub struct StagePlan {
    pub name: &'static str,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub stages: Vec<StagePlan>,
}

impl InstallPlan {
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec!["Execution plan:".to_string()];
        for (idx, stage) in self.stages.iter().enumerate() {
            lines.push(format!(
                "{:02}. {} — {}",
                idx + 1,
                stage.name,
                stage.description
            ));
        }
        lines
    }
}

impl fmt::Display for InstallPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.summary_lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

pub fn build_plan(cfg: &InstallConfig) -> InstallPlan {
    let disk = cfg.disk.as_deref().unwrap_or("<prompted>").to_string();
    let stages = vec![
        StagePlan {
            name: "Preflight",
            description: "Check required external tools".to_string(),
        },
        StagePlan {
            name: "Disk selection",
            description: format!("Target: {disk}"),
        },
        StagePlan {
            name: "Partitioning",
            description: format!("GPT: ESP {} + LVM remainder", cfg.efi_size),
        },
        StagePlan {
            name: "Encryption",
            description: format!("LUKS2 -> {}", cfg.crypt_device()),
        },
        StagePlan {
            name: "LVM",
            description: format!("{} spanning 100% of free space", cfg.lv_device()),
        },
        StagePlan {
            name: "Formatting",
            description: format!(
                "FAT32 boot, ext4 root minus {} MiB reserve",
                cfg.root_reserve_mib
            ),
        },
        StagePlan {
            name: "Mounting",
            description: format!("Staging root {}", cfg.staging_root.display()),
        },
        StagePlan {
            name: "Base install",
            description: format!("pacstrap {} packages + microcode + fstab", cfg.packages.len()),
        },
        StagePlan {
            name: "System configuration",
            description: format!(
                "locale, hostname {}, initramfs, systemd-boot, users",
                cfg.hostname
            ),
        },
    ];
    InstallPlan { stages }
}

/// The user must type the disk name back before anything destructive runs.
pub fn confirm_gate<R: BufRead>(input: &mut R, disk: &str, yes_i_know: bool) -> Result<()> {
    if yes_i_know {
        log::warn!("⚠️  --yes-i-know supplied. Skipping confirmation.");
        return Ok(());
    }
    println!();
    println!("⚠️  WARNING ⚠️");
    println!("You are about to ERASE {disk}");
    println!("This action is IRREVERSIBLE.");
    println!("Type the disk path ({disk}) to continue:");

    let mut line = String::new();
    input.read_line(&mut line)?;
    if line.trim() != disk {
        return Err(InstallerError::Aborted.into());
    }
    Ok(())
}

pub fn run(cfg: &InstallConfig, dry_run: bool, yes_i_know: bool) -> Result<()> {
    preflight::run()?;

    let stdin = io::stdin();
    let disk = match &cfg.disk {
        Some(disk) => {
            disk::validate_block_device(disk)?;
            disk.clone()
        }
        None => {
            disk::print_disks()?;
            disk::prompt_for_disk(&mut stdin.lock())?
        }
    };
    log::info!("🎯 Target disk: {disk}");

    confirm_gate(&mut stdin.lock(), &disk, yes_i_know)?;
    if dry_run {
        log::info!("🧪 Dry-run enabled — commands are logged, not executed.");
    }

    let boot_partition = disk::partition_path(&disk, 1);
    let luks_partition = disk::partition_path(&disk, 2);

    partition::run(cfg, &disk, dry_run)?;
    crypt::format_and_open(&luks_partition, &cfg.crypt_name, dry_run)?;
    lvm::run(cfg, dry_run)?;
    format::run(cfg, &boot_partition, dry_run)?;
    mount::run(cfg, &boot_partition, dry_run)?;
    let microcode = bootstrap::run(cfg, dry_run)?;

    let luks_uuid = if dry_run {
        "<luks-uuid>".to_string()
    } else {
        crypt::luks_uuid(&luks_partition)?
    };
    chroot::run(cfg, &luks_uuid, microcode, dry_run)?;

    finish(cfg);
    Ok(())
}

fn finish(cfg: &InstallConfig) {
    log::info!("✅ Installation complete.");
    println!();
    println!("Next steps:");
    println!("  umount -R {}", cfg.staging_root.display());
    println!("  reboot");
    println!("Remove the installation media before the machine comes back up.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn plan_lists_stages_in_pipeline_order() {
        let cfg = InstallConfig::default();
        let plan = build_plan(&cfg);
        let names: Vec<&str> = plan.stages.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "Preflight",
                "Disk selection",
                "Partitioning",
                "Encryption",
                "LVM",
                "Formatting",
                "Mounting",
                "Base install",
                "System configuration",
            ]
        );
    }

    #[test]
    fn confirm_gate_accepts_exact_disk() {
        let mut input = Cursor::new("/dev/sda\n");
        confirm_gate(&mut input, "/dev/sda", false).unwrap();
    }

    #[test]
    fn confirm_gate_rejects_mismatch() {
        let mut input = Cursor::new("/dev/sdb\n");
        assert!(confirm_gate(&mut input, "/dev/sda", false).is_err());
    }

    #[test]
    fn confirm_gate_bypassed_by_flag() {
        let mut input = Cursor::new("");
        confirm_gate(&mut input, "/dev/sda", true).unwrap();
    }
}
