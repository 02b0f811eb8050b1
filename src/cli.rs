//! CLI argument parsing for cryptarch
//!
//! `install` is the whole pipeline; `plan` prints the stage list without
//! touching the disk; `preflight` only checks for required tools.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::InstallConfig;

#[derive(Parser)]
#[command(name = "cryptarch")]
#[command(about = "Arch Linux installer: LVM on LUKS2, systemd-boot")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log every external command instead of executing it
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check that every required external tool is installed
    Preflight,
    /// Print the execution plan and exit
    Plan(InstallArgs),
    /// Run the full installation pipeline (destructive)
    Install(InstallArgs),
}

#[derive(Args)]
pub struct InstallArgs {
    /// Target disk (e.g. /dev/sda); prompted for interactively if omitted
    #[arg(long)]
    pub disk: Option<String>,

    /// JSON profile seeding the install configuration
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// EFI system partition size (sgdisk suffix syntax, e.g. 512MiB)
    #[arg(long)]
    pub efi_size: Option<String>,

    /// Hostname for the installed system
    #[arg(long)]
    pub hostname: Option<String>,

    /// Primary user to create
    #[arg(long)]
    pub username: Option<String>,

    /// Timezone (e.g. Europe/Berlin)
    #[arg(long)]
    pub timezone: Option<String>,

    /// Skip the type-the-disk-name confirmation. This erases the disk!
    #[arg(long)]
    pub yes_i_know: bool,
}

impl InstallArgs {
    /// Profile file first, CLI flags override.
    pub fn to_config(&self) -> anyhow::Result<InstallConfig> {
        let mut cfg = match &self.profile {
            Some(path) => InstallConfig::from_profile(path)?,
            None => InstallConfig::default(),
        };
        if let Some(disk) = &self.disk {
            cfg.disk = Some(disk.clone());
        }
        if let Some(efi_size) = &self.efi_size {
            cfg.efi_size = efi_size.clone();
        }
        if let Some(hostname) = &self.hostname {
            cfg.hostname = hostname.clone();
        }
        if let Some(username) = &self.username {
            cfg.username = username.clone();
        }
        if let Some(timezone) = &self.timezone {
            cfg.timezone = timezone.clone();
        }
        Ok(cfg)
    }
}
