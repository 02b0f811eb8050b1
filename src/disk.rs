//! Target disk selection.
//!
//! Nothing here touches the disk; validation happens before any destructive
//! stage is allowed to build a command.

use anyhow::{Context, Result};
use nix::sys::stat::{stat, SFlag};
use std::io::BufRead;

use crate::cmd::{self, CommandSpec};
use crate::errors::InstallerError;

/// Human-oriented listing so the prompt is answerable; parsed by nobody.
pub fn print_disks() -> Result<()> {
    let listing = cmd::output(&CommandSpec::new(
        "lsblk",
        &["-dno", "NAME,SIZE,MODEL", "--paths"],
    ))?;
    println!("Available disks:");
    for line in listing.lines() {
        println!("  {line}");
    }
    Ok(())
}

/// Read a disk path from `input` and validate it.
pub fn prompt_for_disk<R: BufRead>(input: &mut R) -> Result<String> {
    println!("Enter the target disk (e.g. /dev/sda):");
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("failed to read disk path")?;
    let disk = line.trim().to_string();
    validate_block_device(&disk)?;
    Ok(disk)
}

/// The one gate between "a string the user typed" and wiping a device.
pub fn validate_block_device(path: &str) -> Result<()> {
    if !path.starts_with("/dev/") {
        return Err(InstallerError::NotABlockDevice(path.to_string()).into());
    }
    let st = stat(path).map_err(|_| InstallerError::NotABlockDevice(path.to_string()))?;
    if SFlag::from_bits_truncate(st.st_mode) & SFlag::S_IFMT != SFlag::S_IFBLK {
        return Err(InstallerError::NotABlockDevice(path.to_string()).into());
    }
    Ok(())
}

/// Partition node naming: /dev/sda -> /dev/sda1, /dev/nvme0n1 -> /dev/nvme0n1p1.
pub fn partition_path(disk: &str, number: u32) -> String {
    let needs_p = disk.chars().last().is_some_and(|c| c.is_ascii_digit());
    if needs_p {
        format!("{disk}p{number}")
    } else {
        format!("{disk}{number}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_path_plain_disk() {
        assert_eq!(partition_path("/dev/sda", 1), "/dev/sda1");
        assert_eq!(partition_path("/dev/vdb", 2), "/dev/vdb2");
    }

    #[test]
    fn partition_path_nvme_and_mmc() {
        assert_eq!(partition_path("/dev/nvme0n1", 2), "/dev/nvme0n1p2");
        assert_eq!(partition_path("/dev/mmcblk0", 1), "/dev/mmcblk0p1");
    }

    #[test]
    fn validate_rejects_non_dev_paths() {
        assert!(validate_block_device("sda").is_err());
        assert!(validate_block_device("/etc/hostname").is_err());
    }

    #[test]
    fn validate_rejects_character_devices() {
        // /dev/null exists but is not a block device.
        assert!(validate_block_device("/dev/null").is_err());
    }

    #[test]
    fn prompt_trims_and_validates() {
        let mut input = std::io::Cursor::new("/dev/definitely-missing\n");
        assert!(prompt_for_disk(&mut input).is_err());
    }
}
