use anyhow::Result;
use std::process::Command;

// External tools instead of library bindings; the live ISO ships all of these.
pub const REQUIRED_COMMANDS: [&str; 16] = [
    "lsblk",
    "sgdisk",
    "partprobe",
    "cryptsetup",
    "pvcreate",
    "vgcreate",
    "lvcreate",
    "mkfs.fat",
    "mkfs.ext4",
    "e2fsck",
    "resize2fs",
    "blockdev",
    "blkid",
    "pacstrap",
    "genfstab",
    "arch-chroot",
];

pub fn run() -> Result<()> {
    log::info!("🔍 Preflight: checking required tools");
    let mut missing = Vec::new();
    for tool in REQUIRED_COMMANDS {
        let ok = Command::new("which")
            .arg(tool)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        if ok {
            log::info!("✅ {tool}");
        } else {
            log::warn!("❌ {tool}");
            missing.push(tool);
        }
    }
    if !missing.is_empty() {
        anyhow::bail!("missing required tools: {}", missing.join(", "));
    }
    Ok(())
}
