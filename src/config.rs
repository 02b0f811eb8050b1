//! Install configuration passed between stage functions.
//!
//! One explicit struct instead of ambient shell variables. A JSON profile
//! can seed it; CLI flags override individual fields.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Target disk, e.g. "/dev/sda". Prompted for when absent.
    pub disk: Option<String>,
    /// EFI system partition size in sgdisk suffix syntax.
    pub efi_size: String,
    /// device-mapper name the decrypted partition is opened under.
    pub crypt_name: String,
    pub vg_name: String,
    pub lv_name: String,
    /// MiB left unallocated at the end of the root filesystem for snapshots.
    pub root_reserve_mib: u64,
    /// Where the new system is staged during install.
    pub staging_root: PathBuf,
    pub timezone: String,
    /// Exact line to uncomment in /etc/locale.gen.
    pub locale_gen: String,
    pub lang: String,
    pub keymap: String,
    pub console_font: String,
    /// Used when the configured console font is not on disk after pacstrap.
    pub fallback_font_package: String,
    pub fallback_font: String,
    pub hostname: String,
    pub username: String,
    pub packages: Vec<String>,
    pub services: Vec<String>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            disk: None,
            efi_size: "512MiB".to_string(),
            crypt_name: "cryptroot".to_string(),
            vg_name: "vault".to_string(),
            lv_name: "root".to_string(),
            root_reserve_mib: 256,
            staging_root: PathBuf::from("/mnt"),
            timezone: "UTC".to_string(),
            locale_gen: "en_US.UTF-8 UTF-8".to_string(),
            lang: "en_US.UTF-8".to_string(),
            keymap: "us".to_string(),
            console_font: "ter-v16n".to_string(),
            fallback_font_package: "terminus-font".to_string(),
            fallback_font: "ter-116n".to_string(),
            hostname: "archbox".to_string(),
            username: "arch".to_string(),
            packages: [
                "base",
                "linux",
                "linux-firmware",
                "lvm2",
                "networkmanager",
                "sudo",
                "vim",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            services: ["NetworkManager", "systemd-timesyncd", "fstrim.timer"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl InstallConfig {
    pub fn from_profile(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read profile {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse profile {}", path.display()))
    }

    /// /dev/<vg>/<lv>, the path the boot entry references verbatim.
    pub fn lv_device(&self) -> String {
        format!("/dev/{}/{}", self.vg_name, self.lv_name)
    }

    /// /dev/mapper/<name> exposed after `cryptsetup open`.
    pub fn crypt_device(&self) -> String {
        format!("/dev/mapper/{}", self.crypt_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_canonical_layout() {
        let cfg = InstallConfig::default();
        assert_eq!(cfg.efi_size, "512MiB");
        assert_eq!(cfg.lv_device(), "/dev/vault/root");
        assert_eq!(cfg.crypt_device(), "/dev/mapper/cryptroot");
        assert_eq!(cfg.root_reserve_mib, 256);
        assert!(cfg.packages.iter().any(|p| p == "lvm2"));
    }

    #[test]
    fn partial_profile_falls_back_to_defaults() {
        let cfg: InstallConfig =
            serde_json::from_str(r#"{"hostname": "test", "vg_name": "sys"}"#).unwrap();
        assert_eq!(cfg.hostname, "test");
        assert_eq!(cfg.lv_device(), "/dev/sys/root");
        assert_eq!(cfg.lang, "en_US.UTF-8");
    }
}
