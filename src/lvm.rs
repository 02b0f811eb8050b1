//! PV / VG / LV stack on top of the opened LUKS mapper. One logical volume
//! takes all free space; the filesystem shrink later carves out the reserve.

use anyhow::Result;

use crate::cmd::{self, CommandSpec};
use crate::config::InstallConfig;

pub fn pvcreate_spec(device: &str) -> CommandSpec {
    CommandSpec::new("pvcreate", &[device])
}

pub fn vgcreate_spec(vg: &str, device: &str) -> CommandSpec {
    CommandSpec::new("vgcreate", &[vg, device])
}

pub fn lvcreate_spec(vg: &str, lv: &str) -> CommandSpec {
    CommandSpec::new("lvcreate", &["-l", "100%FREE", vg, "-n", lv])
}

pub fn run(cfg: &InstallConfig, dry_run: bool) -> Result<()> {
    let crypt_dev = cfg.crypt_device();
    log::info!(
        "🧱 LVM: {} -> vg {} -> lv {}",
        crypt_dev,
        cfg.vg_name,
        cfg.lv_name
    );
    cmd::run(&pvcreate_spec(&crypt_dev), dry_run)?;
    cmd::run(&vgcreate_spec(&cfg.vg_name, &crypt_dev), dry_run)?;
    cmd::run(&lvcreate_spec(&cfg.vg_name, &cfg.lv_name), dry_run)?;
    Ok(())
}
