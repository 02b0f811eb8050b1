//! LUKS2 setup on the data partition. cryptsetup does its own passphrase
//! prompting and "are you sure" dialog on inherited stdio.

use anyhow::Result;

use crate::cmd::{self, CommandSpec};

pub fn luks_format_spec(partition: &str) -> CommandSpec {
    CommandSpec::new("cryptsetup", &["luksFormat", "--type", "luks2", partition])
}

pub fn luks_open_spec(partition: &str, name: &str) -> CommandSpec {
    CommandSpec::new("cryptsetup", &["open", partition, name])
}

pub fn format_and_open(partition: &str, name: &str, dry_run: bool) -> Result<()> {
    log::info!("🔐 Encrypting {partition} (mapper name: {name})");
    cmd::run(&luks_format_spec(partition), dry_run)?;
    cmd::run(&luks_open_spec(partition, name), dry_run)?;
    Ok(())
}

/// UUID of the LUKS container itself (the raw partition, not the mapper).
/// The boot entry's cryptdevice= line needs exactly this.
pub fn luks_uuid(partition: &str) -> Result<String> {
    cmd::output(&CommandSpec::new(
        "blkid",
        &["-s", "UUID", "-o", "value", partition],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_uses_luks2() {
        let spec = luks_format_spec("/dev/sda2");
        assert_eq!(
            spec.args,
            vec!["luksFormat", "--type", "luks2", "/dev/sda2"]
        );
    }

    #[test]
    fn open_maps_under_configured_name() {
        let spec = luks_open_spec("/dev/sda2", "cryptroot");
        assert_eq!(spec.args, vec!["open", "/dev/sda2", "cryptroot"]);
    }
}
