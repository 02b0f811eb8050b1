//! System configuration inside the staged root.
//!
//! The original approach for this kind of step is one big script shipped
//! into arch-chroot. Here every step is its own function against the
//! staging root: file edits happen from the outside (the staged tree is
//! just a directory, which is what makes these testable), and only tool
//! runs (locale-gen, mkinitcpio, bootctl, systemctl, useradd, passwd) go
//! through arch-chroot.

use anyhow::{Context, Result};
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::cmd::{self, CommandSpec};
use crate::config::InstallConfig;

pub const HOOKS_LINE: &str =
    "HOOKS=(base udev autodetect modconf kms keyboard keymap consolefont block encrypt lvm2 filesystems fsck)";

const LOADER_CONF: &str = "default arch.conf\ntimeout 3\nconsole-mode max\neditor no\n";

const SUDOERS_WHEEL_RULE: &str = "%wheel ALL=(ALL:ALL) ALL";

fn chroot_spec(root: &Path, args: &[&str]) -> CommandSpec {
    let mut full = vec![root.display().to_string()];
    full.extend(args.iter().map(|s| s.to_string()));
    CommandSpec {
        program: "arch-chroot".to_string(),
        args: full,
    }
}

fn write_file(path: &Path, content: &str, dry_run: bool) -> Result<()> {
    if dry_run {
        log::info!("DRY RUN: would write {}", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

pub fn set_timezone(root: &Path, timezone: &str, dry_run: bool) -> Result<()> {
    let zoneinfo = format!("/usr/share/zoneinfo/{timezone}");
    cmd::run(
        &chroot_spec(root, &["ln", "-sf", &zoneinfo, "/etc/localtime"]),
        dry_run,
    )?;
    cmd::run(&chroot_spec(root, &["hwclock", "--systohc"]), dry_run)?;
    Ok(())
}

/// Uncomment exactly the configured locale line; every other line is
/// passed through untouched, commented or not.
pub fn uncomment_locale(locale_gen: &str, locale: &str) -> String {
    let mut out = String::with_capacity(locale_gen.len());
    for line in locale_gen.lines() {
        let stripped = line.strip_prefix('#').map(str::trim_start);
        if stripped == Some(locale) {
            out.push_str(locale);
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

pub fn generate_locales(root: &Path, cfg: &InstallConfig, dry_run: bool) -> Result<()> {
    let locale_gen_path = root.join("etc/locale.gen");
    if dry_run {
        log::info!("DRY RUN: would uncomment '{}' in locale.gen", cfg.locale_gen);
    } else {
        let content = fs::read_to_string(&locale_gen_path)
            .with_context(|| format!("failed to read {}", locale_gen_path.display()))?;
        fs::write(&locale_gen_path, uncomment_locale(&content, &cfg.locale_gen))?;
    }
    cmd::run(&chroot_spec(root, &["locale-gen"]), dry_run)?;
    write_file(
        &root.join("etc/locale.conf"),
        &format!("LANG={}\n", cfg.lang),
        dry_run,
    )
}

/// The configured console font may not exist in the freshly bootstrapped
/// tree; fall back to installing a font package and using its name.
pub fn resolve_console_font(root: &Path, cfg: &InstallConfig, dry_run: bool) -> Result<String> {
    let font_file = root
        .join("usr/share/kbd/consolefonts")
        .join(format!("{}.psfu.gz", cfg.console_font));
    if font_file.exists() {
        return Ok(cfg.console_font.clone());
    }
    log::warn!(
        "Console font {} not found; installing {}",
        cfg.console_font,
        cfg.fallback_font_package
    );
    cmd::run(
        &chroot_spec(
            root,
            &["pacman", "-S", "--noconfirm", &cfg.fallback_font_package],
        ),
        dry_run,
    )?;
    Ok(cfg.fallback_font.clone())
}

pub fn render_vconsole(keymap: &str, font: &str) -> String {
    format!("KEYMAP={keymap}\nFONT={font}\n")
}

pub fn write_console_config(root: &Path, cfg: &InstallConfig, dry_run: bool) -> Result<()> {
    let font = resolve_console_font(root, cfg, dry_run)?;
    write_file(
        &root.join("etc/vconsole.conf"),
        &render_vconsole(&cfg.keymap, &font),
        dry_run,
    )
}

pub fn render_hosts(hostname: &str) -> String {
    format!(
        "127.0.0.1\tlocalhost\n::1\t\tlocalhost\n127.0.1.1\t{hostname}.localdomain\t{hostname}\n"
    )
}

pub fn write_network_identity(root: &Path, cfg: &InstallConfig, dry_run: bool) -> Result<()> {
    write_file(
        &root.join("etc/hostname"),
        &format!("{}\n", cfg.hostname),
        dry_run,
    )?;
    write_file(&root.join("etc/hosts"), &render_hosts(&cfg.hostname), dry_run)
}

/// Replace the active HOOKS line so the initramfs can unlock LUKS and
/// assemble LVM before mounting root.
pub fn rewrite_hooks(mkinitcpio_conf: &str) -> String {
    let mut out = String::with_capacity(mkinitcpio_conf.len());
    for line in mkinitcpio_conf.lines() {
        if line.starts_with("HOOKS=") {
            out.push_str(HOOKS_LINE);
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

pub fn regenerate_initramfs(root: &Path, dry_run: bool) -> Result<()> {
    let conf_path = root.join("etc/mkinitcpio.conf");
    if dry_run {
        log::info!("DRY RUN: would rewrite HOOKS in {}", conf_path.display());
    } else {
        let content = fs::read_to_string(&conf_path)
            .with_context(|| format!("failed to read {}", conf_path.display()))?;
        fs::write(&conf_path, rewrite_hooks(&content))?;
        log::info!("Wrote {}", conf_path.display());
    }
    cmd::run(&chroot_spec(root, &["mkinitcpio", "-P"]), dry_run)
}

pub fn render_boot_entry(cfg: &InstallConfig, luks_uuid: &str, microcode: Option<&str>) -> String {
    let mut entry = String::from("title\tArch Linux\nlinux\t/vmlinuz-linux\n");
    if let Some(pkg) = microcode {
        entry.push_str(&format!("initrd\t/{pkg}.img\n"));
    }
    entry.push_str("initrd\t/initramfs-linux.img\n");
    entry.push_str(&format!(
        "options\tcryptdevice=UUID={}:{} root={} rw\n",
        luks_uuid,
        cfg.crypt_name,
        cfg.lv_device()
    ));
    entry
}

pub fn install_bootloader(
    root: &Path,
    cfg: &InstallConfig,
    luks_uuid: &str,
    microcode: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    cmd::run(&chroot_spec(root, &["bootctl", "install"]), dry_run)?;
    write_file(&root.join("boot/loader/loader.conf"), LOADER_CONF, dry_run)?;
    write_file(
        &root.join("boot/loader/entries/arch.conf"),
        &render_boot_entry(cfg, luks_uuid, microcode),
        dry_run,
    )
}

pub fn enable_services(root: &Path, cfg: &InstallConfig, dry_run: bool) -> Result<()> {
    let mut args = vec!["systemctl", "enable"];
    args.extend(cfg.services.iter().map(String::as_str));
    cmd::run(&chroot_spec(root, &args), dry_run)
}

pub fn create_users(root: &Path, cfg: &InstallConfig, dry_run: bool) -> Result<()> {
    cmd::run(
        &chroot_spec(root, &["useradd", "-m", "-G", "wheel", &cfg.username]),
        dry_run,
    )?;
    println!("Set password for {}:", cfg.username);
    cmd::run(&chroot_spec(root, &["passwd", &cfg.username]), dry_run)?;
    println!("Set password for root:");
    cmd::run(&chroot_spec(root, &["passwd"]), dry_run)?;
    append_sudoers_rule(root, dry_run)
}

fn append_sudoers_rule(root: &Path, dry_run: bool) -> Result<()> {
    let sudoers = root.join("etc/sudoers");
    if dry_run {
        log::info!("DRY RUN: would append '{SUDOERS_WHEEL_RULE}' to sudoers");
        return Ok(());
    }
    let existing = fs::read_to_string(&sudoers).unwrap_or_default();
    if existing
        .lines()
        .any(|line| line.trim() == SUDOERS_WHEEL_RULE)
    {
        return Ok(());
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&sudoers)
        .with_context(|| format!("failed to open {}", sudoers.display()))?;
    writeln!(file, "{SUDOERS_WHEEL_RULE}")?;
    log::info!("Granted wheel sudo in {}", sudoers.display());
    Ok(())
}

/// The full chroot-configuration stage, in order.
pub fn run(
    cfg: &InstallConfig,
    luks_uuid: &str,
    microcode: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let root = cfg.staging_root.as_path();
    log::info!("🔧 Configuring system in {}", root.display());
    set_timezone(root, &cfg.timezone, dry_run)?;
    generate_locales(root, cfg, dry_run)?;
    write_console_config(root, cfg, dry_run)?;
    write_network_identity(root, cfg, dry_run)?;
    regenerate_initramfs(root, dry_run)?;
    install_bootloader(root, cfg, luks_uuid, microcode, dry_run)?;
    enable_services(root, cfg, dry_run)?;
    create_users(root, cfg, dry_run)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncomment_touches_only_the_requested_line() {
        let input = "#de_DE.UTF-8 UTF-8\n#en_US.UTF-8 UTF-8\n#en_US ISO-8859-1\n";
        let output = uncomment_locale(input, "en_US.UTF-8 UTF-8");
        assert_eq!(
            output,
            "#de_DE.UTF-8 UTF-8\nen_US.UTF-8 UTF-8\n#en_US ISO-8859-1\n"
        );
    }

    #[test]
    fn uncomment_leaves_already_active_lines_alone() {
        let input = "en_US.UTF-8 UTF-8\n";
        assert_eq!(uncomment_locale(input, "en_US.UTF-8 UTF-8"), input);
    }

    #[test]
    fn hooks_line_replaced_in_place() {
        let input = "MODULES=()\nBINARIES=()\nHOOKS=(base udev autodetect block filesystems)\nCOMPRESSION=\"zstd\"\n";
        let output = rewrite_hooks(input);
        assert!(output.contains(HOOKS_LINE));
        assert!(output.contains("MODULES=()"));
        assert!(output.contains("COMPRESSION=\"zstd\""));
        assert_eq!(output.matches("HOOKS=").count(), 1);
    }

    #[test]
    fn hooks_order_unlocks_before_filesystems() {
        let encrypt = HOOKS_LINE.find(" encrypt ").unwrap();
        let lvm2 = HOOKS_LINE.find(" lvm2 ").unwrap();
        let filesystems = HOOKS_LINE.find(" filesystems ").unwrap();
        assert!(encrypt < lvm2 && lvm2 < filesystems);
    }

    #[test]
    fn boot_entry_references_mapper_and_lv_verbatim() {
        let cfg = InstallConfig::default();
        let entry = render_boot_entry(&cfg, "abcd-1234", None);
        assert!(entry.contains("cryptdevice=UUID=abcd-1234:cryptroot"));
        assert!(entry.contains("root=/dev/vault/root rw"));
        assert!(!entry.contains("-ucode"));
    }

    #[test]
    fn boot_entry_orders_microcode_initrd_first() {
        let cfg = InstallConfig::default();
        let entry = render_boot_entry(&cfg, "abcd-1234", Some("intel-ucode"));
        let ucode = entry.find("initrd\t/intel-ucode.img").unwrap();
        let initramfs = entry.find("initrd\t/initramfs-linux.img").unwrap();
        assert!(ucode < initramfs);
    }

    #[test]
    fn hosts_file_names_the_host() {
        let hosts = render_hosts("archbox");
        assert!(hosts.contains("127.0.1.1\tarchbox.localdomain\tarchbox"));
        assert!(hosts.contains("127.0.0.1\tlocalhost"));
    }
}
