use cryptarch_installer::disk;
use std::fs::File;
use tempfile::tempdir;

#[test]
fn regular_file_is_not_a_valid_target() {
    let dir = tempdir().expect("tempdir");
    let file = dir.path().join("disk.img");
    File::create(&file).expect("create file");

    // A run against a plain file must abort before any destructive stage.
    let result = disk::validate_block_device(file.to_str().unwrap());
    assert!(result.is_err());
}

#[test]
fn missing_device_is_rejected() {
    assert!(disk::validate_block_device("/dev/does-not-exist-42").is_err());
}

#[test]
fn relative_paths_are_rejected() {
    assert!(disk::validate_block_device("sda").is_err());
}

#[test]
fn shrink_reserves_the_configured_margin() {
    use cryptarch_installer::format::shrink_target_mib;
    // 20 GiB LV, 256 MiB reserve: reported fs size must be LV size minus reserve.
    let lv_bytes = 20u64 * 1024 * 1024 * 1024;
    assert_eq!(shrink_target_mib(lv_bytes, 256), 20 * 1024 - 256);
}
