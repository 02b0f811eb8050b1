use cryptarch_installer::partition;

#[test]
fn exactly_two_partitions_are_created() {
    let specs = [
        partition::efi_partition_spec("/dev/sda", "512MiB"),
        partition::lvm_partition_spec("/dev/sda"),
    ];
    assert!(specs[0].args.contains(&"1:0:+512MiB".to_string()));
    assert!(specs[1].args.contains(&"2:0:0".to_string()));
}

#[test]
fn first_partition_is_boot_flagged_fat_esp() {
    let spec = partition::efi_partition_spec("/dev/sda", "300MiB");
    let args = &spec.args;
    let t = args.iter().position(|a| a == "-t").unwrap();
    assert_eq!(args[t + 1], "1:ef00");
    assert!(args.contains(&"1:0:+300MiB".to_string()));
}

#[test]
fn second_partition_spans_the_remainder_as_lvm() {
    let spec = partition::lvm_partition_spec("/dev/nvme0n1");
    let t = spec.args.iter().position(|a| a == "-t").unwrap();
    assert_eq!(spec.args[t + 1], "2:8e00");
    // end sector 0 = rest of disk
    assert!(spec.args.contains(&"2:0:0".to_string()));
}

#[test]
fn configured_efi_size_flows_through() {
    let spec = partition::efi_partition_spec("/dev/sda", "1GiB");
    assert!(spec.args.contains(&"1:0:+1GiB".to_string()));
}
