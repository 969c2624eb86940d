//! Built-in layout used when probing is disabled or finds nothing.

use super::tree::{
    DeviceTree, Disk, LogicalVolume, Partition, PartitionTable, VolumeGroup, PARTITION_ALIGNMENT,
};

const GIB: u64 = 1024 * 1024 * 1024;

/// A small virtual machine: a system disk with LVM, a half-used data disk and
/// a blank disk.
pub fn demo_tree() -> DeviceTree {
    let boot = Partition {
        name: "vda1".to_string(),
        number: 1,
        start: PARTITION_ALIGNMENT,
        size: GIB,
        filesystem: Some("ext4".to_string()),
    };
    let pv = Partition {
        name: "vda2".to_string(),
        number: 2,
        start: boot.end(),
        size: 38 * GIB,
        filesystem: Some("lvmpv".to_string()),
    };

    let system = Disk {
        name: "vda".to_string(),
        model: Some("Virtio Block Device".to_string()),
        size: 40 * GIB,
        sector_size: 512,
        table: Some(PartitionTable::Gpt),
        partitions: vec![boot, pv],
    };

    let data = Disk {
        name: "vdb".to_string(),
        model: Some("Virtio Block Device".to_string()),
        size: 100 * GIB,
        sector_size: 512,
        table: Some(PartitionTable::Msdos),
        partitions: vec![Partition {
            name: "vdb1".to_string(),
            number: 1,
            start: PARTITION_ALIGNMENT,
            size: 50 * GIB,
            filesystem: Some("xfs".to_string()),
        }],
    };

    let blank = Disk {
        name: "vdc".to_string(),
        model: None,
        size: 20 * GIB,
        sector_size: 4096,
        table: None,
        partitions: Vec::new(),
    };

    let fedora = VolumeGroup {
        name: "fedora".to_string(),
        physical_volumes: vec!["vda2".to_string()],
        size: 38 * GIB,
        logical_volumes: vec![
            LogicalVolume {
                name: "root".to_string(),
                size: 30 * GIB,
                filesystem: Some("ext4".to_string()),
            },
            LogicalVolume {
                name: "swap".to_string(),
                size: 4 * GIB,
                filesystem: Some("swap".to_string()),
            },
        ],
    };

    DeviceTree {
        disks: vec![system, data, blank],
        volume_groups: vec![fedora],
        pending: Vec::new(),
    }
}
