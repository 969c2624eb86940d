//! Builds a device tree from sysfs.
//!
//! Only what sysfs exposes directly is read: disk and partition sizes,
//! offsets, numbers and the model string. Filesystems, partition table type
//! and LVM layout need the storage library and are left unknown.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bevy::prelude::*;

use crate::config::AppConfigData;

use super::demo::demo_tree;
use super::tree::{DeviceTree, Disk, Partition, PartitionTable};

/// sysfs reports `size` and `start` in 512-byte units regardless of the
/// device's logical sector size
const SYSFS_SECTOR: u64 = 512;

pub fn scan_disks() -> io::Result<Vec<Disk>> {
    scan_disks_in(Path::new("/sys/block"))
}

pub fn scan_disks_in(sys_block_root: &Path) -> io::Result<Vec<Disk>> {
    let mut disks = Vec::new();

    for entry in fs::read_dir(sys_block_root)?.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if should_skip_block_device(&name) {
            continue;
        }

        let sysfs_path = sys_block_root.join(&name);
        let Some(size) = read_sectors(sysfs_path.join("size")) else {
            continue;
        };
        if size == 0 {
            continue;
        }

        let sector_size = read_number(sysfs_path.join("queue/logical_block_size"))
            .unwrap_or(SYSFS_SECTOR);
        let partitions = scan_partitions(&sysfs_path, &name);
        // A disk with children must carry a table; which kind is not visible here
        let table = (!partitions.is_empty()).then_some(PartitionTable::Gpt);

        disks.push(Disk {
            name,
            model: read_trimmed(sysfs_path.join("device/model")),
            size,
            sector_size,
            table,
            partitions,
        });
    }

    disks.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(disks)
}

fn scan_partitions(disk_path: &Path, disk_name: &str) -> Vec<Partition> {
    let Ok(entries) = fs::read_dir(disk_path) else {
        return Vec::new();
    };

    let mut partitions: Vec<Partition> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with(disk_name) {
                return None;
            }
            let path = entry.path();
            Some(Partition {
                number: u32::try_from(read_number(path.join("partition"))?).ok()?,
                start: read_sectors(path.join("start"))?,
                size: read_sectors(path.join("size"))?,
                filesystem: None,
                name,
            })
        })
        .collect();

    partitions.sort_by_key(|p| p.start);
    partitions
}

/// Probe the real disks unless the demo layout is requested or nothing usable
/// was found
pub fn load_device_tree(config: &AppConfigData) -> DeviceTree {
    if config.use_demo_devices {
        info!("Using demo device layout");
        return demo_tree();
    }

    match scan_disks() {
        Ok(disks) if !disks.is_empty() => {
            info!("Found {} disk(s) in sysfs", disks.len());
            DeviceTree {
                disks,
                ..default()
            }
        }
        Ok(_) => {
            warn!("No disks found in sysfs, falling back to demo layout");
            demo_tree()
        }
        Err(e) => {
            warn!("Failed to scan sysfs: {}, falling back to demo layout", e);
            demo_tree()
        }
    }
}

fn read_trimmed(path: PathBuf) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn read_number(path: PathBuf) -> Option<u64> {
    read_trimmed(path)?.parse().ok()
}

fn read_sectors(path: PathBuf) -> Option<u64> {
    read_number(path).map(|sectors| sectors.saturating_mul(SYSFS_SECTOR))
}

fn should_skip_block_device(name: &str) -> bool {
    name.starts_with("loop")
        || name.starts_with("ram")
        || name.starts_with("zram")
        || name.starts_with("dm-")
        || name.starts_with("md")
        || name.starts_with("sr")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_scan_skips_virtual_devices() {
        let tmp = tempdir().unwrap();
        write(tmp.path(), "sda/size", "2048\n");
        write(tmp.path(), "loop0/size", "2048\n");
        write(tmp.path(), "zram0/size", "2048\n");

        let disks = scan_disks_in(tmp.path()).unwrap();
        assert_eq!(disks.len(), 1);
        assert_eq!(disks[0].name, "sda");
        assert_eq!(disks[0].size, 2048 * 512);
        assert!(disks[0].table.is_none());
    }

    #[test]
    fn test_scan_reads_partitions_and_model() {
        let tmp = tempdir().unwrap();
        write(tmp.path(), "nvme0n1/size", "1000000\n");
        write(tmp.path(), "nvme0n1/device/model", "Fast SSD   \n");
        write(tmp.path(), "nvme0n1/queue/logical_block_size", "4096\n");
        write(tmp.path(), "nvme0n1/nvme0n1p2/partition", "2\n");
        write(tmp.path(), "nvme0n1/nvme0n1p2/start", "4096\n");
        write(tmp.path(), "nvme0n1/nvme0n1p2/size", "8192\n");
        write(tmp.path(), "nvme0n1/nvme0n1p1/partition", "1\n");
        write(tmp.path(), "nvme0n1/nvme0n1p1/start", "2048\n");
        write(tmp.path(), "nvme0n1/nvme0n1p1/size", "2048\n");

        let disks = scan_disks_in(tmp.path()).unwrap();
        let disk = &disks[0];
        assert_eq!(disk.model.as_deref(), Some("Fast SSD"));
        assert_eq!(disk.sector_size, 4096);
        assert_eq!(disk.table, Some(PartitionTable::Gpt));
        let names: Vec<_> = disk.partitions.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["nvme0n1p1", "nvme0n1p2"]);
        assert_eq!(disk.partitions[1].start, 4096 * 512);
        assert_eq!(disk.next_partition_number(), 3);
    }

    #[test]
    fn test_out_of_range_partition_number_skipped() {
        let tmp = tempdir().unwrap();
        write(tmp.path(), "sdc/size", "1000000\n");
        write(tmp.path(), "sdc/sdc1/partition", "1\n");
        write(tmp.path(), "sdc/sdc1/start", "2048\n");
        write(tmp.path(), "sdc/sdc1/size", "2048\n");
        write(tmp.path(), "sdc/sdc2/partition", "4294967297\n");
        write(tmp.path(), "sdc/sdc2/start", "4096\n");
        write(tmp.path(), "sdc/sdc2/size", "2048\n");

        let disks = scan_disks_in(tmp.path()).unwrap();
        let names: Vec<_> = disks[0].partitions.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["sdc1"]);
    }

    #[test]
    fn test_zero_sized_devices_skipped() {
        let tmp = tempdir().unwrap();
        write(tmp.path(), "sdb/size", "0\n");
        assert!(scan_disks_in(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_demo_layout_when_configured() {
        let config = AppConfigData {
            use_demo_devices: true,
            ..Default::default()
        };
        assert_eq!(load_device_tree(&config), demo_tree());
    }
}
