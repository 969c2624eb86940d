use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::history::{HistoryResult, SnapshotSource};

use super::actions::StagedAction;

/// Partitions start at this offset to leave room for the partition table
pub const PARTITION_ALIGNMENT: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionTable {
    Msdos,
    Gpt,
}

impl PartitionTable {
    pub fn display_name(&self) -> &'static str {
        match self {
            PartitionTable::Msdos => "msdos",
            PartitionTable::Gpt => "gpt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Kernel name, e.g. `sda1` or `nvme0n1p2`
    pub name: String,
    pub number: u32,
    /// Offset from the start of the disk in bytes
    pub start: u64,
    pub size: u64,
    pub filesystem: Option<String>,
}

impl Partition {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disk {
    pub name: String,
    pub model: Option<String>,
    pub size: u64,
    pub sector_size: u64,
    pub table: Option<PartitionTable>,
    /// Sorted by start offset
    pub partitions: Vec<Partition>,
}

impl Disk {
    /// Unallocated `(start, size)` regions, in disk order
    pub fn free_regions(&self) -> Vec<(u64, u64)> {
        let mut regions = Vec::new();
        let mut cursor = PARTITION_ALIGNMENT.min(self.size);

        for partition in &self.partitions {
            if partition.start > cursor {
                regions.push((cursor, partition.start - cursor));
            }
            cursor = cursor.max(partition.end());
        }

        if self.size > cursor {
            regions.push((cursor, self.size - cursor));
        }
        regions
    }

    pub fn free_space(&self) -> u64 {
        self.free_regions().iter().map(|(_, size)| size).sum()
    }

    pub fn next_partition_number(&self) -> u32 {
        self.partitions
            .iter()
            .map(|p| p.number)
            .max()
            .map_or(1, |n| n + 1)
    }

    /// Kernel naming: disks ending in a digit get a `p` separator
    pub fn partition_name(&self, number: u32) -> String {
        if self.name.ends_with(|c: char| c.is_ascii_digit()) {
            format!("{}p{}", self.name, number)
        } else {
            format!("{}{}", self.name, number)
        }
    }

    pub fn display_name(&self) -> String {
        match &self.model {
            Some(model) => format!("{} ({})", self.name, model),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalVolume {
    pub name: String,
    pub size: u64,
    pub filesystem: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeGroup {
    pub name: String,
    /// Partition names backing this group
    pub physical_volumes: Vec<String>,
    pub size: u64,
    pub logical_volumes: Vec<LogicalVolume>,
}

impl VolumeGroup {
    pub fn used(&self) -> u64 {
        self.logical_volumes.iter().map(|lv| lv.size).sum()
    }

    pub fn free_space(&self) -> u64 {
        self.size.saturating_sub(self.used())
    }

    pub fn find_logical_volume(&self, name: &str) -> Option<&LogicalVolume> {
        self.logical_volumes.iter().find(|lv| lv.name == name)
    }

    /// Short `vg/lv` form
    pub fn logical_volume_path(&self, lv: &LogicalVolume) -> String {
        format!("{}/{}", self.name, lv.name)
    }
}

/// The live storage layout being edited, including everything staged so far
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTree {
    pub disks: Vec<Disk>,
    pub volume_groups: Vec<VolumeGroup>,
    /// Actions staged since the last apply, oldest first
    #[serde(default)]
    pub pending: Vec<StagedAction>,
}

impl DeviceTree {
    pub fn find_disk(&self, name: &str) -> Option<&Disk> {
        self.disks.iter().find(|d| d.name == name)
    }

    pub fn find_disk_mut(&mut self, name: &str) -> Option<&mut Disk> {
        self.disks.iter_mut().find(|d| d.name == name)
    }

    /// Locate a partition along with the disk holding it
    pub fn find_partition(&self, name: &str) -> Option<(&Disk, &Partition)> {
        self.disks.iter().find_map(|disk| {
            disk.partitions
                .iter()
                .find(|p| p.name == name)
                .map(|p| (disk, p))
        })
    }

    pub fn find_volume_group(&self, name: &str) -> Option<&VolumeGroup> {
        self.volume_groups.iter().find(|vg| vg.name == name)
    }

    pub fn find_volume_group_mut(&mut self, name: &str) -> Option<&mut VolumeGroup> {
        self.volume_groups.iter_mut().find(|vg| vg.name == name)
    }

    /// Volume group a partition is a physical volume of, if any
    pub fn volume_group_of(&self, partition: &str) -> Option<&VolumeGroup> {
        self.volume_groups
            .iter()
            .find(|vg| vg.physical_volumes.iter().any(|pv| pv == partition))
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl SnapshotSource<DeviceTree> for DeviceTree {
    fn snapshot(&self) -> HistoryResult<DeviceTree> {
        Ok(self.clone())
    }
}
