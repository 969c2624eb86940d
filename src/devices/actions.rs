//! Modifications a user can stage against the in-memory device tree.
//!
//! Nothing here touches real storage. Each action validates against the
//! current tree, mutates it, and appends itself to the tree's pending list so
//! the whole sequence can be exported on apply.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::format::{format_size, SizeUnit};
use super::tree::{DeviceTree, Disk, LogicalVolume, Partition, VolumeGroup};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("no such disk: {0}")]
    UnknownDisk(String),

    #[error("no such partition: {0}")]
    UnknownPartition(String),

    #[error("no such volume group: {0}")]
    UnknownVolumeGroup(String),

    #[error("no such logical volume: {volume_group}/{name}")]
    UnknownLogicalVolume { volume_group: String, name: String },

    #[error("{0} has no partition table")]
    NoPartitionTable(String),

    #[error("size must be greater than zero")]
    ZeroSize,

    #[error("logical volume name must not be empty")]
    EmptyName,

    #[error("not enough free space: need {needed} bytes, {available} available")]
    InsufficientSpace { needed: u64, available: u64 },

    #[error("{partition} cannot grow past byte {limit}")]
    Overlap { partition: String, limit: u64 },

    #[error("logical volume {volume_group}/{name} already exists")]
    DuplicateLogicalVolume { volume_group: String, name: String },

    #[error("{partition} backs volume group {volume_group} which still holds logical volumes")]
    PartitionInUse {
        partition: String,
        volume_group: String,
    },
}

pub type ActionResult<T> = std::result::Result<T, ActionError>;

/// A single staged modification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StagedAction {
    CreatePartition {
        disk: String,
        size: u64,
        filesystem: Option<String>,
    },
    ResizePartition {
        partition: String,
        new_size: u64,
    },
    DeletePartition {
        partition: String,
    },
    CreateLogicalVolume {
        volume_group: String,
        name: String,
        size: u64,
        filesystem: Option<String>,
    },
    ResizeLogicalVolume {
        volume_group: String,
        name: String,
        new_size: u64,
    },
    DeleteLogicalVolume {
        volume_group: String,
        name: String,
    },
}

impl StagedAction {
    /// Validate against `tree` without changing it
    pub fn check(&self, tree: &DeviceTree) -> ActionResult<()> {
        match self {
            StagedAction::CreatePartition { disk, size, .. } => {
                let disk = existing_disk(tree, disk)?;
                first_fit(disk, *size).map(|_| ())
            }
            StagedAction::ResizePartition {
                partition,
                new_size,
            } => {
                let (disk, part) = existing_partition(tree, partition)?;
                check_partition_resize(tree, disk, part, *new_size)
            }
            StagedAction::DeletePartition { partition } => {
                existing_partition(tree, partition)?;
                check_not_in_use(tree, partition)
            }
            StagedAction::CreateLogicalVolume {
                volume_group,
                name,
                size,
                ..
            } => {
                let vg = existing_volume_group(tree, volume_group)?;
                if name.trim().is_empty() {
                    return Err(ActionError::EmptyName);
                }
                if vg.find_logical_volume(name).is_some() {
                    return Err(ActionError::DuplicateLogicalVolume {
                        volume_group: volume_group.clone(),
                        name: name.clone(),
                    });
                }
                check_fits(*size, vg.free_space())
            }
            StagedAction::ResizeLogicalVolume {
                volume_group,
                name,
                new_size,
            } => {
                let vg = existing_volume_group(tree, volume_group)?;
                let lv = existing_logical_volume(vg, name)?;
                if *new_size == 0 {
                    return Err(ActionError::ZeroSize);
                }
                let growth = new_size.saturating_sub(lv.size);
                if growth > vg.free_space() {
                    return Err(ActionError::InsufficientSpace {
                        needed: growth,
                        available: vg.free_space(),
                    });
                }
                Ok(())
            }
            StagedAction::DeleteLogicalVolume { volume_group, name } => {
                let vg = existing_volume_group(tree, volume_group)?;
                existing_logical_volume(vg, name).map(|_| ())
            }
        }
    }

    /// Validate, then mutate `tree` and record this action as pending
    pub fn apply_to(&self, tree: &mut DeviceTree) -> ActionResult<()> {
        self.check(tree)?;

        match self {
            StagedAction::CreatePartition {
                disk,
                size,
                filesystem,
            } => {
                let disk = tree
                    .find_disk_mut(disk)
                    .ok_or_else(|| ActionError::UnknownDisk(disk.clone()))?;
                let start = first_fit(disk, *size)?;
                let number = disk.next_partition_number();
                let partition = Partition {
                    name: disk.partition_name(number),
                    number,
                    start,
                    size: *size,
                    filesystem: filesystem.clone(),
                };
                let index = disk.partitions.partition_point(|p| p.start < start);
                disk.partitions.insert(index, partition);
            }
            StagedAction::ResizePartition {
                partition,
                new_size,
            } => {
                let old_size = set_partition_size(tree, partition, *new_size)?;
                if let Some(vg) = volume_group_of_mut(tree, partition) {
                    vg.size = vg.size.saturating_add(*new_size).saturating_sub(old_size);
                }
            }
            StagedAction::DeletePartition { partition } => {
                let removed = remove_partition(tree, partition)?;
                if let Some(vg) = volume_group_of_mut(tree, partition) {
                    vg.physical_volumes.retain(|pv| pv != partition);
                    vg.size = vg.size.saturating_sub(removed.size);
                }
                tree.volume_groups.retain(|vg| !vg.physical_volumes.is_empty());
            }
            StagedAction::CreateLogicalVolume {
                volume_group,
                name,
                size,
                filesystem,
            } => {
                let vg = volume_group_mut(tree, volume_group)?;
                vg.logical_volumes.push(LogicalVolume {
                    name: name.clone(),
                    size: *size,
                    filesystem: filesystem.clone(),
                });
            }
            StagedAction::ResizeLogicalVolume {
                volume_group,
                name,
                new_size,
            } => {
                let vg = volume_group_mut(tree, volume_group)?;
                let lv = vg
                    .logical_volumes
                    .iter_mut()
                    .find(|lv| lv.name == *name)
                    .ok_or_else(|| ActionError::UnknownLogicalVolume {
                        volume_group: volume_group.clone(),
                        name: name.clone(),
                    })?;
                lv.size = *new_size;
            }
            StagedAction::DeleteLogicalVolume { volume_group, name } => {
                let vg = volume_group_mut(tree, volume_group)?;
                vg.logical_volumes.retain(|lv| lv.name != *name);
            }
        }

        tree.pending.push(self.clone());
        Ok(())
    }

    /// One-line label for the pending actions list
    pub fn describe(&self) -> String {
        let size = |bytes: u64| format_size(bytes, SizeUnit::Auto);
        let fs = |filesystem: &Option<String>| {
            filesystem
                .as_deref()
                .map(|f| format!(" ({})", f))
                .unwrap_or_default()
        };

        match self {
            StagedAction::CreatePartition {
                disk,
                size: bytes,
                filesystem,
            } => format!("Create {} partition on {}{}", size(*bytes), disk, fs(filesystem)),
            StagedAction::ResizePartition {
                partition,
                new_size,
            } => format!("Resize {} to {}", partition, size(*new_size)),
            StagedAction::DeletePartition { partition } => format!("Delete {}", partition),
            StagedAction::CreateLogicalVolume {
                volume_group,
                name,
                size: bytes,
                filesystem,
            } => format!(
                "Create logical volume {}/{} of {}{}",
                volume_group,
                name,
                size(*bytes),
                fs(filesystem)
            ),
            StagedAction::ResizeLogicalVolume {
                volume_group,
                name,
                new_size,
            } => format!("Resize {}/{} to {}", volume_group, name, size(*new_size)),
            StagedAction::DeleteLogicalVolume { volume_group, name } => {
                format!("Delete logical volume {}/{}", volume_group, name)
            }
        }
    }
}

fn existing_disk<'a>(tree: &'a DeviceTree, name: &str) -> ActionResult<&'a Disk> {
    let disk = tree
        .find_disk(name)
        .ok_or_else(|| ActionError::UnknownDisk(name.to_string()))?;
    if disk.table.is_none() {
        return Err(ActionError::NoPartitionTable(name.to_string()));
    }
    Ok(disk)
}

fn existing_partition<'a>(
    tree: &'a DeviceTree,
    name: &str,
) -> ActionResult<(&'a Disk, &'a Partition)> {
    tree.find_partition(name)
        .ok_or_else(|| ActionError::UnknownPartition(name.to_string()))
}

fn existing_volume_group<'a>(tree: &'a DeviceTree, name: &str) -> ActionResult<&'a VolumeGroup> {
    tree.find_volume_group(name)
        .ok_or_else(|| ActionError::UnknownVolumeGroup(name.to_string()))
}

fn existing_logical_volume<'a>(vg: &'a VolumeGroup, name: &str) -> ActionResult<&'a LogicalVolume> {
    vg.find_logical_volume(name)
        .ok_or_else(|| ActionError::UnknownLogicalVolume {
            volume_group: vg.name.clone(),
            name: name.to_string(),
        })
}

fn volume_group_mut<'a>(tree: &'a mut DeviceTree, name: &str) -> ActionResult<&'a mut VolumeGroup> {
    tree.find_volume_group_mut(name)
        .ok_or_else(|| ActionError::UnknownVolumeGroup(name.to_string()))
}

fn volume_group_of_mut<'a>(tree: &'a mut DeviceTree, partition: &str) -> Option<&'a mut VolumeGroup> {
    tree.volume_groups
        .iter_mut()
        .find(|vg| vg.physical_volumes.iter().any(|pv| pv == partition))
}

fn check_fits(size: u64, available: u64) -> ActionResult<()> {
    if size == 0 {
        return Err(ActionError::ZeroSize);
    }
    if size > available {
        return Err(ActionError::InsufficientSpace {
            needed: size,
            available,
        });
    }
    Ok(())
}

/// Start of the first free region that can hold `size` bytes
fn first_fit(disk: &Disk, size: u64) -> ActionResult<u64> {
    if size == 0 {
        return Err(ActionError::ZeroSize);
    }
    let regions = disk.free_regions();
    regions
        .iter()
        .find(|(_, free)| *free >= size)
        .map(|(start, _)| *start)
        .ok_or_else(|| ActionError::InsufficientSpace {
            needed: size,
            available: regions.iter().map(|(_, free)| *free).max().unwrap_or(0),
        })
}

fn check_partition_resize(
    tree: &DeviceTree,
    disk: &Disk,
    partition: &Partition,
    new_size: u64,
) -> ActionResult<()> {
    if new_size == 0 {
        return Err(ActionError::ZeroSize);
    }

    let limit = disk
        .partitions
        .iter()
        .map(|p| p.start)
        .filter(|start| *start > partition.start)
        .min()
        .unwrap_or(disk.size);
    let fits = partition
        .start
        .checked_add(new_size)
        .is_some_and(|end| end <= limit);
    if !fits {
        return Err(ActionError::Overlap {
            partition: partition.name.clone(),
            limit,
        });
    }

    // A physical volume may only shrink into space its group is not using
    if new_size < partition.size
        && let Some(vg) = tree.volume_group_of(&partition.name)
    {
        let shrink = partition.size - new_size;
        if shrink > vg.free_space() {
            return Err(ActionError::InsufficientSpace {
                needed: shrink,
                available: vg.free_space(),
            });
        }
    }
    Ok(())
}

fn check_not_in_use(tree: &DeviceTree, partition: &str) -> ActionResult<()> {
    match tree.volume_group_of(partition) {
        Some(vg) if !vg.logical_volumes.is_empty() => Err(ActionError::PartitionInUse {
            partition: partition.to_string(),
            volume_group: vg.name.clone(),
        }),
        _ => Ok(()),
    }
}

/// Returns the previous size
fn set_partition_size(tree: &mut DeviceTree, name: &str, new_size: u64) -> ActionResult<u64> {
    let partition = tree
        .disks
        .iter_mut()
        .flat_map(|disk| disk.partitions.iter_mut())
        .find(|p| p.name == name)
        .ok_or_else(|| ActionError::UnknownPartition(name.to_string()))?;
    let old_size = partition.size;
    partition.size = new_size;
    Ok(old_size)
}

fn remove_partition(tree: &mut DeviceTree, name: &str) -> ActionResult<Partition> {
    for disk in &mut tree.disks {
        if let Some(index) = disk.partitions.iter().position(|p| p.name == name) {
            return Ok(disk.partitions.remove(index));
        }
    }
    Err(ActionError::UnknownPartition(name.to_string()))
}
