//! Device listing and the controls for staging changes.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::AppConfig;
use crate::devices::{
    format_size, DeviceTree, Disk, SizeUnit, StageActionRequest, StagedAction, VolumeGroup,
};

/// Inputs shared by every create/resize button
#[derive(Resource)]
pub struct StagingInputs {
    /// In the configured unit (MiB for Auto)
    pub size: f64,
    pub filesystem: String,
    pub lv_name: String,
}

impl Default for StagingInputs {
    fn default() -> Self {
        Self {
            size: 1024.0,
            filesystem: "ext4".to_string(),
            lv_name: "data".to_string(),
        }
    }
}

impl StagingInputs {
    pub fn size_bytes(&self, unit: SizeUnit) -> u64 {
        (self.size.max(0.0) * unit.bytes() as f64) as u64
    }

    pub fn filesystem(&self) -> Option<String> {
        let trimmed = self.filesystem.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

pub fn device_panel_ui(
    mut contexts: EguiContexts,
    tree: Res<DeviceTree>,
    config: Res<AppConfig>,
    mut inputs: ResMut<StagingInputs>,
    mut stage_events: MessageWriter<StageActionRequest>,
) -> Result {
    let unit = config.data.size_unit;
    let mut requested = Vec::new();

    egui::CentralPanel::default().show(contexts.ctx_mut()?, |ui| {
        render_inputs(ui, &mut inputs, unit);
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.heading("Disks");
            for disk in &tree.disks {
                render_disk(ui, disk, &inputs, unit, &mut requested);
            }

            ui.add_space(12.0);
            ui.heading("Volume groups");
            if tree.volume_groups.is_empty() {
                ui.weak("No volume groups");
            }
            for vg in &tree.volume_groups {
                render_volume_group(ui, vg, &inputs, unit, &mut requested);
            }
        });
    });

    for action in requested {
        stage_events.write(StageActionRequest { action });
    }
    Ok(())
}

fn render_inputs(ui: &mut egui::Ui, inputs: &mut StagingInputs, unit: SizeUnit) {
    let unit_label = match unit {
        SizeUnit::Auto => SizeUnit::MiB.display_name(),
        other => other.display_name(),
    };

    ui.horizontal(|ui| {
        ui.label("Size:");
        ui.add(
            egui::DragValue::new(&mut inputs.size)
                .speed(16.0)
                .range(0.0..=f64::MAX)
                .suffix(format!(" {}", unit_label)),
        );
        ui.add_space(8.0);
        ui.label("Filesystem:");
        ui.add(egui::TextEdit::singleline(&mut inputs.filesystem).desired_width(80.0));
        ui.add_space(8.0);
        ui.label("LV name:");
        ui.add(egui::TextEdit::singleline(&mut inputs.lv_name).desired_width(80.0));
    });
}

fn render_disk(
    ui: &mut egui::Ui,
    disk: &Disk,
    inputs: &StagingInputs,
    unit: SizeUnit,
    requested: &mut Vec<StagedAction>,
) {
    let table = disk.table.map_or("no partition table", |t| t.display_name());
    let header = format!(
        "{}  {}  [{}]",
        disk.display_name(),
        format_size(disk.size, unit),
        table
    );

    egui::CollapsingHeader::new(header)
        .id_salt(&disk.name)
        .default_open(true)
        .show(ui, |ui| {
            for partition in &disk.partitions {
                ui.horizontal(|ui| {
                    ui.monospace(&partition.name);
                    ui.label(format_size(partition.size, unit));
                    ui.weak(partition.filesystem.as_deref().unwrap_or("unformatted"));

                    if ui.small_button("Resize").clicked() {
                        requested.push(StagedAction::ResizePartition {
                            partition: partition.name.clone(),
                            new_size: inputs.size_bytes(unit),
                        });
                    }
                    if ui.small_button("Delete").clicked() {
                        requested.push(StagedAction::DeletePartition {
                            partition: partition.name.clone(),
                        });
                    }
                });
            }

            if disk.table.is_some() {
                let free = disk.free_space();
                ui.horizontal(|ui| {
                    ui.weak(format!("Free space: {}", format_size(free, unit)));
                    if ui
                        .add_enabled(free > 0, egui::Button::new("New partition").small())
                        .clicked()
                    {
                        requested.push(StagedAction::CreatePartition {
                            disk: disk.name.clone(),
                            size: inputs.size_bytes(unit),
                            filesystem: inputs.filesystem(),
                        });
                    }
                });
            }
        });
}

fn render_volume_group(
    ui: &mut egui::Ui,
    vg: &VolumeGroup,
    inputs: &StagingInputs,
    unit: SizeUnit,
    requested: &mut Vec<StagedAction>,
) {
    let header = format!(
        "{}  {} ({} free)",
        vg.name,
        format_size(vg.size, unit),
        format_size(vg.free_space(), unit)
    );

    egui::CollapsingHeader::new(header)
        .id_salt(("vg", &vg.name))
        .default_open(true)
        .show(ui, |ui| {
            ui.weak(format!("Physical volumes: {}", vg.physical_volumes.join(", ")));

            for lv in &vg.logical_volumes {
                ui.horizontal(|ui| {
                    ui.monospace(vg.logical_volume_path(lv));
                    ui.label(format_size(lv.size, unit));
                    ui.weak(lv.filesystem.as_deref().unwrap_or("unformatted"));

                    if ui.small_button("Resize").clicked() {
                        requested.push(StagedAction::ResizeLogicalVolume {
                            volume_group: vg.name.clone(),
                            name: lv.name.clone(),
                            new_size: inputs.size_bytes(unit),
                        });
                    }
                    if ui.small_button("Delete").clicked() {
                        requested.push(StagedAction::DeleteLogicalVolume {
                            volume_group: vg.name.clone(),
                            name: lv.name.clone(),
                        });
                    }
                });
            }

            if ui
                .add_enabled(
                    vg.free_space() > 0,
                    egui::Button::new("New logical volume").small(),
                )
                .clicked()
            {
                requested.push(StagedAction::CreateLogicalVolume {
                    volume_group: vg.name.clone(),
                    name: inputs.lv_name.trim().to_string(),
                    size: inputs.size_bytes(unit),
                    filesystem: inputs.filesystem(),
                });
            }
        });
}

/// Right-hand list of everything staged since the last apply
pub fn pending_panel_ui(mut contexts: EguiContexts, tree: Res<DeviceTree>) -> Result {
    egui::SidePanel::right("pending_panel")
        .default_width(260.0)
        .show(contexts.ctx_mut()?, |ui| {
            ui.heading("Pending actions");
            ui.separator();

            if tree.pending.is_empty() {
                ui.weak("Nothing staged");
                return;
            }

            for (index, action) in tree.pending.iter().enumerate() {
                ui.label(format!("{}. {}", index + 1, action.describe()));
            }
        });
    Ok(())
}
