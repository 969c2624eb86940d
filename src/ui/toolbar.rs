use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::{AppConfig, SetSizeUnitRequest};
use crate::devices::{ApplyRequest, ApplyStatus, ClearStagedRequest, DeviceTree, SizeUnit};
use crate::history::{Affordance, DeviceHistory, RedoRequest, UndoRequest};

fn affordance_hint(affordance: Affordance) -> &'static str {
    match affordance {
        Affordance::Undo => "Undo the last staged action (Ctrl+Z)",
        Affordance::Redo => "Redo the last undone action (Ctrl+Y)",
        Affordance::Clear => "Discard every staged action",
        Affordance::Apply => "Write the staged actions to a plan file",
    }
}

/// Main toolbar with the history controls
#[allow(clippy::too_many_arguments)]
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    history: Res<DeviceHistory>,
    tree: Res<DeviceTree>,
    config: Res<AppConfig>,
    mut undo_events: MessageWriter<UndoRequest>,
    mut redo_events: MessageWriter<RedoRequest>,
    mut clear_events: MessageWriter<ClearStagedRequest>,
    mut apply_events: MessageWriter<ApplyRequest>,
    mut unit_events: MessageWriter<SetSizeUnitRequest>,
) -> Result {
    egui::TopBottomPanel::top("main_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 8)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                for affordance in Affordance::all() {
                    let enabled = history.sink().is_enabled(*affordance);
                    let button = egui::Button::new(
                        egui::RichText::new(affordance.display_name()).size(14.0).strong(),
                    )
                    .min_size(egui::vec2(0.0, 28.0));

                    let response = ui
                        .add_enabled(enabled, button)
                        .on_hover_text(affordance_hint(*affordance));
                    if response.clicked() {
                        match affordance {
                            Affordance::Undo => {
                                undo_events.write(UndoRequest);
                            }
                            Affordance::Redo => {
                                redo_events.write(RedoRequest);
                            }
                            Affordance::Clear => {
                                clear_events.write(ClearStagedRequest);
                            }
                            Affordance::Apply => {
                                apply_events.write(ApplyRequest);
                            }
                        }
                    }
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                ui.label(
                    egui::RichText::new(format!(
                        "{} staged · {} undo · {} redo",
                        tree.pending.len(),
                        history.undo_count(),
                        history.redo_count()
                    ))
                    .color(egui::Color32::GRAY),
                );

                // Right-aligned unit selector
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    egui::ComboBox::from_id_salt("size_unit_select")
                        .selected_text(config.data.size_unit.display_name())
                        .width(70.0)
                        .show_ui(ui, |ui| {
                            for unit in SizeUnit::all() {
                                let is_selected = config.data.size_unit == *unit;
                                if ui.selectable_label(is_selected, unit.display_name()).clicked() {
                                    unit_events.write(SetSizeUnitRequest { unit: *unit });
                                }
                            }
                        });
                    ui.label("Units:");
                });
            });
        });
    Ok(())
}

/// Bottom status bar showing the last apply result
pub fn status_bar_ui(mut contexts: EguiContexts, status: Res<ApplyStatus>) -> Result {
    egui::TopBottomPanel::bottom("status_bar").show(contexts.ctx_mut()?, |ui| {
        let text = status.message.as_deref().unwrap_or("Nothing applied yet");
        ui.weak(text);
    });
    Ok(())
}
