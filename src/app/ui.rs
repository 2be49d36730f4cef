use super::controller::Controller;
use super::state::{AlertLevel, Region, RenderSurface};
use super::UiAction;
use crate::config::AppConfig;
use crate::utils::file_size::FileSizeUtils;
use crate::view::{EvaluationCard, Segment, TableFragment};
use egui::{self, text::LayoutJob, Align, Color32, FontId, RichText, TextFormat};

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);
const PAGE_REF_BACKGROUND: Color32 = Color32::from_rgb(255, 243, 160);
const ERROR_RED: Color32 = Color32::from_rgb(220, 50, 50);

pub fn render(ctx: &egui::Context, controller: &Controller, config: &AppConfig) -> Vec<UiAction> {
    let mut actions = Vec::new();
    let surface = controller.surface();
    let busy = controller.is_busy();

    egui::CentralPanel::default().show(ctx, |ui| {
        let footer_height = 30.0;
        let content_height = ui.available_height() - footer_height;

        egui::ScrollArea::vertical()
            .max_height(content_height)
            .show(ui, |ui| {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.heading("Document Redaction & Evaluation");
                    ui.add_space(5.0);
                    ui.label(
                        RichText::new("Redact tender responses, then score them against your criteria")
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                });
                ui.add_space(20.0);

                if surface.upload_form.visible {
                    render_upload_form(ui, controller, busy, &mut actions);
                    ui.add_space(20.0);
                }

                if surface.redacted_links.visible {
                    render_redacted_links(ui, surface, config, &mut actions);
                    ui.add_space(20.0);
                }

                ui.vertical_centered(|ui| {
                    ui.add_enabled_ui(!busy, |ui| {
                        let button = egui::Button::new("📊 Evaluate with Criteria...")
                            .min_size(egui::vec2(200.0, 32.0));
                        if ui.add(button).clicked() {
                            actions.push(UiAction::PickCriteria);
                        }
                    });
                });
                ui.add_space(20.0);

                if surface.evaluation_cards.visible {
                    render_evaluation(ui, surface, busy, &mut actions);
                }
            });

        ui.with_layout(egui::Layout::bottom_up(Align::Center), |ui| {
            render_footer(ui, controller);
        });
    });

    if let Some(alert) = &surface.alert {
        let (title, color) = match alert.level {
            AlertLevel::Info => ("Notice", ui_text_color(ctx)),
            AlertLevel::Error => ("Error", ERROR_RED),
        };
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.colored_label(color, &alert.message);
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        actions.push(UiAction::DismissAlert);
                    }
                });
            });
    }

    actions
}

fn ui_text_color(ctx: &egui::Context) -> Color32 {
    ctx.style().visuals.text_color()
}

fn render_upload_form(
    ui: &mut egui::Ui,
    controller: &Controller,
    busy: bool,
    actions: &mut Vec<UiAction>,
) {
    let surface = controller.surface();
    ui.group(|ui| {
        ui.label("Documents to redact (PDF or Word)");
        ui.add_space(8.0);
        ui.add_enabled_ui(!busy, |ui| {
            ui.horizontal(|ui| {
                if ui.button("📄 Select Documents").clicked() {
                    actions.push(UiAction::PickDocuments);
                }
                if ui.button("📁 Add Folder").clicked() {
                    actions.push(UiAction::AddFolder);
                }
                if surface.selected_files.visible && ui.button("🗑 Clear").clicked() {
                    actions.push(UiAction::ClearSelection);
                }
            });

            if surface.selected_files.visible {
                ui.add_space(8.0);
                egui::ScrollArea::vertical()
                    .id_source("selected_files")
                    .max_height(160.0)
                    .show(ui, |ui| {
                        for file in &surface.selected_files.content {
                            ui.horizontal(|ui| {
                                if ui.small_button("✖").on_hover_text("Remove").clicked() {
                                    actions.push(UiAction::RemoveFile(file.name.clone()));
                                }
                                ui.label(&file.name);
                                ui.label(
                                    RichText::new(FileSizeUtils::format_size(file.size))
                                        .color(ui.visuals().text_color().gamma_multiply(0.6)),
                                );
                            });
                        }
                    });
                let selection = controller.selection();
                ui.label(FileSizeUtils::describe_selection(
                    selection.len(),
                    selection.total_size(),
                ));
            }
        });
    });

    ui.add_space(12.0);
    ui.vertical_centered(|ui| {
        ui.add_enabled_ui(!busy, |ui| {
            let button =
                egui::Button::new("📤 Upload & Redact").min_size(egui::vec2(200.0, 40.0));
            if ui.add(button).clicked() {
                actions.push(UiAction::Upload);
            }
        });
    });
}

fn render_redacted_links(
    ui: &mut egui::Ui,
    surface: &RenderSurface,
    config: &AppConfig,
    actions: &mut Vec<UiAction>,
) {
    ui.group(|ui| {
        ui.label(RichText::new("Redacted Files").strong());
        ui.add_space(6.0);
        if surface.redacted_links.content.is_empty() {
            ui.label("The server returned no redacted files.");
        }
        for link in &surface.redacted_links.content {
            ui.horizontal(|ui| {
                match config.resolve(&link.file.redacted_text_file) {
                    Ok(url) => {
                        if ui
                            .link(RichText::new(&link.label).color(ACCENT))
                            .on_hover_text(url.as_str())
                            .clicked()
                        {
                            actions.push(UiAction::OpenLink(link.file.clone()));
                        }
                    }
                    Err(_) => {
                        ui.label(&link.label);
                    }
                }
                if ui.small_button("💾 Save").clicked() {
                    actions.push(UiAction::SaveLink(link.file.clone()));
                }
            });
        }
    });
}

fn render_evaluation(
    ui: &mut egui::Ui,
    surface: &RenderSurface,
    busy: bool,
    actions: &mut Vec<UiAction>,
) {
    ui.horizontal(|ui| {
        ui.heading("Evaluation Results");
        ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
            ui.add_enabled_ui(!busy, |ui| {
                if ui.button("🔄 Start Over").clicked() {
                    actions.push(UiAction::Reset);
                }
            });
            if !surface.evaluation_cards.content.is_empty()
                && ui.button("🌐 Open Report").clicked()
            {
                actions.push(UiAction::ExportReport);
            }
        });
    });
    ui.add_space(10.0);

    if surface.evaluation_cards.content.is_empty() {
        ui.label("No documents were evaluated.");
    }
    for card in &surface.evaluation_cards.content {
        render_card(ui, card);
        ui.add_space(12.0);
    }

    if let Some(table) = visible_table(&surface.summary_table) {
        ui.label(RichText::new("Evaluation Summary").strong());
        render_table(ui, "summary_table", table);
        ui.add_space(12.0);
    }
    if let Some(table) = visible_table(&surface.yes_no_table) {
        ui.label(RichText::new("Compliance Checklist").strong());
        render_table(ui, "yes_no_table", table);
    }
}

fn visible_table(region: &Region<Option<TableFragment>>) -> Option<&TableFragment> {
    region.content.as_ref().filter(|_| region.visible)
}

fn render_card(ui: &mut egui::Ui, card: &EvaluationCard) {
    egui::Frame::group(ui.style())
        .fill(ui.visuals().extreme_bg_color)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(&card.title).heading().color(ACCENT));
            ui.add_space(6.0);

            let text_color = ui.visuals().text_color();
            let mut job = LayoutJob::default();
            job.wrap.max_width = ui.available_width();
            for segment in &card.segments {
                match segment {
                    Segment::Text(text) => job.append(
                        text,
                        0.0,
                        TextFormat {
                            font_id: FontId::proportional(14.0),
                            color: text_color,
                            ..Default::default()
                        },
                    ),
                    Segment::PageRef(marker) => job.append(
                        marker,
                        0.0,
                        TextFormat {
                            font_id: FontId::proportional(14.0),
                            color: Color32::BLACK,
                            background: PAGE_REF_BACKGROUND,
                            ..Default::default()
                        },
                    ),
                }
            }
            ui.label(job);
        });
}

fn render_table(ui: &mut egui::Ui, id: &str, table: &TableFragment) {
    if table.rows.is_empty() {
        ui.label(RichText::new(&table.html).monospace());
        return;
    }
    egui::ScrollArea::horizontal().id_source(id).show(ui, |ui| {
        egui::Grid::new(id).striped(true).show(ui, |ui| {
            for (index, row) in table.rows.iter().enumerate() {
                for cell in row {
                    if index == 0 {
                        ui.label(RichText::new(cell).strong());
                    } else {
                        ui.label(cell);
                    }
                }
                ui.end_row();
            }
        });
    });
}

fn render_footer(ui: &mut egui::Ui, controller: &Controller) {
    ui.add_space(6.0);
    ui.horizontal(|ui| {
        if controller.surface().busy {
            ui.spinner();
        }
        ui.label(
            RichText::new(controller.phase().label())
                .color(ui.visuals().text_color().gamma_multiply(0.7)),
        );
    });
}
