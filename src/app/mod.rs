pub mod controller;
pub mod state;
mod ui;
pub mod worker;

use crate::config::AppConfig;
use crate::upload::{FileProcessor, RedactedFile, CRITERIA_EXTENSIONS, DOCUMENT_EXTENSIONS};
use controller::Controller;
use eframe::{egui, App};
use rfd::FileDialog;
use state::Alert;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info, warn};
use worker::Command;
pub use worker::Worker;

const REPORT_FILE_NAME: &str = "evaluation-report.html";

/// Something the user clicked during a frame, handled once drawing is done.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    PickDocuments,
    AddFolder,
    RemoveFile(String),
    ClearSelection,
    Upload,
    PickCriteria,
    OpenLink(RedactedFile),
    SaveLink(RedactedFile),
    ExportReport,
    Reset,
    DismissAlert,
}

pub struct RedactionUploader {
    controller: Controller,
    worker: Worker,
    config: AppConfig,
}

impl RedactionUploader {
    pub fn new(cc: &eframe::CreationContext<'_>, worker: Worker, config: AppConfig) -> Self {
        info!("Initializing redaction uploader for {}", config.server_url);
        worker.attach_repaint(cc.egui_ctx.clone());
        Self {
            controller: Controller::new(),
            worker,
            config,
        }
    }

    fn dispatch(&mut self, command: Command) {
        if let Err(event) = self.worker.dispatch(command) {
            error!("Worker is gone, dropping command");
            self.controller.apply(event);
        }
    }

    pub fn update_state(&mut self) {
        while let Some(event) = self.worker.try_recv() {
            self.controller.apply(event);
        }
    }

    fn handle(&mut self, action: UiAction) {
        match action {
            UiAction::PickDocuments => {
                if let Some(paths) = FileDialog::new()
                    .add_filter("Documents", &DOCUMENT_EXTENSIONS)
                    .pick_files()
                {
                    self.controller.select_files(paths);
                }
            }
            UiAction::AddFolder => {
                if let Some(folder) = FileDialog::new().pick_folder() {
                    self.controller.add_folder(&folder);
                }
            }
            UiAction::RemoveFile(name) => self.controller.remove_file(&name),
            UiAction::ClearSelection => self.controller.clear_selection(),
            UiAction::Upload => {
                if let Some(command) = self.controller.submit_upload() {
                    self.dispatch(command);
                }
            }
            UiAction::PickCriteria => {
                let Some(path) = FileDialog::new()
                    .add_filter("Evaluation criteria", &CRITERIA_EXTENSIONS)
                    .pick_file()
                else {
                    return;
                };
                if !FileProcessor::is_supported_criteria(&path) {
                    warn!("Sending criteria with unexpected type: {}", path.display());
                }
                if let Some(command) = self.controller.submit_evaluation_criteria(path) {
                    self.dispatch(command);
                }
            }
            UiAction::OpenLink(file) => self.open_link(&file),
            UiAction::SaveLink(file) => {
                if let Some(dest_dir) = FileDialog::new().pick_folder() {
                    let command = self.controller.download_redacted(file, dest_dir);
                    self.dispatch(command);
                }
            }
            UiAction::ExportReport => self.export_report(),
            UiAction::Reset => self.controller.reset(),
            UiAction::DismissAlert => self.controller.dismiss_alert(),
        }
    }

    fn open_link(&mut self, file: &RedactedFile) {
        let result = self
            .config
            .resolve(&file.redacted_text_file)
            .map_err(|e| e.to_string())
            .and_then(|url| open::that(url.as_str()).map_err(|e| e.to_string()));
        if let Err(e) = result {
            error!("Failed to open {}: {}", file.redacted_text_file, e);
            self.controller
                .notify(Alert::error(format!("Could not open {}.", file.document)));
        }
    }

    fn export_report(&mut self) {
        let Some(report) = self.controller.export_report() else {
            return;
        };
        let path: PathBuf = std::env::temp_dir().join(REPORT_FILE_NAME);
        if let Err(e) = fs::write(&path, report) {
            error!("Failed to write report to {}: {}", path.display(), e);
            self.controller
                .notify(Alert::error("Could not write the evaluation report."));
            return;
        }
        info!("Wrote evaluation report to {}", path.display());
        if let Err(e) = open::that(&path) {
            warn!("Failed to open report in browser: {}", e);
            self.controller.notify(Alert::info(format!(
                "Report saved to {}.",
                path.display()
            )));
        }
    }
}

impl App for RedactionUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state();
        let actions = ui::render(ctx, &self.controller, &self.config);
        for action in actions {
            self.handle(action);
        }
    }
}
