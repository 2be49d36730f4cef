use super::state::{Alert, Phase, RenderSurface};
use super::worker::{Command, Event};
use crate::error::{ClientError, ErrorKind};
use crate::upload::{EvaluationResponse, FileProcessor, RedactedFile, SelectedFileSet};
use crate::view::{html, EvaluationCard, RedactedLink, TableFragment};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

const UPLOAD_FALLBACK: &str = "An error occurred while uploading files.";
const EVALUATE_FALLBACK: &str = "An error occurred while evaluating documents.";
const DOWNLOAD_FALLBACK: &str = "Could not download the redacted file.";

/// Owns the selection and the render surface for one window session.
/// Submit operations return the `Command` to hand to the worker; results
/// come back through `apply`.
#[derive(Debug, Default)]
pub struct Controller {
    phase: Phase,
    /// Phase to fall back to if the pending request fails.
    stable: Phase,
    selection: SelectedFileSet,
    surface: RenderSurface,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    pub fn selection(&self) -> &SelectedFileSet {
        &self.selection
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_pending()
    }

    /// Merges `paths` into the selection, skipping names already present.
    /// Returns the number of documents added.
    pub fn select_files<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        if self.is_busy() {
            debug!("Ignoring file selection while a request is in flight");
            return 0;
        }
        let added = self.selection.extend(paths);
        if added > 0 {
            info!(
                "Selected {} new documents ({} total)",
                added,
                self.selection.len()
            );
        }
        self.refresh_selection();
        added
    }

    /// Adds every supported document found under `folder`.
    pub fn add_folder(&mut self, folder: &Path) -> usize {
        if self.is_busy() {
            return 0;
        }
        let documents = FileProcessor::collect_documents(folder);
        if documents.is_empty() {
            self.surface.alert = Some(Alert::info(format!(
                "No PDF or Word documents found in {}.",
                folder.display()
            )));
            return 0;
        }
        self.select_files(documents)
    }

    pub fn remove_file(&mut self, name: &str) {
        if self.is_busy() {
            return;
        }
        if self.selection.remove(name).is_some() {
            debug!("Removed '{}' from the selection", name);
        }
        self.refresh_selection();
    }

    pub fn clear_selection(&mut self) {
        if self.is_busy() {
            return;
        }
        self.selection.clear();
        self.refresh_selection();
    }

    fn refresh_selection(&mut self) {
        self.surface.selected_files.content = self.selection.to_vec();
        self.surface.selected_files.visible = !self.selection.is_empty();

        self.phase = match (self.selection.is_empty(), self.phase) {
            (false, _) => Phase::FilesSelected,
            (true, Phase::FilesSelected) => Phase::Idle,
            (true, phase) => phase,
        };
    }

    pub fn submit_upload(&mut self) -> Option<Command> {
        if self.reject_if_busy() {
            return None;
        }
        if self.selection.is_empty() {
            warn!("Upload requested with no documents selected");
            self.report(&ClientError::NoFilesSelected, UPLOAD_FALLBACK);
            return None;
        }

        self.begin(Phase::Uploading);
        info!("Submitting {} documents for redaction", self.selection.len());
        Some(Command::Upload(self.selection.to_vec()))
    }

    pub fn submit_evaluation_criteria(&mut self, criteria: PathBuf) -> Option<Command> {
        if self.reject_if_busy() {
            return None;
        }

        self.begin(Phase::EvaluationPending);
        info!("Submitting evaluation criteria {}", criteria.display());
        Some(Command::Evaluate(criteria))
    }

    /// Downloads are independent of the upload/evaluate flow and do not touch
    /// the busy indicator.
    pub fn download_redacted(&self, file: RedactedFile, dest_dir: PathBuf) -> Command {
        info!(
            "Downloading redacted text for '{}' into {}",
            file.document,
            dest_dir.display()
        );
        Command::Download { file, dest_dir }
    }

    pub fn apply(&mut self, event: Event) {
        match event {
            Event::UploadFinished(Ok(files)) => self.finish_upload(files),
            Event::UploadFinished(Err(e)) => self.fail(&e, UPLOAD_FALLBACK),
            Event::EvaluationFinished(Ok(response)) => self.finish_evaluation(response),
            Event::EvaluationFinished(Err(e)) => self.fail(&e, EVALUATE_FALLBACK),
            Event::DownloadFinished(Ok(saved)) => {
                self.surface.alert = Some(Alert::info(format!(
                    "Saved redacted text for {} to {}.",
                    saved.document,
                    saved.path.display()
                )));
            }
            Event::DownloadFinished(Err(e)) => self.report(&e, DOWNLOAD_FALLBACK),
        }
    }

    /// Shows a notice raised outside the request flow, e.g. a local I/O
    /// failure while exporting.
    pub fn notify(&mut self, alert: Alert) {
        self.surface.alert = Some(alert);
    }

    pub fn dismiss_alert(&mut self) {
        self.surface.alert = None;
    }

    /// HTML page of the current evaluation, if there is one.
    pub fn export_report(&self) -> Option<String> {
        if !self.surface.has_evaluation() {
            return None;
        }
        Some(html::render_report(
            &self.surface.evaluation_cards.content,
            self.surface.summary_table.content.as_ref(),
            self.surface.yes_no_table.content.as_ref(),
        ))
    }

    /// Back to an empty window. Ignored while a request is in flight.
    pub fn reset(&mut self) {
        if self.is_busy() {
            return;
        }
        info!("Resetting session");
        *self = Self::default();
    }

    fn begin(&mut self, pending: Phase) {
        self.stable = self.phase;
        self.phase = pending;
        self.surface.busy = true;
        self.surface.alert = None;
    }

    fn finish_upload(&mut self, files: Vec<RedactedFile>) {
        info!("Upload finished with {} redacted files", files.len());
        let links: Vec<RedactedLink> = files.into_iter().map(RedactedLink::from).collect();
        self.surface.redacted_links.show(links);

        self.selection.clear();
        self.surface.selected_files.content.clear();
        self.surface.selected_files.visible = false;

        self.surface.busy = false;
        self.phase = Phase::Uploaded;
    }

    fn finish_evaluation(&mut self, response: EvaluationResponse) {
        info!("Rendering {} evaluations", response.evaluations.len());
        let cards = response
            .evaluations
            .iter()
            .map(EvaluationCard::from_record)
            .collect();
        self.surface.evaluation_cards.show(cards);

        let summary = TableFragment::from_optional(response.evaluation_table.as_deref());
        self.surface.summary_table.visible = summary.is_some();
        self.surface.summary_table.content = summary;

        let yes_no = TableFragment::from_optional(response.yes_no_table.as_deref());
        self.surface.yes_no_table.visible = yes_no.is_some();
        self.surface.yes_no_table.content = yes_no;

        self.surface.upload_form.visible = false;
        self.surface.selected_files.visible = false;
        self.surface.redacted_links.visible = false;

        self.surface.busy = false;
        self.phase = Phase::Evaluated;
    }

    fn fail(&mut self, err: &ClientError, fallback: &str) {
        match err.kind() {
            ErrorKind::Shape => error!("Invalid response format: {}", err),
            _ => error!("Request failed: {}", err),
        }
        self.report(err, fallback);
        self.surface.busy = false;
        self.phase = self.stable;
    }

    fn report(&mut self, err: &ClientError, fallback: &str) {
        self.surface.alert = Some(Alert::error(err.user_message(fallback)));
    }

    fn reject_if_busy(&mut self) -> bool {
        if self.is_busy() {
            warn!("Rejected submit while {:?} is in flight", self.phase);
            self.report(&ClientError::Busy, "");
            return true;
        }
        false
    }
}
