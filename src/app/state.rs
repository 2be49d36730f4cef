use crate::upload::SelectedFile;
use crate::view::{EvaluationCard, RedactedLink, TableFragment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    FilesSelected,
    Uploading,
    Uploaded,
    EvaluationPending,
    Evaluated,
}

impl Phase {
    pub fn is_pending(self) -> bool {
        matches!(self, Phase::Uploading | Phase::EvaluationPending)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "Select documents to upload",
            Phase::FilesSelected => "Ready to upload",
            Phase::Uploading => "Uploading and redacting...",
            Phase::Uploaded => "Documents redacted",
            Phase::EvaluationPending => "Evaluating...",
            Phase::Evaluated => "Evaluation complete",
        }
    }
}

/// A named area of the window that can be shown or hidden.
#[derive(Debug, Clone, PartialEq)]
pub struct Region<T> {
    pub visible: bool,
    pub content: T,
}

impl<T: Default> Default for Region<T> {
    fn default() -> Self {
        Self {
            visible: false,
            content: T::default(),
        }
    }
}

impl<T> Region<T> {
    pub fn visible(content: T) -> Self {
        Self {
            visible: true,
            content,
        }
    }

    pub fn show(&mut self, content: T) {
        self.content = content;
        self.visible = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

impl Alert {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Error,
            message: message.into(),
        }
    }
}

/// Everything the window shows. Only the controller writes to it.
#[derive(Debug, Clone)]
pub struct RenderSurface {
    pub upload_form: Region<()>,
    pub selected_files: Region<Vec<SelectedFile>>,
    pub redacted_links: Region<Vec<RedactedLink>>,
    pub evaluation_cards: Region<Vec<EvaluationCard>>,
    pub summary_table: Region<Option<TableFragment>>,
    pub yes_no_table: Region<Option<TableFragment>>,
    pub busy: bool,
    pub alert: Option<Alert>,
}

impl Default for RenderSurface {
    fn default() -> Self {
        Self {
            upload_form: Region::visible(()),
            selected_files: Region::default(),
            redacted_links: Region::default(),
            evaluation_cards: Region::default(),
            summary_table: Region::default(),
            yes_no_table: Region::default(),
            busy: false,
            alert: None,
        }
    }
}

impl RenderSurface {
    pub fn has_evaluation(&self) -> bool {
        self.evaluation_cards.visible && !self.evaluation_cards.content.is_empty()
    }
}
