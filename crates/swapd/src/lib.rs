use std::path::PathBuf;

use swapcore_config::Settings;
use swapcore_copy::{run_batch, BatchReport, CopyError, FileCopier};
use swapcore_project::{project_text, InputFile, ProjectError};
use tracing::{debug, info};

pub const READY_LABEL: &str = "Create files!";
pub const NOT_READY_LABEL: &str = "Select a file and enter names";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("select a file and enter names first")]
    NotReady,
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Copy(#[from] CopyError),
}

/// Everything the window renders. Derived fields are rebuilt from `input_file` and
/// `names_text` on every change.
#[derive(Debug, Default)]
pub struct Session {
    pub settings: Settings,
    input_file: Option<InputFile>,
    names_text: String,
    preview: Vec<String>,
    report: Option<BatchReport>,
    status: Option<String>,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn input_file(&self) -> Option<&InputFile> {
        self.input_file.as_ref()
    }

    pub fn names_text(&self) -> &str {
        &self.names_text
    }

    pub fn preview(&self) -> &[String] {
        &self.preview
    }

    pub fn report(&self) -> Option<&BatchReport> {
        self.report.as_ref()
    }

    /// `None` means the picker was cancelled and the current selection stays.
    pub fn select_input_file(&mut self, path: Option<PathBuf>) -> Result<(), SessionError> {
        let Some(path) = path else {
            debug!("file selection cancelled");
            return Ok(());
        };

        match InputFile::new(path) {
            Ok(input) => {
                info!(path = %input.path().display(), "input file selected");
                self.input_file = Some(input);
                self.refresh_preview();
                Ok(())
            }
            Err(error) => {
                self.report = None;
                self.status = Some(error.to_string());
                Err(error.into())
            }
        }
    }

    pub fn set_names_text(&mut self, text: impl Into<String>) {
        self.names_text = text.into();
        self.refresh_preview();
    }

    pub fn can_execute(&self) -> bool {
        self.input_file.is_some() && !self.names_text.is_empty()
    }

    pub fn action_label(&self) -> &'static str {
        if self.can_execute() {
            READY_LABEL
        } else {
            NOT_READY_LABEL
        }
    }

    pub fn input_label(&self) -> String {
        match &self.input_file {
            Some(input) => format!("Input File: {}", input.path().display()),
            None => "Input File:".to_string(),
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Copies the input file once per previewed name, replacing any previous report.
    pub fn execute<C: FileCopier>(&mut self, copier: &C) -> Result<&BatchReport, SessionError> {
        let Some(input) = self.input_file.as_ref().filter(|_| self.can_execute()) else {
            return Err(SessionError::NotReady);
        };

        info!(
            source = %input.path().display(),
            entries = self.preview.len(),
            policy = ?self.settings.failure_policy,
            "creating files"
        );
        let report = match run_batch(
            copier,
            input.path(),
            &self.preview,
            self.settings.failure_policy,
        ) {
            Ok(report) => report,
            Err(error) => {
                self.report = None;
                self.status = Some(error.to_string());
                return Err(error.into());
            }
        };

        self.status = Some(report.summary());
        Ok(&*self.report.insert(report))
    }

    fn refresh_preview(&mut self) {
        self.preview = match (&self.input_file, self.names_text.is_empty()) {
            (_, true) => Vec::new(),
            (Some(input), false) => project_text(input, &self.names_text),
            (None, false) => Vec::new(),
        };
        debug!(entries = self.preview.len(), "preview refreshed");
    }
}
