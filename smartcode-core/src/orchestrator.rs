//! Review/generate state machine.
//!
//! ```text
//! Idle ──submit──▶ Submitting ──ok──▶ Succeeded ──submit──▶ Submitting …
//!                       └──err──▶ Failed ─────submit──▶ Submitting …
//! ```
//!
//! The orchestrator owns the authoritative code text. A submission is split in
//! two halves so the UI loop never blocks on the network: [`Orchestrator::begin_submit`]
//! validates and returns a [`Submission`] to run elsewhere, and
//! [`Orchestrator::complete`] applies its result. [`Orchestrator::submit`] runs both
//! halves inline.

use std::path::Path;

use crate::api::ReviewBackend;
use crate::error::{Result, ValidationError};
use crate::types::{GenerationResult, Language, ReviewResult};
use crate::upload::FileUpload;

/// Which kind of output a submit produces.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Review,
    Generate,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Review => Mode::Generate,
            Mode::Generate => Mode::Review,
        }
    }
}

/// Lifecycle of the most recent submission.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// The one active result. Setting either kind replaces the other.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Outcome {
    #[default]
    None,
    Review(ReviewResult),
    Generation(GenerationResult),
}

impl Outcome {
    pub fn review(&self) -> Option<&ReviewResult> {
        match self {
            Outcome::Review(r) => Some(r),
            _ => None,
        }
    }

    pub fn generation(&self) -> Option<&GenerationResult> {
        match self {
            Outcome::Generation(g) => Some(g),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Outcome::None)
    }
}

/// Remote actions, each with its own fallback error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Review,
    FileAnalysis,
    Generation,
    Chat,
}

impl Action {
    pub fn fallback_message(self) -> &'static str {
        match self {
            Action::Review => "Failed to review code",
            Action::FileAnalysis => "Failed to analyze file",
            Action::Generation => "Failed to generate code",
            Action::Chat => "Failed to get chat response",
        }
    }
}

/// A validated request, ready to run against a [`ReviewBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Review { code: String, language: Language },
    ReviewFile(FileUpload),
    Generate { prompt: String, language: Language },
}

/// Successful payload of a [`Submission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutput {
    Review(ReviewResult),
    Generation(GenerationResult),
}

impl Submission {
    pub fn action(&self) -> Action {
        match self {
            Submission::Review { .. } => Action::Review,
            Submission::ReviewFile(_) => Action::FileAnalysis,
            Submission::Generate { .. } => Action::Generation,
        }
    }

    /// Performs the remote call.
    pub async fn execute<B: ReviewBackend>(&self, backend: &B) -> Result<SubmissionOutput> {
        match self {
            Submission::Review { code, language } => backend
                .review_code(code, language.id())
                .await
                .map(SubmissionOutput::Review),
            Submission::ReviewFile(upload) => {
                backend.review_file(upload).await.map(SubmissionOutput::Review)
            }
            Submission::Generate { prompt, language } => backend
                .generate_code(prompt, language.id())
                .await
                .map(SubmissionOutput::Generation),
        }
    }
}

/// Client-held record of mode, inputs, loading state and latest result/error.
#[derive(Debug, Default)]
pub struct Orchestrator {
    code: String,
    language: Language,
    mode: Mode,
    phase: Phase,
    pending: Option<Action>,
    error: Option<String>,
    outcome: Outcome,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Change callback of the code surface: replaces the whole text.
    pub fn set_code(&mut self, code: String) {
        self.code = code;
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        if !self.is_loading() {
            self.language = language;
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_loading() && !self.code.trim().is_empty()
    }

    /// Switches mode, clearing the outcome and error. Ignored while loading.
    ///
    /// Returns `true` if the mode changed.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if self.is_loading() || self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.outcome = Outcome::None;
        self.error = None;
        self.phase = Phase::Idle;
        true
    }

    /// Dismisses the error banner.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Shows a previously stored review (history selection) in review mode.
    pub fn show_review(&mut self, review: ReviewResult) {
        if self.is_loading() {
            return;
        }
        self.mode = Mode::Review;
        self.error = None;
        self.outcome = Outcome::Review(review);
    }

    /// Loads a server session's code and review into the view.
    pub fn open_session(&mut self, code: String, review: ReviewResult) {
        if self.is_loading() {
            return;
        }
        if let Some(language) = Language::from_id(&review.language) {
            self.language = language;
        }
        self.code = code;
        self.show_review(review);
    }

    /// Validates the current inputs and enters `Submitting`.
    ///
    /// Returns `None` without any state change while a submission is in flight,
    /// and `None` with the error set when the code or prompt is blank.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.is_loading() {
            return None;
        }
        if self.code.trim().is_empty() {
            let err = match self.mode {
                Mode::Review => ValidationError::EmptyCode,
                Mode::Generate => ValidationError::EmptyPrompt,
            };
            self.reject(err);
            return None;
        }
        let submission = match self.mode {
            Mode::Review => Submission::Review { code: self.code.clone(), language: self.language },
            Mode::Generate => {
                Submission::Generate { prompt: self.code.clone(), language: self.language }
            }
        };
        self.enter_submitting(submission.action());
        Some(submission)
    }

    /// File entry point: validates and loads `path`, previews it, and enters `Submitting`.
    ///
    /// The preview text replaces the code field and the inferred language
    /// replaces the selection; the raw bytes are what gets submitted.
    pub fn begin_file_submit(&mut self, path: &Path) -> Option<Submission> {
        if self.is_loading() {
            return None;
        }
        if self.mode == Mode::Generate {
            self.reject(ValidationError::UploadInGenerateMode);
            return None;
        }
        let upload = match FileUpload::from_path(path) {
            Ok(upload) => upload,
            Err(e) => {
                tracing::info!("file rejected: {e}");
                self.error = Some(e.user_message("Failed to read file"));
                return None;
            }
        };
        self.language = upload.language;
        self.code = upload.preview_text();
        let submission = Submission::ReviewFile(upload);
        self.enter_submitting(submission.action());
        Some(submission)
    }

    /// Applies the result of the in-flight submission.
    ///
    /// A result arriving while nothing is in flight is ignored.
    pub fn complete(&mut self, result: Result<SubmissionOutput>) {
        let Some(action) = self.pending.take() else {
            tracing::debug!("ignoring result with no submission in flight");
            return;
        };
        match result {
            Ok(SubmissionOutput::Review(review)) => {
                self.outcome = Outcome::Review(review);
                self.phase = Phase::Succeeded;
            }
            Ok(SubmissionOutput::Generation(generation)) => {
                self.outcome = Outcome::Generation(generation);
                self.phase = Phase::Succeeded;
            }
            Err(e) => {
                tracing::warn!(?action, "submission failed: {e}");
                self.error = Some(e.user_message(action.fallback_message()));
                self.phase = Phase::Failed;
            }
        }
    }

    /// Runs a whole review cycle inline.
    ///
    /// Returns the new outcome on success, `None` on rejection or failure.
    pub async fn submit<B: ReviewBackend>(&mut self, backend: &B) -> Option<&Outcome> {
        let submission = self.begin_submit()?;
        let result = submission.execute(backend).await;
        self.complete(result);
        (self.phase == Phase::Succeeded).then_some(&self.outcome)
    }

    /// The previous outcome is dropped so a settled cycle holds exactly one
    /// of result or error.
    fn enter_submitting(&mut self, action: Action) {
        self.phase = Phase::Submitting;
        self.pending = Some(action);
        self.error = None;
        self.outcome = Outcome::None;
    }

    fn reject(&mut self, err: ValidationError) {
        self.error = Some(err.to_string());
    }
}
