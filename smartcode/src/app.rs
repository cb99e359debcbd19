//! Central application state for smartcode.
//!
//! This module owns all mutable UI state: the input mode, which panel has focus,
//! per-panel scroll offsets, the orchestrator holding the code and the active
//! result, the chat transcript and the sessions overlay. No ratatui rendering
//! logic lives here; `app.rs` is read by the render module and mutated by the
//! keybinding dispatcher and by settled API events.

use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use smartcode_core::chat::ChatSession;
use smartcode_core::orchestrator::{Orchestrator, Phase, SubmissionOutput};
use smartcode_core::types::{
    ChatResponse, ReviewResult, SessionDetail, SessionSummary, StoredReview,
};
use smartcode_core::Result;

use crate::ui::code_surface::CodeSurfaceState;

/// Input mode controlling which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Navigation and commands (default).
    #[default]
    Normal,
    /// Keys edit the code surface.
    Editing,
    /// Keys edit the chat input line.
    ChatInput,
    /// Keys edit the file path prompt.
    FilePrompt,
    /// Full-screen help overlay is shown above all panels.
    HelpOverlay,
    /// Confirmation dialog before the review history is cleared.
    ConfirmClear,
    /// Server sessions overlay.
    Sessions,
}

/// Which panel currently has keyboard focus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// Left panel: recent reviews.
    History,
    /// Centre panel: the code surface.
    #[default]
    Editor,
    /// Right panel: review or generated code, plus the chat transcript.
    Output,
}

impl PanelFocus {
    /// Cycle order: `History` → `Output` → `Editor` → `History` (reversed).
    pub fn prev(self) -> Self {
        match self {
            PanelFocus::History => PanelFocus::Output,
            PanelFocus::Editor => PanelFocus::History,
            PanelFocus::Output => PanelFocus::Editor,
        }
    }

    /// Cycle order: `History` → `Editor` → `Output` → `History`.
    pub fn next(self) -> Self {
        match self {
            PanelFocus::History => PanelFocus::Editor,
            PanelFocus::Editor => PanelFocus::Output,
            PanelFocus::Output => PanelFocus::History,
        }
    }
}

/// State of the server sessions overlay.
#[derive(Debug, Default)]
pub struct SessionsView {
    pub items: Vec<SessionSummary>,
    pub list_state: ListState,
    /// A list, open or delete request is in flight.
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionsView {
    pub fn selected(&self) -> Option<&SessionSummary> {
        self.list_state.selected().and_then(|i| self.items.get(i))
    }
}

/// All mutable UI state passed through every render cycle.
pub struct AppState {
    pub mode: Mode,
    pub focus: PanelFocus,

    /// Code, language, mode, loading flag, error and active result.
    pub orchestrator: Orchestrator,
    /// Caret and scroll of the code surface.
    pub editor: CodeSurfaceState,

    /// Follow-up conversation about the active review, if any.
    pub chat: Option<ChatSession>,
    /// Bumped whenever `chat` is replaced; replies carry the value they were sent under.
    pub chat_generation: u64,
    /// Text being typed in the chat input line.
    pub chat_input: String,
    /// Text being typed in the file path prompt.
    pub file_input: String,

    /// Snapshot of the history store, newest first. Refreshed by the dispatcher.
    pub history: Vec<StoredReview>,
    pub history_state: ListState,

    pub sessions: SessionsView,
    /// A bearer token is held; gates the sessions overlay.
    pub authenticated: bool,

    /// Vertical scroll offset of the output panel.
    pub output_scroll: u16,
    pub output_viewport_height: u16,
    pub help_scroll: u16,

    /// Advanced on every tick; drives the loading spinner.
    pub spinner_frame: usize,

    /// Outer rects of `[history, editor, output]` from the last render, for mouse focus.
    pub panel_rects: [Rect; 3],
}

impl AppState {
    pub fn new(history: Vec<StoredReview>, authenticated: bool) -> Self {
        let mut history_state = ListState::default();
        if !history.is_empty() {
            history_state.select(Some(0));
        }
        Self {
            mode: Mode::default(),
            focus: PanelFocus::default(),
            orchestrator: Orchestrator::new(),
            editor: CodeSurfaceState::default(),
            chat: None,
            chat_generation: 0,
            chat_input: String::new(),
            file_input: String::new(),
            history,
            history_state,
            sessions: SessionsView::default(),
            authenticated,
            output_scroll: 0,
            output_viewport_height: 0,
            help_scroll: 0,
            spinner_frame: 0,
            panel_rects: [Rect::default(); 3],
        }
    }

    /// Replaces the history snapshot, keeping a valid selection.
    pub fn set_history(&mut self, entries: Vec<StoredReview>) {
        self.history = entries;
        let selected = match self.history_state.selected() {
            _ if self.history.is_empty() => None,
            Some(i) => Some(i.min(self.history.len() - 1)),
            None => Some(0),
        };
        self.history_state.select(selected);
    }

    pub fn selected_history(&self) -> Option<&StoredReview> {
        self.history_state.selected().and_then(|i| self.history.get(i))
    }

    /// Shows a stored review and starts a fresh chat about it.
    pub fn open_history_entry(&mut self, entry: StoredReview) {
        if self.orchestrator.is_loading() {
            return;
        }
        self.start_chat(&entry.review);
        self.orchestrator.show_review(entry.review);
        self.output_scroll = 0;
        self.focus = PanelFocus::Output;
    }

    /// Applies a settled submission.
    ///
    /// Returns the review to record in history when the submission produced one.
    pub fn apply_submission(&mut self, result: Result<SubmissionOutput>) -> Option<ReviewResult> {
        if !self.orchestrator.is_loading() {
            return None;
        }
        self.orchestrator.complete(result);
        self.output_scroll = 0;
        if self.orchestrator.phase() != Phase::Succeeded {
            self.replace_chat(None);
            return None;
        }
        match self.orchestrator.outcome().review().cloned() {
            Some(review) => {
                self.start_chat(&review);
                Some(review)
            }
            None => {
                self.replace_chat(None);
                None
            }
        }
    }

    /// Applies a chat reply sent under `generation`.
    ///
    /// A reply for a conversation that has since been replaced is dropped.
    pub fn apply_chat(&mut self, generation: u64, result: Result<ChatResponse>) {
        if generation != self.chat_generation {
            tracing::debug!(generation, current = self.chat_generation, "dropping stale chat reply");
            return;
        }
        if let Some(chat) = self.chat.as_mut() {
            chat.complete(result);
            // Keep the newest turn in view.
            self.output_scroll = u16::MAX;
        }
    }

    pub fn apply_sessions(&mut self, result: Result<Vec<SessionSummary>>) {
        self.sessions.loading = false;
        match result {
            Ok(items) => {
                self.sessions.list_state.select(if items.is_empty() { None } else { Some(0) });
                self.sessions.items = items;
                self.sessions.error = None;
            }
            Err(e) => self.sessions.error = Some(e.user_message("Failed to fetch sessions")),
        }
    }

    /// Loads a server session into the main view and closes the overlay.
    pub fn apply_session_opened(&mut self, result: Result<SessionDetail>) {
        self.sessions.loading = false;
        let detail = match result {
            Ok(detail) => detail,
            Err(e) => {
                self.sessions.error = Some(e.user_message("Failed to fetch session details"));
                return;
            }
        };
        if self.orchestrator.is_loading() {
            return;
        }
        let review = detail.review();
        let code = detail.code.clone().unwrap_or_default();
        self.orchestrator.open_session(code.clone(), review.clone());
        self.editor.reset();
        self.replace_chat(Some(ChatSession::new(&review, code).with_transcript(detail.messages)));
        self.output_scroll = 0;
        self.mode = Mode::Normal;
        self.focus = PanelFocus::Output;
    }

    pub fn apply_session_deleted(&mut self, id: &str, result: Result<()>) {
        self.sessions.loading = false;
        match result {
            Ok(()) => {
                self.sessions.items.retain(|s| s.id != id);
                let selected = self.sessions.list_state.selected();
                let len = self.sessions.items.len();
                self.sessions.list_state.select(match selected {
                    _ if len == 0 => None,
                    Some(i) => Some(i.min(len - 1)),
                    None => Some(0),
                });
            }
            Err(e) => self.sessions.error = Some(e.user_message("Failed to delete session")),
        }
    }

    /// Starts a follow-up conversation about `review` of the current code.
    fn start_chat(&mut self, review: &ReviewResult) {
        self.replace_chat(Some(ChatSession::new(review, self.orchestrator.code())));
    }

    /// Swaps the active conversation. Replies still in flight for the old one
    /// no longer match `chat_generation`.
    pub fn replace_chat(&mut self, chat: Option<ChatSession>) {
        self.chat = chat;
        self.chat_generation = self.chat_generation.wrapping_add(1);
        self.chat_input.clear();
    }

    // ─────────────────────────────────────────────────────────────
    // Scrolling
    // ─────────────────────────────────────────────────────────────

    /// Scrolls the focused panel down by `lines` rows.
    ///
    /// History moves the selection; the editor moves its caret so the shared
    /// scroll offset follows.
    pub fn scroll_down(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::History => self.history_state.scroll_down_by(lines),
            PanelFocus::Editor => self.editor.scroll_by(lines as isize, self.orchestrator.code()),
            PanelFocus::Output => self.output_scroll = self.output_scroll.saturating_add(lines),
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::History => self.history_state.scroll_up_by(lines),
            PanelFocus::Editor => self.editor.scroll_by(-(lines as isize), self.orchestrator.code()),
            PanelFocus::Output => self.output_scroll = self.output_scroll.saturating_sub(lines),
        }
    }

    pub fn scroll_top(&mut self) {
        match self.focus {
            PanelFocus::History => self.history_state.select_first(),
            PanelFocus::Editor => self.editor.scroll = 0,
            PanelFocus::Output => self.output_scroll = 0,
        }
    }

    /// For `Output` the offset is set to `u16::MAX` and clamped by the renderer.
    pub fn scroll_bottom(&mut self) {
        match self.focus {
            PanelFocus::History => self.history_state.select_last(),
            PanelFocus::Editor => self.editor.scroll_by(isize::MAX, self.orchestrator.code()),
            PanelFocus::Output => self.output_scroll = u16::MAX,
        }
    }

    /// Scrolls the focused panel by half its visible height.
    pub fn half_page_down(&mut self) {
        self.scroll_down((self.focused_viewport_height() / 2).max(1));
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up((self.focused_viewport_height() / 2).max(1));
    }

    fn focused_viewport_height(&self) -> u16 {
        match self.focus {
            PanelFocus::History => self.panel_rects[0].height.saturating_sub(2),
            PanelFocus::Editor => self.editor.viewport_height,
            PanelFocus::Output => self.output_viewport_height,
        }
    }

    /// Current spinner glyph.
    pub fn spinner(&self) -> &'static str {
        const FRAMES: [&str; 4] = ["|", "/", "-", "\\"];
        FRAMES[self.spinner_frame % FRAMES.len()]
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Vec::new(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use smartcode_core::chat::CHAT_APOLOGY;
    use smartcode_core::orchestrator::Outcome;
    use smartcode_core::types::{ChatMessage, GenerationResult, Role};
    use smartcode_core::Error;

    fn review(reasoning: &str) -> ReviewResult {
        ReviewResult {
            score: 9,
            issues: vec![],
            suggestions: vec!["add tests".to_owned()],
            reasoning: reasoning.to_owned(),
            language: "python".to_owned(),
            session_id: None,
        }
    }

    fn stored(reasoning: &str, id: &str) -> StoredReview {
        StoredReview { review: review(reasoning), id: id.to_owned(), timestamp: 1 }
    }

    fn submitting(state: &mut AppState) {
        state.orchestrator.set_code("print(1)".to_owned());
        assert!(state.orchestrator.begin_submit().is_some());
    }

    #[test]
    fn review_success_starts_chat_and_is_recorded() {
        let mut state = AppState::default();
        submitting(&mut state);
        let recorded = state.apply_submission(Ok(SubmissionOutput::Review(review("fine"))));
        assert_eq!(recorded.map(|r| r.reasoning), Some("fine".to_owned()));
        assert!(state.chat.is_some());
    }

    #[test]
    fn generation_success_is_not_recorded() {
        let mut state = AppState::default();
        submitting(&mut state);
        let generation = GenerationResult {
            code: "def f(): pass".to_owned(),
            explanation: String::new(),
            language: "python".to_owned(),
        };
        assert_eq!(state.apply_submission(Ok(SubmissionOutput::Generation(generation))), None);
        assert!(state.chat.is_none());
    }

    #[test]
    fn failure_shows_error_and_drops_chat() {
        let mut state = AppState::default();
        submitting(&mut state);
        let err = Error::Api { status: 500, message: "Model overloaded".to_owned() };
        assert_eq!(state.apply_submission(Err(err)), None);
        assert_eq!(state.orchestrator.error(), Some("Model overloaded"));
        assert!(state.chat.is_none());
    }

    #[test]
    fn stale_submission_result_is_ignored() {
        let mut state = AppState::default();
        assert_eq!(state.apply_submission(Ok(SubmissionOutput::Review(review("late")))), None);
        assert!(state.orchestrator.outcome().is_none());
    }

    #[test]
    fn history_selection_shows_entry_and_chat() {
        let mut state = AppState::new(vec![stored("new", "2"), stored("old", "1")], false);
        state.history_state.select(Some(1));
        let entry = state.selected_history().cloned().unwrap();
        state.open_history_entry(entry);
        assert_eq!(state.orchestrator.outcome().review().unwrap().reasoning, "old");
        assert!(state.chat.is_some());
        assert_eq!(state.focus, PanelFocus::Output);
    }

    #[test]
    fn reply_for_a_replaced_chat_is_dropped() {
        let mut state = AppState::new(vec![stored("archived", "1")], false);
        state.orchestrator.set_code("x = 1".to_owned());
        state.orchestrator.begin_submit();
        state.apply_submission(Ok(SubmissionOutput::Review(review("current"))));
        let first = state.chat_generation;
        assert!(state.chat.as_mut().unwrap().begin_send("about current").is_some());

        // The user moves to another review while the first reply is in flight.
        let entry = state.selected_history().cloned().unwrap();
        state.open_history_entry(entry);
        let second = state.chat_generation;
        assert_ne!(first, second);
        assert!(state.chat.as_mut().unwrap().begin_send("about archived").is_some());

        state.apply_chat(first, Ok(ChatResponse { content: "answer about current".to_owned() }));
        state.apply_chat(second, Ok(ChatResponse { content: "answer about archived".to_owned() }));

        let transcript = state.chat.as_ref().unwrap().transcript();
        assert_eq!(
            transcript,
            &[ChatMessage::user("about archived"), ChatMessage::assistant("answer about archived")]
        );
    }

    #[test]
    fn set_history_keeps_selection_in_range() {
        let mut state = AppState::new(vec![stored("a", "1"), stored("b", "2")], false);
        state.history_state.select(Some(1));
        state.set_history(vec![stored("c", "3")]);
        assert_eq!(state.history_state.selected(), Some(0));
        state.set_history(Vec::new());
        assert_eq!(state.history_state.selected(), None);
    }

    #[test]
    fn opened_session_loads_code_review_and_transcript() {
        let mut state = AppState::new(Vec::new(), true);
        state.mode = Mode::Sessions;
        let detail = SessionDetail {
            id: "s1".to_owned(),
            code: Some("x = 1".to_owned()),
            score: Some(4),
            issues: vec![],
            suggestions: vec![],
            reasoning: None,
            review_context: None,
            language: Some("python".to_owned()),
            messages: vec![ChatMessage::user("why?"), ChatMessage::assistant("because")],
            created_at: String::new(),
        };
        state.apply_session_opened(Ok(detail));

        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(state.orchestrator.code(), "x = 1");
        assert!(matches!(state.orchestrator.outcome(), Outcome::Review(r) if r.score == 4));
        let chat = state.chat.as_ref().unwrap();
        assert_eq!(chat.transcript().len(), 2);
        assert_eq!(chat.session_id(), Some("s1"));
    }

    #[test]
    fn session_errors_use_fallbacks() {
        let mut state = AppState::default();
        state.apply_sessions(Err(Error::Io(std::io::Error::other("refused"))));
        assert_eq!(state.sessions.error.as_deref(), Some("Failed to fetch sessions"));
        state.apply_session_deleted("s1", Err(Error::Io(std::io::Error::other("refused"))));
        assert_eq!(state.sessions.error.as_deref(), Some("Failed to delete session"));
    }

    #[test]
    fn deleted_session_leaves_the_list() {
        let mut state = AppState::default();
        let summary = |id: &str| SessionSummary {
            id: id.to_owned(),
            language: "c".to_owned(),
            created_at: String::new(),
            message_count: 0,
        };
        state.apply_sessions(Ok(vec![summary("a"), summary("b")]));
        state.sessions.list_state.select(Some(1));
        state.apply_session_deleted("b", Ok(()));
        assert_eq!(state.sessions.items.len(), 1);
        assert_eq!(state.sessions.selected().map(|s| s.id.as_str()), Some("a"));
    }

    #[test]
    fn chat_failure_appends_apology() {
        let mut state = AppState::default();
        state.chat = Some(ChatSession::new(&review("r"), "code"));
        let chat = state.chat.as_mut().unwrap();
        assert!(chat.begin_send("hello").is_some());
        state.apply_chat(state.chat_generation, Err(Error::Io(std::io::Error::other("reset"))));
        let transcript = state.chat.as_ref().unwrap().transcript();
        assert_eq!(transcript[1].role, Role::Assistant);
        assert_eq!(transcript[1].content, CHAT_APOLOGY);
    }
}
