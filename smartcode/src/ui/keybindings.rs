//! Keybinding dispatcher for smartcode.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` telling the event loop whether to continue, quit, or run a
//! [`Command`] that needs the network or the history store. The dispatcher
//! branches first on `state.mode` so every mode has an isolated handler.

use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;
use smartcode_core::orchestrator::{Mode as SubmitMode, Submission};
use smartcode_core::types::ChatRequest;

use crate::app::{AppState, Mode, PanelFocus};
use crate::ui::code_surface;

/// Work the event loop performs outside the key handler.
#[derive(Debug)]
pub enum Command {
    /// Run a validated submission against the service.
    Submit(Submission),
    /// Send a chat turn; the user message is already in the transcript.
    /// `generation` identifies the conversation the reply belongs to.
    SendChat { generation: u64, request: ChatRequest },
    /// Show a stored review, looked up by id in the history store.
    OpenHistory(String),
    /// Empty the review history (already confirmed).
    ClearHistory,
    LoadSessions,
    OpenSession(String),
    DeleteSession(String),
}

/// Control-flow signal returned from the key dispatcher.
#[derive(Debug)]
pub enum KeyAction {
    Continue,
    Quit,
    Run(Command),
}

/// Dispatches a key event to the handler matching the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::ConfirmClear => handle_confirm_clear(key, state),
        Mode::Normal => handle_normal(key, state),
        Mode::Editing => handle_editing(key, state),
        Mode::ChatInput => handle_chat_input(key, state),
        Mode::FilePrompt => handle_file_prompt(key, state),
        Mode::Sessions => handle_sessions(key, state),
    }
}

/// Routes a bracketed paste to whichever text input is active.
pub fn handle_paste(text: &str, state: &mut AppState) {
    match state.mode {
        Mode::Editing => {
            let disabled = state.orchestrator.is_loading();
            if let Some(new) =
                code_surface::handle_paste(text, state.orchestrator.code(), &mut state.editor, disabled)
            {
                state.orchestrator.set_code(new);
            }
        }
        Mode::ChatInput => state.chat_input.push_str(&single_line(text)),
        Mode::FilePrompt => state.file_input.push_str(single_line(text).trim()),
        _ => {}
    }
}

fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// Submits the current code or prompt. Validation errors land in the orchestrator.
fn submit(state: &mut AppState) -> KeyAction {
    match state.orchestrator.begin_submit() {
        Some(submission) => {
            state.replace_chat(None);
            KeyAction::Run(Command::Submit(submission))
        }
        None => KeyAction::Continue,
    }
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_scroll_key(key, state) {
        return action;
    }
    if is_ctrl(&key, 's') {
        return submit(state);
    }

    match key.code {
        KeyCode::Tab => state.focus = state.focus.next(),
        KeyCode::BackTab => state.focus = state.focus.prev(),

        KeyCode::Char('i') => {
            state.focus = PanelFocus::Editor;
            state.mode = Mode::Editing;
        }
        KeyCode::Enter => match state.focus {
            PanelFocus::Editor => state.mode = Mode::Editing,
            PanelFocus::History => {
                if let Some(id) = state.selected_history().map(|e| e.id.clone()) {
                    return KeyAction::Run(Command::OpenHistory(id));
                }
            }
            PanelFocus::Output => {}
        },
        KeyCode::Char('s') => return submit(state),

        // Review / Generate tabs
        KeyCode::Char('m') => {
            let next = state.orchestrator.mode().toggled();
            if state.orchestrator.set_mode(next) {
                state.replace_chat(None);
            }
        }
        KeyCode::Char('[') => {
            let lang = state.orchestrator.language().prev();
            state.orchestrator.set_language(lang);
        }
        KeyCode::Char(']') => {
            let lang = state.orchestrator.language().next();
            state.orchestrator.set_language(lang);
        }

        KeyCode::Char('o') => {
            if !state.orchestrator.is_loading() {
                state.file_input.clear();
                state.mode = Mode::FilePrompt;
            }
        }
        KeyCode::Char('c') => {
            if state.chat.is_some() {
                state.focus = PanelFocus::Output;
                state.mode = Mode::ChatInput;
            }
        }
        KeyCode::Char('x') => state.orchestrator.dismiss_error(),
        KeyCode::Char('D') => {
            if !state.history.is_empty() {
                state.mode = Mode::ConfirmClear;
            }
        }
        KeyCode::Char('S') => {
            if state.authenticated {
                state.mode = Mode::Sessions;
                state.sessions.loading = true;
                state.sessions.error = None;
                return KeyAction::Run(Command::LoadSessions);
            }
        }

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
        }
        KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
        _ => {}
    }
    KeyAction::Continue
}

/// Handles j / k / g / G and Ctrl-d / Ctrl-u for the focused panel.
fn handle_scroll_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => state.scroll_up(1),
        KeyCode::Char('g') => state.scroll_top(),
        KeyCode::Char('G') => state.scroll_bottom(),
        KeyCode::Char('d') if ctrl => state.half_page_down(),
        KeyCode::Char('u') if ctrl => state.half_page_up(),
        _ => return None,
    }
    Some(KeyAction::Continue)
}

// ---------------------------------------------------------------------------
// Text inputs
// ---------------------------------------------------------------------------

/// Keys go to the code surface; `Esc` leaves, `Ctrl-s` submits.
fn handle_editing(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if key.code == KeyCode::Esc {
        state.mode = Mode::Normal;
        return KeyAction::Continue;
    }
    if is_ctrl(&key, 's') {
        state.mode = Mode::Normal;
        return submit(state);
    }
    let disabled = state.orchestrator.is_loading();
    if let Some(new) = code_surface::handle_key(key, state.orchestrator.code(), &mut state.editor, disabled)
    {
        state.orchestrator.set_code(new);
    }
    KeyAction::Continue
}

/// Single-line chat input. `Enter` sends; a send in flight or a blank line is ignored.
fn handle_chat_input(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Esc => state.mode = Mode::Normal,
        KeyCode::Enter => {
            let Some(chat) = state.chat.as_mut() else {
                state.mode = Mode::Normal;
                return KeyAction::Continue;
            };
            if let Some(request) = chat.begin_send(&state.chat_input) {
                state.chat_input.clear();
                state.output_scroll = u16::MAX;
                let generation = state.chat_generation;
                return KeyAction::Run(Command::SendChat { generation, request });
            }
        }
        KeyCode::Backspace => {
            state.chat_input.pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.chat_input.push(c);
        }
        _ => {}
    }
    KeyAction::Continue
}

/// Path prompt for file review. `Enter` validates and submits the file.
fn handle_file_prompt(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Esc => state.mode = Mode::Normal,
        KeyCode::Enter => {
            state.mode = Mode::Normal;
            let input = std::mem::take(&mut state.file_input);
            let path = input.trim();
            if path.is_empty() {
                return KeyAction::Continue;
            }
            if let Some(submission) = state.orchestrator.begin_file_submit(Path::new(path)) {
                state.replace_chat(None);
                state.editor.reset();
                return KeyAction::Run(Command::Submit(submission));
            }
        }
        KeyCode::Backspace => {
            state.file_input.pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.file_input.push(c);
        }
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

fn handle_sessions(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let busy = state.sessions.loading;
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('S') => state.mode = Mode::Normal,
        KeyCode::Char('j') | KeyCode::Down => state.sessions.list_state.scroll_down_by(1),
        KeyCode::Char('k') | KeyCode::Up => state.sessions.list_state.scroll_up_by(1),
        KeyCode::Char('r') if !busy => {
            state.sessions.loading = true;
            state.sessions.error = None;
            return KeyAction::Run(Command::LoadSessions);
        }
        KeyCode::Enter if !busy && !state.orchestrator.is_loading() => {
            if let Some(id) = state.sessions.selected().map(|s| s.id.clone()) {
                state.sessions.loading = true;
                state.sessions.error = None;
                return KeyAction::Run(Command::OpenSession(id));
            }
        }
        KeyCode::Char('d') if !busy => {
            if let Some(id) = state.sessions.selected().map(|s| s.id.clone()) {
                state.sessions.loading = true;
                state.sessions.error = None;
                return KeyAction::Run(Command::DeleteSession(id));
            }
        }
        _ => {}
    }
    KeyAction::Continue
}

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') => state.help_scroll = state.help_scroll.saturating_add(1),
        KeyCode::Char('k') => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

/// `y` clears the history; `n` or `Esc` cancels.
fn handle_confirm_clear(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            state.mode = Mode::Normal;
            KeyAction::Run(Command::ClearHistory)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Left click focuses a panel; the wheel scrolls the focused panel by 3 lines.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let pos = Position { x: mouse.column, y: mouse.row };
            let [history, editor, output] = state.panel_rects;
            if history.width > 0 && history.contains(pos) {
                state.focus = PanelFocus::History;
            } else if editor.contains(pos) {
                state.focus = PanelFocus::Editor;
            } else if output.contains(pos) {
                state.focus = PanelFocus::Output;
            }
        }
        MouseEventKind::ScrollUp if state.mode == Mode::HelpOverlay => {
            state.help_scroll = state.help_scroll.saturating_sub(3);
        }
        MouseEventKind::ScrollDown if state.mode == Mode::HelpOverlay => {
            state.help_scroll = state.help_scroll.saturating_add(3);
        }
        MouseEventKind::ScrollUp => state.scroll_up(3),
        MouseEventKind::ScrollDown => state.scroll_down(3),
        _ => {}
    }
}

/// Label of the Review/Generate tab for the status bar.
pub fn submit_mode_label(mode: SubmitMode) -> &'static str {
    match mode {
        SubmitMode::Review => "REVIEW",
        SubmitMode::Generate => "GENERATE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use smartcode_core::chat::ChatSession;
    use smartcode_core::orchestrator::{Outcome, Phase};
    use smartcode_core::types::{Language, ReviewResult, StoredReview};

    fn press(state: &mut AppState, code: KeyCode) -> KeyAction {
        handle_key(KeyEvent::new(code, KeyModifiers::NONE), state)
    }

    fn ctrl(state: &mut AppState, c: char) -> KeyAction {
        handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL), state)
    }

    fn type_keys(state: &mut AppState, text: &str) {
        for c in text.chars() {
            press(state, KeyCode::Char(c));
        }
    }

    fn review() -> ReviewResult {
        ReviewResult {
            score: 5,
            issues: vec![],
            suggestions: vec![],
            reasoning: "ok".to_owned(),
            language: "javascript".to_owned(),
            session_id: None,
        }
    }

    #[test]
    fn editing_updates_orchestrator_code() {
        let mut state = AppState::default();
        press(&mut state, KeyCode::Char('i'));
        assert_eq!(state.mode, Mode::Editing);
        type_keys(&mut state, "let q = 1;");
        press(&mut state, KeyCode::Esc);
        assert_eq!(state.orchestrator.code(), "let q = 1;");
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn submit_from_editor_returns_command() {
        let mut state = AppState::default();
        press(&mut state, KeyCode::Char('i'));
        type_keys(&mut state, "x");
        let action = ctrl(&mut state, 's');
        assert!(matches!(action, KeyAction::Run(Command::Submit(Submission::Review { .. }))));
        assert!(state.orchestrator.is_loading());
        assert_eq!(state.mode, Mode::Normal);

        // Second submit while loading is a no-op.
        assert!(matches!(press(&mut state, KeyCode::Char('s')), KeyAction::Continue));
    }

    #[test]
    fn blank_submit_sets_error_without_command() {
        let mut state = AppState::default();
        assert!(matches!(press(&mut state, KeyCode::Char('s')), KeyAction::Continue));
        assert_eq!(state.orchestrator.error(), Some("Please enter some code to review"));
        press(&mut state, KeyCode::Char('x'));
        assert_eq!(state.orchestrator.error(), None);
    }

    #[test]
    fn edits_are_ignored_while_loading() {
        let mut state = AppState::default();
        state.orchestrator.set_code("a".to_owned());
        state.orchestrator.begin_submit();
        state.mode = Mode::Editing;
        type_keys(&mut state, "bc");
        assert_eq!(state.orchestrator.code(), "a");
    }

    #[test]
    fn mode_toggle_clears_chat() {
        let mut state = AppState::default();
        state.orchestrator.show_review(review());
        state.chat = Some(ChatSession::new(&review(), ""));
        press(&mut state, KeyCode::Char('m'));
        assert_eq!(state.orchestrator.mode(), SubmitMode::Generate);
        assert_eq!(state.orchestrator.outcome(), &Outcome::None);
        assert!(state.chat.is_none());
    }

    #[test]
    fn language_cycles_with_brackets() {
        let mut state = AppState::default();
        press(&mut state, KeyCode::Char(']'));
        assert_eq!(state.orchestrator.language(), Language::TypeScript);
        press(&mut state, KeyCode::Char('['));
        press(&mut state, KeyCode::Char('['));
        assert_eq!(state.orchestrator.language(), Language::Php);
    }

    #[test]
    fn chat_enter_sends_and_clears_input() {
        let mut state = AppState::default();
        state.chat = Some(ChatSession::new(&review(), "code"));
        press(&mut state, KeyCode::Char('c'));
        assert_eq!(state.mode, Mode::ChatInput);
        type_keys(&mut state, "why?");
        let action = press(&mut state, KeyCode::Enter);
        let KeyAction::Run(Command::SendChat { generation, request }) = action else {
            panic!("expected SendChat, got {action:?}");
        };
        assert_eq!(request.messages.len(), 1);
        assert_eq!(generation, state.chat_generation);
        assert_eq!(state.chat_input, "");

        // Pending send: the next Enter is rejected and the text is kept.
        type_keys(&mut state, "more");
        assert!(matches!(press(&mut state, KeyCode::Enter), KeyAction::Continue));
        assert_eq!(state.chat_input, "more");
    }

    #[test]
    fn chat_requires_a_review() {
        let mut state = AppState::default();
        press(&mut state, KeyCode::Char('c'));
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn file_prompt_rejects_bad_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hi").unwrap();

        let mut state = AppState::default();
        press(&mut state, KeyCode::Char('o'));
        assert_eq!(state.mode, Mode::FilePrompt);
        handle_paste(&path.to_string_lossy(), &mut state);
        assert!(matches!(press(&mut state, KeyCode::Enter), KeyAction::Continue));
        assert!(state.orchestrator.error().unwrap().starts_with("Invalid file type"));
        assert_eq!(state.orchestrator.phase(), Phase::Idle);
    }

    #[test]
    fn file_prompt_submits_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.c");
        std::fs::write(&path, "int main(void) { return 0; }").unwrap();

        let mut state = AppState::default();
        press(&mut state, KeyCode::Char('o'));
        handle_paste(&path.to_string_lossy(), &mut state);
        let action = press(&mut state, KeyCode::Enter);
        assert!(matches!(action, KeyAction::Run(Command::Submit(Submission::ReviewFile(_)))));
        assert_eq!(state.orchestrator.language(), Language::C);
        assert!(state.orchestrator.code().starts_with("int main"));
    }

    #[test]
    fn clear_history_needs_confirmation() {
        let entry = StoredReview { review: review(), id: "1".to_owned(), timestamp: 1 };
        let mut state = AppState::new(vec![entry], false);
        press(&mut state, KeyCode::Char('D'));
        assert_eq!(state.mode, Mode::ConfirmClear);
        assert!(matches!(press(&mut state, KeyCode::Char('n')), KeyAction::Continue));
        assert_eq!(state.mode, Mode::Normal);

        press(&mut state, KeyCode::Char('D'));
        assert!(matches!(press(&mut state, KeyCode::Char('y')), KeyAction::Run(Command::ClearHistory)));
    }

    #[test]
    fn enter_on_history_opens_entry_by_id() {
        let entry = StoredReview { review: review(), id: "42".to_owned(), timestamp: 1 };
        let mut state = AppState::new(vec![entry], false);
        state.focus = PanelFocus::History;
        let action = press(&mut state, KeyCode::Enter);
        let KeyAction::Run(Command::OpenHistory(id)) = action else {
            panic!("expected OpenHistory, got {action:?}");
        };
        assert_eq!(id, "42");
    }

    #[test]
    fn sessions_overlay_requires_token() {
        let mut state = AppState::default();
        press(&mut state, KeyCode::Char('S'));
        assert_eq!(state.mode, Mode::Normal);

        let mut state = AppState::new(Vec::new(), true);
        assert!(matches!(press(&mut state, KeyCode::Char('S')), KeyAction::Run(Command::LoadSessions)));
        assert_eq!(state.mode, Mode::Sessions);
        assert!(state.sessions.loading);
    }

    #[test]
    fn paste_in_editor_inserts_text() {
        let mut state = AppState::default();
        state.mode = Mode::Editing;
        handle_paste("a\r\nb", &mut state);
        assert_eq!(state.orchestrator.code(), "a\nb");
    }
}
