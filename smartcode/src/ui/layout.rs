//! Responsive layout engine for smartcode.
//!
//! Pure layout arithmetic; no mutable application state lives here. It is called
//! inside `terminal.draw()` on every render so each frame reflects the current
//! terminal size.
//!
//! At `>= 120` columns the history list sits left of the editor and output
//! panels. Below that it collapses and the editor and output split the width.
//! `Spacing::Overlap(1)` with `MergeStrategy::Fuzzy` makes adjacent panel borders
//! share a single column.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use crate::ui::keybindings::submit_mode_label;

/// Rects for one frame.
pub struct FrameLayout {
    pub history: Rect,
    pub editor: Rect,
    pub output: Rect,
    /// Error banner row; zero height when no error is shown.
    pub error: Rect,
    /// Chat or file-path input row; zero height when neither is active.
    pub input: Rect,
    pub status_bar: Rect,
}

/// Computes the panel rects for the current frame.
///
/// The returned rects are valid only for the current draw closure.
pub fn compute_layout(frame: &Frame, state: &AppState) -> FrameLayout {
    let area = frame.area();
    let error_height = u16::from(state.orchestrator.error().is_some());
    let input_height = u16::from(matches!(state.mode, Mode::ChatInput | Mode::FilePrompt)) * 3;

    let [main_area, error, input, status_bar] = area.layout(&Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(error_height),
        Constraint::Length(input_height),
        Constraint::Length(1),
    ]));

    let horizontal = if area.width >= 120 {
        Layout::horizontal([
            Constraint::Percentage(20),
            Constraint::Percentage(40),
            Constraint::Percentage(40),
        ])
    } else {
        Layout::horizontal([
            Constraint::Length(0),
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
    }
    .spacing(Spacing::Overlap(1));

    let [history, editor, output] = main_area.layout(&horizontal);

    FrameLayout { history, editor, output, error, input, status_bar }
}

/// Returns the inner `Rect` of a panel after removing the 1-cell border.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds a bordered `Block` for a panel.
///
/// Focused panels get `BorderType::Thick` in the active colour. `Fuzzy` merging
/// is required because `Exact` produces wrong junctions between thick and plain
/// borders.
pub fn panel_block<'a>(title: &'a str, is_focused: bool, theme: &'a Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the 1-row status bar at the bottom of the terminal.
///
/// Shows the input mode, the Review/Generate tab, the selected language, a
/// spinner while a request is in flight, and whether a token is held.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Editing | Mode::ChatInput | Mode::FilePrompt => (" EDIT ", theme.status_mode_insert),
        _ => (" NORMAL ", theme.status_mode_normal),
    };
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::styled(mode_text, bold.fg(mode_fg)),
        Span::raw(" "),
        Span::styled(
            format!(" {} ", submit_mode_label(state.orchestrator.mode())),
            bold.fg(theme.tab_active),
        ),
        Span::raw(format!(" {} ", state.orchestrator.language().display_name())),
    ];

    let busy = state.orchestrator.is_loading()
        || state.chat.as_ref().is_some_and(|c| c.is_sending())
        || state.sessions.loading;
    if busy {
        spans.push(Span::raw(format!(" {} working ", state.spinner())));
    }
    if state.authenticated {
        spans.push(Span::styled(" signed in ", Style::default().fg(theme.score_good)));
    }
    spans.push(Span::styled(" ? help ", Style::default().fg(theme.muted)));

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}

/// Renders the one-row error banner. `x` dismisses it.
pub fn render_error_banner(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(" ERROR ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {message} ")),
        Span::styled("(x to dismiss)", Style::default().add_modifier(Modifier::DIM)),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme.error_bg).fg(theme.error_fg)),
        area,
    );
}
