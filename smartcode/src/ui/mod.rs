//! UI rendering module for smartcode.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`; each panel
//! and overlay has its own module.

mod layout;
pub mod code_surface;
pub mod help;
pub mod history;
pub mod keybindings;
pub mod output;
pub mod sessions;

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
};
use smartcode_core::orchestrator::Mode as SubmitMode;

use crate::app::{AppState, Mode, PanelFocus};
use crate::theme::Theme;
use code_surface::{render_code_surface, SurfaceProps};
use layout::{compute_layout, render_error_banner, render_status_bar};

/// Renders one complete frame: panels, banners, status bar and overlays.
///
/// Panel rects and viewport heights are written back into `state` so the next
/// keypress or mouse event can use them.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let layout = compute_layout(frame, state);
    frame.render_widget(Block::new().style(Style::default().bg(theme.background)), frame.area());
    state.panel_rects = [layout.history, layout.editor, layout.output];

    history::render_history(frame, layout.history, state, theme);

    let title = match state.orchestrator.mode() {
        SubmitMode::Review => "Code",
        SubmitMode::Generate => "Prompt",
    };
    let props = SurfaceProps {
        text: state.orchestrator.code(),
        language: state.orchestrator.language(),
        title,
        focused: state.focus == PanelFocus::Editor,
        editing: state.mode == Mode::Editing,
        disabled: state.orchestrator.is_loading(),
    };
    render_code_surface(frame, layout.editor, &props, &mut state.editor, theme);

    output::render_output(frame, layout.output, state, theme);

    if let Some(message) = state.orchestrator.error() {
        render_error_banner(frame, layout.error, message, theme);
    }
    match state.mode {
        Mode::ChatInput => render_input_bar(frame, layout.input, "Ask about the review", &state.chat_input, theme),
        Mode::FilePrompt => render_input_bar(frame, layout.input, "File to review", &state.file_input, theme),
        _ => {}
    }

    render_status_bar(frame, layout.status_bar, state, theme);

    // Overlays last so they sit on top.
    match state.mode {
        Mode::HelpOverlay => help::render_help_overlay(frame, theme, state.help_scroll),
        Mode::ConfirmClear => render_confirm_clear(frame, state.history.len(), theme),
        Mode::Sessions => {
            let spinner = state.spinner();
            sessions::render_sessions_overlay(frame, &mut state.sessions, spinner, theme);
        }
        _ => {}
    }
}

/// Bordered one-line text input with the caret at the end.
fn render_input_bar(frame: &mut Frame, area: Rect, title: &str, text: &str, theme: &Theme) {
    if area.height < 3 {
        return;
    }
    let block = Block::bordered()
        .title(format!(" {title}  Enter send, Esc cancel "))
        .border_style(Style::default().fg(theme.border_active));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Keep the tail visible when the text is wider than the bar.
    let width = usize::from(inner.width.saturating_sub(1));
    let chars = text.chars().count();
    let visible: String = text.chars().skip(chars.saturating_sub(width)).collect();
    let col = visible.chars().count() as u16;
    frame.render_widget(Paragraph::new(Line::raw(visible)), inner);
    frame.set_cursor_position((inner.x + col, inner.y));
}

fn render_confirm_clear(frame: &mut Frame, count: usize, theme: &Theme) {
    let area = frame.area().centered(Constraint::Length(44), Constraint::Length(5));
    frame.render_widget(Clear, area);
    let block = Block::bordered()
        .title(" Clear history ")
        .border_style(Style::default().fg(theme.error_fg));
    let text = vec![
        Line::raw(format!("Delete all {count} stored reviews?")),
        Line::from(vec![
            Span::styled("y", Style::default().fg(theme.score_poor)),
            Span::raw(" yes   "),
            Span::styled("n", Style::default().fg(theme.score_good)),
            Span::raw(" no"),
        ]),
    ];
    frame.render_widget(Paragraph::new(text).block(block).centered(), area);
}
