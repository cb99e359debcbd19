//! Help overlay renderer for smartcode.
//!
//! Draws a centred modal over the panels. `Clear` erases the background first,
//! inside the same `terminal.draw()` closure as everything else.

use ratatui::{
    Frame,
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay, scrolled by `help_scroll` rows.
///
/// Skipped below 60 columns to avoid a zero-height `Rect`.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help  j/k scroll, ? or Esc to dismiss ")
        .border_style(Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text(theme))
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text(theme: &Theme) -> Text<'static> {
    let section = |title: &'static str| {
        Line::styled(title, Style::default().fg(theme.heading).add_modifier(Modifier::BOLD))
    };
    Text::from(vec![
        section("Editing"),
        Line::from("  i / Enter     Edit the code (or prompt in Generate mode)"),
        Line::from("  Esc           Stop editing"),
        Line::from("  Ctrl-s / s    Submit for review or generation"),
        Line::from("  o             Review a file from disk"),
        Line::from(""),
        section("Mode"),
        Line::from("  m             Switch between Review and Generate"),
        Line::from("  [ / ]         Previous / next language"),
        Line::from(""),
        section("Results"),
        Line::from("  c             Ask a follow-up question about the review"),
        Line::from("  x             Dismiss the error banner"),
        Line::from("  Enter         Open the selected history entry"),
        Line::from("  D             Clear the review history"),
        Line::from("  S             Server sessions (signed in only)"),
        Line::from(""),
        section("Navigation"),
        Line::from("  Tab / S-Tab   Move panel focus"),
        Line::from("  j / k         Scroll down / up one line"),
        Line::from("  g / G         Jump to top / bottom"),
        Line::from("  Ctrl-d / u    Scroll half page down / up"),
        Line::from("  mouse         Click to focus, wheel to scroll"),
        Line::from(""),
        section("General"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q / Esc       Quit"),
    ])
}
