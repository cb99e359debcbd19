//! Server sessions overlay.
//!
//! Modal list of the reviews the service stored for the signed-in user. Drawn
//! over the panels with `Clear`, like the help overlay.

use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, List, ListItem, Paragraph},
};
use smartcode_core::types::SessionSummary;

use crate::app::SessionsView;
use crate::theme::Theme;

pub fn render_sessions_overlay(
    frame: &mut Frame,
    view: &mut SessionsView,
    spinner: &str,
    theme: &Theme,
) {
    if frame.area().width < 40 || frame.area().height < 8 {
        return;
    }
    let area = frame
        .area()
        .centered(Constraint::Percentage(70), Constraint::Percentage(70));
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(" Sessions  Enter open, d delete, r refresh, Esc close ")
        .border_style(Style::default().fg(theme.border_active));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [list_area, status_area] =
        inner.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    let items: Vec<ListItem> = if view.items.is_empty() {
        let msg = if view.loading { "Loading..." } else { "No sessions" };
        vec![ListItem::new(Line::styled(msg, Style::default().fg(theme.muted)))]
    } else {
        view.items.iter().map(|s| session_item(s, theme)).collect()
    };
    let list = List::new(items)
        .highlight_style(Style::default().fg(theme.border_active).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, list_area, &mut view.list_state);

    let status = match (&view.error, view.loading) {
        (Some(err), _) => Line::styled(err.clone(), Style::default().fg(theme.error_fg).bg(theme.error_bg)),
        (None, true) => Line::raw(format!("{spinner} working")),
        (None, false) => Line::raw(""),
    };
    frame.render_widget(Paragraph::new(status), status_area);
}

fn session_item(session: &SessionSummary, theme: &Theme) -> ListItem<'static> {
    let created = session.created_at.get(..16).unwrap_or(&session.created_at).replace('T', " ");
    ListItem::new(Line::from(vec![
        Span::styled(created, Style::default().fg(theme.muted)),
        Span::raw("  "),
        Span::raw(format!("{:<10}", session.language)),
        Span::styled(
            format!(" {} messages", session.message_count),
            Style::default().fg(theme.muted),
        ),
    ]))
}
