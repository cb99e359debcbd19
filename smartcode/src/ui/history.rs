//! History panel renderer.
//!
//! Lists the locally stored reviews, newest first. Each entry shows its local
//! timestamp, the score and the language tag.

use chrono::{Local, TimeZone};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
};
use smartcode_core::types::StoredReview;

use crate::app::{AppState, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::panel_block;

/// Renders the history list. Skipped when the panel is collapsed.
pub fn render_history(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    if area.width == 0 {
        return;
    }
    let is_focused = state.focus == PanelFocus::History;
    let title = if state.history.is_empty() {
        "History".to_owned()
    } else {
        format!("History ({})", state.history.len())
    };
    let block = panel_block(&title, is_focused, theme);

    let items: Vec<ListItem> = if state.history.is_empty() {
        vec![ListItem::new(Line::styled("No reviews yet", Style::default().fg(theme.muted)))]
    } else {
        state.history.iter().map(|entry| history_item(entry, theme)).collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(theme.border_active).add_modifier(Modifier::BOLD));

    frame.render_stateful_widget(list, area, &mut state.history_state);
}

fn history_item(entry: &StoredReview, theme: &Theme) -> ListItem<'static> {
    let score = entry.review.score;
    ListItem::new(Line::from(vec![
        Span::styled(format_timestamp(entry.timestamp), Style::default().fg(theme.muted)),
        Span::raw(" "),
        Span::styled(format!("{score:>2}/10"), Style::default().fg(theme.score_color(score))),
        Span::raw(" "),
        Span::raw(entry.review.language.clone()),
    ]))
}

/// Formats epoch millis as local `MM-DD HH:MM`.
fn format_timestamp(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%m-%d %H:%M").to_string(),
        None => "--".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};
    use smartcode_core::types::ReviewResult;

    fn entry(score: u8, language: &str) -> StoredReview {
        StoredReview {
            review: ReviewResult {
                score,
                issues: vec![],
                suggestions: vec![],
                reasoning: format!("r{score}"),
                language: language.to_owned(),
                session_id: None,
            },
            id: "1".to_owned(),
            timestamp: 1_700_000_000_000,
        }
    }

    fn draw(state: &mut AppState) -> String {
        let theme = Theme::dark();
        let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
        terminal
            .draw(|frame| render_history(frame, frame.area(), state, &theme))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        (0..6)
            .map(|y| (0..40).map(|x| buffer[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn lists_score_and_language() {
        let mut state = AppState::new(vec![entry(8, "python"), entry(3, "c")], false);
        let text = draw(&mut state);
        assert!(text.contains("History (2)"));
        assert!(text.contains(" 8/10 python"));
        assert!(text.contains(" 3/10 c"));
    }

    #[test]
    fn empty_history_has_placeholder() {
        let mut state = AppState::default();
        assert!(draw(&mut state).contains("No reviews yet"));
    }

    #[test]
    fn out_of_range_timestamp_is_dashed() {
        assert_eq!(format_timestamp(i64::MAX), "--");
    }
}
