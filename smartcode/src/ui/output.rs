//! Output panel: the active review with its follow-up chat, or generated code.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use smartcode_core::chat::ChatSession;
use smartcode_core::orchestrator::Outcome;
use smartcode_core::types::{GenerationResult, Language, ReviewResult, Role};

use crate::app::{AppState, PanelFocus};
use crate::highlight::highlight_code;
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Renders the output panel and clamps `state.output_scroll` to the content.
pub fn render_output(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let focused = state.focus == PanelFocus::Output;
    let title = match state.orchestrator.outcome() {
        Outcome::Generation(_) => "Generated code",
        _ => "Review",
    };
    frame.render_widget(panel_block(title, focused, theme), area);
    let inner = inner_rect(area);
    state.output_viewport_height = inner.height;
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let lines = match state.orchestrator.outcome() {
        _ if state.orchestrator.is_loading() => vec![Line::styled(
            format!("{} Waiting for the service...", state.spinner()),
            Style::default().fg(theme.muted),
        )],
        Outcome::Review(review) => {
            let mut lines = review_lines(review, theme);
            if let Some(chat) = &state.chat {
                lines.extend(chat_lines(chat, theme));
            }
            lines
        }
        Outcome::Generation(generation) => {
            generation_lines(generation, state.orchestrator.language(), theme)
        }
        Outcome::None => placeholder_lines(theme),
    };

    let total = wrapped_height(&lines, inner.width);
    let max_scroll = total.saturating_sub(inner.height);
    state.output_scroll = state.output_scroll.min(max_scroll);

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((state.output_scroll, 0)),
        inner,
    );
}

fn heading(text: &str, theme: &Theme) -> Line<'static> {
    Line::styled(
        text.to_owned(),
        Style::default().fg(theme.heading).add_modifier(Modifier::BOLD),
    )
}

fn review_lines(review: &ReviewResult, theme: &Theme) -> Vec<Line<'static>> {
    let score_style = Style::default()
        .fg(theme.score_color(review.score))
        .add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(vec![
            Span::raw("Score: "),
            Span::styled(format!("{}/10", review.score), score_style),
        ]),
        Line::raw(""),
    ];

    if !review.issues.is_empty() {
        lines.push(heading("Issues", theme));
        lines.extend(review.issues.iter().map(|issue| {
            Line::from(vec![
                Span::styled("  ! ", Style::default().fg(theme.issue)),
                Span::raw(issue.clone()),
            ])
        }));
        lines.push(Line::raw(""));
    }
    if !review.suggestions.is_empty() {
        lines.push(heading("Suggestions", theme));
        lines.extend(review.suggestions.iter().map(|s| {
            Line::from(vec![
                Span::styled("  + ", Style::default().fg(theme.suggestion)),
                Span::raw(s.clone()),
            ])
        }));
        lines.push(Line::raw(""));
    }

    lines.push(heading("Reasoning", theme));
    lines.extend(review.reasoning.split('\n').map(|l| Line::raw(l.to_owned())));
    lines
}

fn chat_lines(chat: &ChatSession, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![Line::raw(""), heading("Chat (c to ask a question)", theme)];
    for message in chat.transcript() {
        let (label, color) = match message.role {
            Role::User => ("you", theme.chat_user),
            Role::Assistant => ("assistant", theme.chat_assistant),
        };
        let label_style = Style::default().fg(color).add_modifier(Modifier::BOLD);
        let mut content = message.content.split('\n');
        let first = content.next().unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(format!("{label}: "), label_style),
            Span::raw(first.to_owned()),
        ]));
        lines.extend(content.map(|l| Line::raw(format!("  {l}"))));
    }
    if chat.is_sending() {
        lines.push(Line::styled("Thinking...", Style::default().fg(theme.muted)));
    }
    lines
}

/// Explanation first, then the highlighted code. Falls back to the selected
/// language when the service returns an unknown tag.
fn generation_lines(
    generation: &GenerationResult,
    selected: Language,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let language = Language::from_id(&generation.language).unwrap_or(selected);
    let mut lines = Vec::new();
    if !generation.explanation.is_empty() {
        lines.push(heading("Explanation", theme));
        lines.extend(generation.explanation.split('\n').map(|l| Line::raw(l.to_owned())));
        lines.push(Line::raw(""));
    }
    lines.push(heading("Code", theme));
    lines.extend(highlight_code(&generation.code, language));
    lines
}

fn placeholder_lines(theme: &Theme) -> Vec<Line<'static>> {
    let muted = Style::default().fg(theme.muted);
    vec![
        Line::styled("No result yet.", muted),
        Line::styled("Press i to edit, s to submit, m to switch Review/Generate.", muted),
    ]
}

/// Rows `lines` occupy when wrapped to `width` columns.
fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines.iter().map(|l| l.width().div_ceil(width).max(1)).sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};
    use smartcode_core::orchestrator::SubmissionOutput;

    fn draw(state: &mut AppState, width: u16, height: u16) -> Vec<String> {
        let theme = Theme::dark();
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| render_output(frame, frame.area(), state, &theme))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        (0..height)
            .map(|y| (0..width).map(|x| buffer[(x, y)].symbol()).collect::<String>())
            .collect()
    }

    fn review() -> ReviewResult {
        ReviewResult {
            score: 4,
            issues: vec!["SQL injection".to_owned()],
            suggestions: vec!["Use parameters".to_owned()],
            reasoning: "Unsafe query".to_owned(),
            language: "python".to_owned(),
            session_id: None,
        }
    }

    #[test]
    fn empty_state_shows_placeholder() {
        let mut state = AppState::default();
        let rows = draw(&mut state, 70, 6);
        assert!(rows[1].contains("No result yet."));
    }

    #[test]
    fn review_shows_score_issues_and_suggestions() {
        let mut state = AppState::default();
        state.orchestrator.show_review(review());
        let rows = draw(&mut state, 40, 14);
        assert!(rows[1].contains("Score: 4/10"));
        let text = rows.join("\n");
        assert!(text.contains("! SQL injection"));
        assert!(text.contains("+ Use parameters"));
        assert!(text.contains("Unsafe query"));
    }

    #[test]
    fn chat_transcript_follows_review() {
        let mut state = AppState::default();
        state.orchestrator.set_code("q()".to_owned());
        state.orchestrator.begin_submit();
        state.apply_submission(Ok(SubmissionOutput::Review(review())));
        let request = state.chat.as_mut().unwrap().begin_send("why?");
        assert!(request.is_some());

        let text = draw(&mut state, 40, 24).join("\n");
        assert!(text.contains("you: why?"));
        assert!(text.contains("Thinking..."));
    }

    #[test]
    fn generation_shows_explanation_and_code() {
        let mut state = AppState::default();
        state.orchestrator.set_code("a sum function".to_owned());
        state.orchestrator.set_mode(smartcode_core::orchestrator::Mode::Generate);
        state.orchestrator.begin_submit();
        state.apply_submission(Ok(SubmissionOutput::Generation(GenerationResult {
            code: "def add(a, b):\n    return a + b".to_owned(),
            explanation: "Adds two numbers".to_owned(),
            language: "python".to_owned(),
        })));
        let text = draw(&mut state, 40, 10).join("\n");
        assert!(text.contains("Adds two numbers"));
        assert!(text.contains("def add(a, b):"));
    }

    #[test]
    fn generated_code_keeps_its_own_grammar() {
        let theme = Theme::dark();
        let generation = GenerationResult {
            code: "def f():\n    return 1".to_owned(),
            explanation: String::new(),
            language: "python".to_owned(),
        };
        let expected = highlight_code(&generation.code, Language::Python);

        // The selector moving after generation does not change the highlighting.
        for selected in [Language::Python, Language::Css, Language::Php] {
            let lines = generation_lines(&generation, selected, &theme);
            assert_eq!(&lines[1..], expected.as_slice());
        }

        // An unknown tag falls back to the selector.
        let unknown = GenerationResult { language: "cobol".to_owned(), ..generation };
        let lines = generation_lines(&unknown, Language::Css, &theme);
        assert_eq!(&lines[1..], highlight_code(&unknown.code, Language::Css).as_slice());
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        let mut state = AppState::default();
        state.orchestrator.show_review(review());
        state.output_scroll = u16::MAX;
        draw(&mut state, 40, 6);
        assert!(state.output_scroll < 20);
        assert_eq!(state.output_viewport_height, 4);
    }
}
