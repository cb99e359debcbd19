//! Editable code surface with a synchronized highlighted layer.
//!
//! The surface never owns the text. Every edit is computed against the text
//! the caller passes in and the whole new text is returned; the caller stores
//! it (in the orchestrator) and passes it back on the next frame. The surface
//! keeps only view state: the caret, a single vertical offset that positions
//! both the gutter and the highlighted lines, and a horizontal offset for the
//! code column so the caret stays on screen on long lines.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};
use smartcode_core::types::Language;

use crate::highlight::highlight_code;
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

const TAB: &str = "    ";

/// View state of the code surface.
#[derive(Debug, Default)]
pub struct CodeSurfaceState {
    /// Caret line, 0-based.
    pub cursor_line: usize,
    /// Caret column in chars, 0-based.
    pub cursor_col: usize,
    /// First visible line. Shared by the gutter and the highlighted layer.
    pub scroll: usize,
    /// First visible column of the code (the gutter never scrolls).
    pub hscroll: usize,
    /// Inner height from the previous render.
    pub viewport_height: u16,
    /// Width of the code column from the previous render.
    pub viewport_width: u16,
    cache: Option<HighlightCache>,
}

#[derive(Debug)]
struct HighlightCache {
    text: String,
    language: Language,
    lines: Vec<Line<'static>>,
}

impl CodeSurfaceState {
    /// Puts the caret back inside `text` after it changed underneath the surface.
    pub fn clamp(&mut self, text: &str) {
        let line_count = text.split('\n').count();
        self.cursor_line = self.cursor_line.min(line_count - 1);
        let len = text.split('\n').nth(self.cursor_line).map_or(0, |l| l.chars().count());
        self.cursor_col = self.cursor_col.min(len);
        self.scroll = self.scroll.min(line_count - 1);
    }

    /// Moves the caret to the start of the text.
    pub fn reset(&mut self) {
        self.cursor_line = 0;
        self.cursor_col = 0;
        self.scroll = 0;
        self.hscroll = 0;
    }

    /// Scrolls by `delta` lines without moving the caret (mouse wheel).
    pub fn scroll_by(&mut self, delta: isize, text: &str) {
        let max = text.split('\n').count() - 1;
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    fn ensure_visible(&mut self) {
        if self.cursor_line < self.scroll {
            self.scroll = self.cursor_line;
        }
        let height = usize::from(self.viewport_height);
        if height > 0 && self.cursor_line >= self.scroll + height {
            self.scroll = self.cursor_line + 1 - height;
        }
        self.ensure_column_visible();
    }

    fn ensure_column_visible(&mut self) {
        if self.cursor_col < self.hscroll {
            self.hscroll = self.cursor_col;
        }
        let width = usize::from(self.viewport_width);
        if width > 0 && self.cursor_col >= self.hscroll + width {
            self.hscroll = self.cursor_col + 1 - width;
        }
    }

    fn highlighted(&mut self, text: &str, language: Language) -> &[Line<'static>] {
        let stale = self.cache.as_ref().is_none_or(|c| c.language != language || c.text != text);
        if stale {
            self.cache = Some(HighlightCache {
                text: text.to_owned(),
                language,
                lines: highlight_code(text, language),
            });
        }
        self.cache.as_ref().map_or(&[], |c| c.lines.as_slice())
    }
}

/// Applies a key to the surface.
///
/// Returns the new text when the key edited it. Caret movement always works;
/// edits are ignored while `disabled`.
pub fn handle_key(
    key: KeyEvent,
    text: &str,
    state: &mut CodeSurfaceState,
    disabled: bool,
) -> Option<String> {
    state.clamp(text);
    let mut lines: Vec<String> = text.split('\n').map(str::to_owned).collect();
    let plain = !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
    let page = page(state);

    let edited = match key.code {
        KeyCode::Left => move_left(&lines, state),
        KeyCode::Right => move_right(&lines, state),
        KeyCode::Up => move_vertical(&lines, state, -1),
        KeyCode::Down => move_vertical(&lines, state, 1),
        KeyCode::PageUp => move_vertical(&lines, state, -page),
        KeyCode::PageDown => move_vertical(&lines, state, page),
        KeyCode::Home => {
            state.cursor_col = 0;
            false
        }
        KeyCode::End => {
            state.cursor_col = char_len(&lines[state.cursor_line]);
            false
        }
        _ if disabled => false,
        KeyCode::Char(c) if plain => insert_text(&mut lines, state, c.encode_utf8(&mut [0; 4])),
        KeyCode::Enter => insert_text(&mut lines, state, "\n"),
        KeyCode::Tab => insert_text(&mut lines, state, TAB),
        KeyCode::Backspace => backspace(&mut lines, state),
        KeyCode::Delete => delete(&mut lines, state),
        _ => false,
    };

    state.ensure_visible();
    edited.then(|| lines.join("\n"))
}

/// Inserts pasted text at the caret. Line endings are normalised to `\n`.
pub fn handle_paste(
    pasted: &str,
    text: &str,
    state: &mut CodeSurfaceState,
    disabled: bool,
) -> Option<String> {
    if disabled || pasted.is_empty() {
        return None;
    }
    state.clamp(text);
    let normalised = pasted.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<String> = text.split('\n').map(str::to_owned).collect();
    insert_text(&mut lines, state, &normalised);
    state.ensure_visible();
    Some(lines.join("\n"))
}

fn page(state: &CodeSurfaceState) -> isize {
    (usize::from(state.viewport_height.max(2)) - 1) as isize
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn byte_index(s: &str, col: usize) -> usize {
    s.char_indices().nth(col).map_or(s.len(), |(i, _)| i)
}

fn move_left(lines: &[String], state: &mut CodeSurfaceState) -> bool {
    if state.cursor_col > 0 {
        state.cursor_col -= 1;
    } else if state.cursor_line > 0 {
        state.cursor_line -= 1;
        state.cursor_col = char_len(&lines[state.cursor_line]);
    }
    false
}

fn move_right(lines: &[String], state: &mut CodeSurfaceState) -> bool {
    if state.cursor_col < char_len(&lines[state.cursor_line]) {
        state.cursor_col += 1;
    } else if state.cursor_line + 1 < lines.len() {
        state.cursor_line += 1;
        state.cursor_col = 0;
    }
    false
}

fn move_vertical(lines: &[String], state: &mut CodeSurfaceState, delta: isize) -> bool {
    state.cursor_line = state.cursor_line.saturating_add_signed(delta).min(lines.len() - 1);
    state.cursor_col = state.cursor_col.min(char_len(&lines[state.cursor_line]));
    false
}

fn insert_text(lines: &mut Vec<String>, state: &mut CodeSurfaceState, text: &str) -> bool {
    let line = &lines[state.cursor_line];
    let at = byte_index(line, state.cursor_col);
    let head = line[..at].to_owned();
    let tail = line[at..].to_owned();

    let mut pieces = text.split('\n');
    let first = pieces.next().unwrap_or_default();
    let rest: Vec<&str> = pieces.collect();

    match rest.split_last() {
        None => {
            lines[state.cursor_line] = format!("{head}{first}{tail}");
            state.cursor_col += char_len(first);
        }
        Some((last, middle)) => {
            lines[state.cursor_line] = format!("{head}{first}");
            let mut row = state.cursor_line + 1;
            for piece in middle {
                lines.insert(row, (*piece).to_owned());
                row += 1;
            }
            lines.insert(row, format!("{last}{tail}"));
            state.cursor_line = row;
            state.cursor_col = char_len(last);
        }
    }
    true
}

fn backspace(lines: &mut Vec<String>, state: &mut CodeSurfaceState) -> bool {
    if state.cursor_col > 0 {
        let line = &mut lines[state.cursor_line];
        let at = byte_index(line, state.cursor_col - 1);
        line.remove(at);
        state.cursor_col -= 1;
        true
    } else if state.cursor_line > 0 {
        let current = lines.remove(state.cursor_line);
        state.cursor_line -= 1;
        state.cursor_col = char_len(&lines[state.cursor_line]);
        lines[state.cursor_line].push_str(&current);
        true
    } else {
        false
    }
}

fn delete(lines: &mut Vec<String>, state: &mut CodeSurfaceState) -> bool {
    let len = char_len(&lines[state.cursor_line]);
    if state.cursor_col < len {
        let line = &mut lines[state.cursor_line];
        let at = byte_index(line, state.cursor_col);
        line.remove(at);
        true
    } else if state.cursor_line + 1 < lines.len() {
        let next = lines.remove(state.cursor_line + 1);
        lines[state.cursor_line].push_str(&next);
        true
    } else {
        false
    }
}

/// What the surface shows this frame.
pub struct SurfaceProps<'a> {
    pub text: &'a str,
    pub language: Language,
    pub title: &'a str,
    pub focused: bool,
    /// Show the terminal caret.
    pub editing: bool,
    pub disabled: bool,
}

/// Renders the gutter and the highlighted text at the shared scroll offset.
pub fn render_code_surface(
    frame: &mut Frame,
    area: Rect,
    props: &SurfaceProps<'_>,
    state: &mut CodeSurfaceState,
    theme: &Theme,
) {
    let mut block = panel_block(props.title, props.focused, theme);
    if props.disabled {
        block = block.border_style(Style::default().fg(theme.editor_disabled));
    }
    let inner = inner_rect(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    state.viewport_height = inner.height;
    state.clamp(props.text);
    let scroll = state.scroll;
    let gutter_style = Style::default().fg(theme.gutter);

    let total = state.highlighted(props.text, props.language).len();
    let digits = total.to_string().len().max(2);
    let gutter_width = (digits as u16 + 1).min(inner.width);
    let [gutter_area, code_area] = inner.layout(&Layout::horizontal([
        Constraint::Length(gutter_width),
        Constraint::Fill(1),
    ]));
    state.viewport_width = code_area.width;
    state.ensure_column_visible();
    let hscroll = state.hscroll;

    let end = (scroll + usize::from(inner.height)).min(total);
    let numbers: Vec<Line<'static>> = (scroll..end)
        .map(|n| Line::from(Span::styled(format!("{:>digits$} ", n + 1), gutter_style)))
        .collect();
    let visible: Vec<Line<'static>> = state.highlighted(props.text, props.language)[scroll..end].to_vec();

    frame.render_widget(Paragraph::new(numbers), gutter_area);
    let hscroll_cells = u16::try_from(hscroll).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(visible).scroll((0, hscroll_cells)), code_area);

    if props.editing && !props.disabled && state.cursor_line >= scroll && code_area.width > 0 {
        let row = state.cursor_line - scroll;
        let col = state.cursor_col.saturating_sub(hscroll);
        if row < usize::from(inner.height) && col < usize::from(code_area.width) {
            frame.set_cursor_position(Position {
                x: code_area.x + col as u16,
                y: code_area.y + row as u16,
            });
        }
    }
}
