//! Syntax highlighting for the code surface and generated code.
//!
//! Highlighting is a pure projection of the text: one output [`Line`] per
//! `\n`-separated input line, so line N of the editor and line N of the
//! highlighted layer always refer to the same source line.

use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use smartcode_core::types::Language;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

static PS: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static TS: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Forces the lazy syntax and theme sets so the first keystroke does not pay for them.
pub fn warm_up() {
    let _ = &*PS;
    let _ = &*TS;
}

/// Highlights `text` as `language`.
///
/// Never fails: unknown grammars fall back to plain text and a line that
/// cannot be highlighted is emitted unstyled. Empty text yields one empty line.
pub fn highlight_code(text: &str, language: Language) -> Vec<Line<'static>> {
    let theme = TS.themes.get("base16-ocean.dark").or_else(|| TS.themes.values().next());
    let Some(theme) = theme else {
        return plain_lines(text);
    };

    let mut h = HighlightLines::new(syntax_for(language), theme);
    text.split('\n')
        .map(|line| {
            // The newlines syntax set expects each line to carry its terminator.
            let with_newline = format!("{line}\n");
            match h.highlight_line(&with_newline, &PS) {
                Ok(ranges) => {
                    let spans: Vec<Span<'static>> = ranges
                        .into_iter()
                        .filter_map(|(style, piece)| {
                            let piece = piece.trim_end_matches('\n');
                            (!piece.is_empty()).then(|| syntect_to_span(style, piece))
                        })
                        .collect();
                    Line::from(spans)
                }
                Err(_) => Line::raw(line.to_owned()),
            }
        })
        .collect()
}

/// Unstyled lines, same line splitting as [`highlight_code`].
pub fn plain_lines(text: &str) -> Vec<Line<'static>> {
    text.split('\n').map(|l| Line::raw(l.to_owned())).collect()
}

fn syntax_for(language: Language) -> &'static SyntaxReference {
    // The default syntax set has no TypeScript grammar; JavaScript is close enough.
    let ext = match language {
        Language::JavaScript | Language::TypeScript => "js",
        Language::Python => "py",
        Language::Html => "html",
        Language::Css => "css",
        Language::Json => "json",
        Language::C => "c",
        Language::Cpp => "cpp",
        Language::Php => "php",
    };
    PS.find_syntax_by_extension(ext).unwrap_or_else(|| PS.find_syntax_plain_text())
}

/// Converts a syntect (Style, &str) pair to an owned ratatui Span.
///
/// Background colors are dropped so the panel background shows through.
fn syntect_to_span(style: syntect::highlighting::Style, content: &str) -> Span<'static> {
    let fg = style.foreground;
    let mut ratatui_style = Style::default();
    if fg.a > 0 {
        ratatui_style = ratatui_style.fg(Color::Rgb(fg.r, fg.g, fg.b));
    }
    if style.font_style.contains(FontStyle::BOLD) {
        ratatui_style = ratatui_style.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        ratatui_style = ratatui_style.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        ratatui_style = ratatui_style.add_modifier(Modifier::UNDERLINED);
    }
    Span::styled(content.to_owned(), ratatui_style)
}
