//! Color theme system for smartcode.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every UI surface
//! smartcode renders. Two built-in themes are provided:
//!
//! - `dark` uses ANSI 16 colors so it works on any terminal, including
//!   256-color SSH sessions with no truecolor support.
//! - `catppuccin_mocha` uses the Catppuccin Mocha palette in RGB; requires truecolor.

use ratatui::style::Color;

/// All color values used across smartcode's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    pub border_active: Color,
    pub border_inactive: Color,

    // Code surface
    /// Line-number gutter.
    pub gutter: Color,
    /// Border of the code surface while it is disabled (submission in flight).
    pub editor_disabled: Color,

    // Review output
    /// Score of 8 and above.
    pub score_good: Color,
    /// Score of 5 to 7.
    pub score_fair: Color,
    /// Score below 5.
    pub score_poor: Color,
    pub issue: Color,
    pub suggestion: Color,
    pub heading: Color,

    // Chat transcript
    pub chat_user: Color,
    pub chat_assistant: Color,

    // Error banner
    pub error_bg: Color,
    pub error_fg: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    /// Mode indicator color when in NORMAL mode.
    pub status_mode_normal: Color,
    /// Mode indicator color when typing (editor, chat or file prompt).
    pub status_mode_insert: Color,
    /// Highlight of the active Review/Generate tab.
    pub tab_active: Color,

    // General
    /// Secondary text: hints, timestamps, placeholders.
    pub muted: Color,
    pub background: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            gutter: Color::DarkGray,
            editor_disabled: Color::DarkGray,

            score_good: Color::Green,
            score_fair: Color::Yellow,
            score_poor: Color::Red,
            issue: Color::Red,
            suggestion: Color::Green,
            heading: Color::Cyan,

            chat_user: Color::Blue,
            chat_assistant: Color::Reset,

            error_bg: Color::Red,
            error_fg: Color::White,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_insert: Color::Green,
            tab_active: Color::Yellow,

            muted: Color::DarkGray,
            background: Color::Reset,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let blue = Color::Rgb(137, 180, 250); // #89b4fa
        let teal = Color::Rgb(148, 226, 213); // #94e2d5
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let base = Color::Rgb(30, 30, 46); // #1e1e2e
        let text = Color::Rgb(205, 214, 244); // #cdd6f4
        let peach = Color::Rgb(250, 179, 135); // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            gutter: overlay1,
            editor_disabled: surface1,

            score_good: green,
            score_fair: yellow,
            score_poor: red,
            issue: red,
            suggestion: green,
            heading: teal,

            chat_user: blue,
            chat_assistant: text,

            error_bg: red,
            error_fg: base,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_insert: green,
            tab_active: peach,

            muted: overlay1,
            background: base,
        }
    }

    /// Resolves a theme name string to the corresponding built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents
    /// startup.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!("unknown theme '{other}', falling back to 'dark'");
                Self::dark()
            }
        }
    }

    /// Color for a review score out of ten.
    pub fn score_color(&self, score: u8) -> Color {
        match score {
            8.. => self.score_good,
            5..=7 => self.score_fair,
            _ => self.score_poor,
        }
    }
}
