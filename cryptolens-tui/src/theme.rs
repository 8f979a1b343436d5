//! Neon-on-charcoal palette for the CryptoLens TUI.
//!
//! Gains are neon green, losses hot pink, focus electric cyan. Widgets use
//! the free style functions; raw colors are exposed for bar drawing.

use ratatui::style::{Color, Modifier, Style};

use cryptolens_board::Tone;

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 60, 60);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT: Color = Color::White;

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn text() -> Style {
    Style::default().fg(TEXT)
}

/// Highlight for the row under the cursor.
pub fn cursor() -> Style {
    Style::default().fg(Color::Black).bg(ACCENT)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

/// Green for gains (zero included), pink for losses, muted when absent.
pub fn change_color(value: Option<f64>) -> Color {
    tone_color(Tone::of(value))
}

pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Gain => POSITIVE,
        Tone::Loss => NEGATIVE,
        Tone::NoData => MUTED,
    }
}

pub fn tone_style(tone: Tone) -> Style {
    Style::default().fg(tone_color(tone))
}
