//! Color palettes for the TUI front end.
//!
//! Pure data: immutable palettes keyed by name, cycled with the `t` key.

use ratatui::style::Color;

/// Roles a palette colors in the plan view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Palette name shown in the status bar.
    pub name: &'static str,
    /// Assistant output text.
    pub output: Color,
    /// Operator answer lines.
    pub answer: Color,
    /// Completion notice.
    pub success: Color,
    /// Error notice.
    pub error: Color,
    /// Question option number highlight.
    pub question: Color,
}

/// All palettes, in cycle order.
pub const PALETTES: &[Palette] = &[
    Palette {
        name: "github-dark",
        output: Color::Rgb(0xc9, 0xd1, 0xd9),
        answer: Color::Rgb(0x58, 0xa6, 0xff),
        success: Color::Rgb(0x3f, 0xb9, 0x50),
        error: Color::Rgb(0xf8, 0x51, 0x49),
        question: Color::Rgb(0x58, 0xa6, 0xff),
    },
    Palette {
        name: "dracula",
        output: Color::Rgb(0xf8, 0xf8, 0xf2),
        answer: Color::Rgb(0x8b, 0xe9, 0xfd),
        success: Color::Rgb(0x50, 0xfa, 0x7b),
        error: Color::Rgb(0xff, 0x55, 0x55),
        question: Color::Rgb(0xbd, 0x93, 0xf9),
    },
    Palette {
        name: "nord",
        output: Color::Rgb(0xd8, 0xde, 0xe9),
        answer: Color::Rgb(0x88, 0xc0, 0xd0),
        success: Color::Rgb(0xa3, 0xbe, 0x8c),
        error: Color::Rgb(0xbf, 0x61, 0x6a),
        question: Color::Rgb(0x81, 0xa1, 0xc1),
    },
    Palette {
        name: "solarized",
        output: Color::Rgb(0x83, 0x94, 0x96),
        answer: Color::Rgb(0x26, 0x8b, 0xd2),
        success: Color::Rgb(0x85, 0x99, 0x00),
        error: Color::Rgb(0xdc, 0x32, 0x2f),
        question: Color::Rgb(0x2a, 0xa1, 0x98),
    },
    Palette {
        name: "monokai",
        output: Color::Rgb(0xf8, 0xf8, 0xf2),
        answer: Color::Rgb(0x66, 0xd9, 0xe8),
        success: Color::Rgb(0xa6, 0xe2, 0x2e),
        error: Color::Rgb(0xf9, 0x26, 0x72),
        question: Color::Rgb(0xe6, 0xdb, 0x74),
    },
];

/// Look up a palette by name.
#[must_use]
pub fn palette(name: &str) -> Option<&'static Palette> {
    PALETTES.iter().find(|palette| palette.name == name)
}

/// Index of the palette the TUI starts with.
#[must_use]
pub fn default_palette_index() -> usize {
    PALETTES
        .iter()
        .position(|palette| palette.name == "dracula")
        .unwrap_or(0)
}
