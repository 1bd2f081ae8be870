//! Geometry, color and box-style primitives shared by widgets and the render layer.

use std::fmt;

use crate::core::text::width::single_cell;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

/// Padding box: one extent per side, in cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Spacing {
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
    pub left: usize,
}

impl Spacing {
    pub const fn all(value: usize) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub const fn symmetric(vertical: usize, horizontal: usize) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub const fn horizontal(&self) -> usize {
        self.left + self.right
    }

    pub const fn vertical(&self) -> usize {
        self.top + self.bottom
    }
}

/// Foreground color. Named colors map onto the classic 16-color SGR range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Ansi256(u8),
    Rgb(u8, u8, u8),
}

pub const SGR_RESET: &str = "\x1b[0m";

impl Color {
    /// SGR escape sequence that switches the foreground to this color.
    pub fn sgr(&self) -> String {
        match self {
            Color::Black => "\x1b[30m".to_string(),
            Color::Red => "\x1b[31m".to_string(),
            Color::Green => "\x1b[32m".to_string(),
            Color::Yellow => "\x1b[33m".to_string(),
            Color::Blue => "\x1b[34m".to_string(),
            Color::Magenta => "\x1b[35m".to_string(),
            Color::Cyan => "\x1b[36m".to_string(),
            Color::White => "\x1b[37m".to_string(),
            Color::BrightBlack => "\x1b[90m".to_string(),
            Color::BrightRed => "\x1b[91m".to_string(),
            Color::BrightGreen => "\x1b[92m".to_string(),
            Color::BrightYellow => "\x1b[93m".to_string(),
            Color::BrightBlue => "\x1b[94m".to_string(),
            Color::BrightMagenta => "\x1b[95m".to_string(),
            Color::BrightCyan => "\x1b[96m".to_string(),
            Color::BrightWhite => "\x1b[97m".to_string(),
            Color::Ansi256(index) => format!("\x1b[38;5;{index}m"),
            Color::Rgb(r, g, b) => format!("\x1b[38;2;{r};{g};{b}m"),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sgr())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BorderKind {
    #[default]
    None,
    Square,
    Rounded,
}

impl BorderKind {
    pub const fn is_drawn(&self) -> bool {
        !matches!(self, BorderKind::None)
    }

    /// Corner glyphs in order: top-left, top-right, bottom-left, bottom-right.
    pub(crate) const fn corners(&self) -> [char; 4] {
        match self {
            BorderKind::Rounded => ['╭', '╮', '╰', '╯'],
            _ => ['┌', '┐', '└', '┘'],
        }
    }

    /// Cells consumed by the border on each axis.
    pub const fn extent(&self) -> usize {
        if self.is_drawn() {
            2
        } else {
            0
        }
    }
}

pub(crate) const BORDER_HORIZONTAL: char = '─';
pub(crate) const BORDER_VERTICAL: char = '│';

/// Box decoration shared by every component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub border: BorderKind,
    pub border_color: Option<Color>,
    /// Color of the component's own content (text glyphs).
    pub color: Option<Color>,
    pub padding: Spacing,
    /// Cell used for unfilled area.
    pub fill: char,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            border: BorderKind::None,
            border_color: None,
            color: None,
            padding: Spacing::default(),
            fill: ' ',
        }
    }
}

impl Style {
    /// Horizontal and vertical cells consumed by border and padding.
    pub fn chrome(&self) -> Size {
        Size {
            width: self.border.extent() + self.padding.horizontal(),
            height: self.border.extent() + self.padding.vertical(),
        }
    }

    /// The fill cell actually drawn. Fills wider or narrower than one column become a space.
    pub fn fill_char(&self) -> char {
        single_cell(self.fill)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
    Stretch,
}
