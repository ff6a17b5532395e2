//! Terminal theme detection and color definitions

use ratatui::style::Color;

/// Direction of a cost change, for coloring growth figures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Flat,
    Down,
}

/// Classify a growth percentage. Rising spend is the alarming direction.
pub fn trend(growth_pct: f64) -> Trend {
    if growth_pct > 0.0 {
        Trend::Up
    } else if growth_pct < 0.0 {
        Trend::Down
    } else {
        Trend::Flat
    }
}

/// Terminal color scheme (dark or light background)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Series colors for per-provider charts (dark background)
const DARK_SERIES: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::LightRed,
];

/// Series colors for per-provider charts (light background, ANSI 256)
const LIGHT_SERIES: [Color; 6] = [
    Color::Indexed(25),
    Color::Indexed(90),
    Color::Indexed(22),
    Color::Indexed(130),
    Color::Indexed(31),
    Color::Indexed(124),
];

impl Theme {
    /// Auto-detect terminal theme from background luminance.
    /// Must be called **before** entering raw mode (ratatui::init).
    /// Falls back to Dark if detection fails.
    pub fn detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => Self::Light,
            _ => Self::Dark,
        }
    }

    /// Primary text color (headers, body text)
    pub fn text(self) -> Color {
        match self {
            Self::Dark => Color::White,
            Self::Light => Color::Black,
        }
    }

    /// Active/accent color (selected tabs, keybinding keys, interactive elements)
    pub fn accent(self) -> Color {
        match self {
            Self::Dark => Color::Cyan,
            Self::Light => Color::Indexed(25), // dark blue (ANSI 256)
        }
    }

    /// Secondary/muted text (separators, inactive tabs, hints)
    pub fn muted(self) -> Color {
        match self {
            Self::Dark => Color::DarkGray,
            Self::Light => Color::Gray,
        }
    }

    /// Month label color
    pub fn month(self) -> Color {
        match self {
            Self::Dark => Color::Yellow,
            Self::Light => Color::Indexed(130), // dark orange/yellow (ANSI 256)
        }
    }

    /// Cost/money text color
    pub fn cost(self) -> Color {
        match self {
            Self::Dark => Color::Magenta,
            Self::Light => Color::Indexed(90), // dark magenta (ANSI 256)
        }
    }

    /// Bar/positive indicator color
    pub fn bar(self) -> Color {
        match self {
            Self::Dark => Color::Green,
            Self::Light => Color::Indexed(22), // dark green (ANSI 256)
        }
    }

    /// Error/negative indicator color
    pub fn error(self) -> Color {
        match self {
            Self::Dark => Color::Red,
            Self::Light => Color::Indexed(124), // dark red (ANSI 256)
        }
    }

    /// Stats accent color (Average card)
    pub fn stat_blue(self) -> Color {
        match self {
            Self::Dark => Color::Blue,
            Self::Light => Color::Indexed(25), // dark blue (ANSI 256)
        }
    }

    /// Stats warm highlight (Total Cost card)
    pub fn stat_warm(self) -> Color {
        match self {
            Self::Dark => Color::LightRed,
            Self::Light => Color::Red,
        }
    }

    /// Growth figure color: rising spend is red, falling spend green
    pub fn trend_color(self, trend: Trend) -> Color {
        match trend {
            Trend::Up => self.error(),
            Trend::Down => self.bar(),
            Trend::Flat => self.text(),
        }
    }

    /// Color for the n-th provider series (wraps around)
    pub fn series(self, index: usize) -> Color {
        let palette = match self {
            Self::Dark => &DARK_SERIES,
            Self::Light => &LIGHT_SERIES,
        };
        palette[index % palette.len()]
    }
}
