//! Core types for the terminal front-end

use ratatui::style::Color;

/// Color scheme selected by the theme flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Light background
    Light,
    /// Dark background
    Dark,
}

impl Theme {
    /// Theme for the conversation's theme flag
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    /// Background color
    pub fn background(&self) -> Color {
        match self {
            Self::Light => Color::White,
            Self::Dark => Color::Black,
        }
    }

    /// Default text color
    pub fn foreground(&self) -> Color {
        match self {
            Self::Light => Color::Black,
            Self::Dark => Color::White,
        }
    }

    /// Color for the user's name and border accents
    pub fn user(&self) -> Color {
        match self {
            Self::Light => Color::Blue,
            Self::Dark => Color::LightBlue,
        }
    }

    /// Color for the assistant's name
    pub fn assistant(&self) -> Color {
        match self {
            Self::Light => Color::Magenta,
            Self::Dark => Color::LightMagenta,
        }
    }

    /// Color for timestamps, hints and the typing indicator
    pub fn muted(&self) -> Color {
        Color::DarkGray
    }

    /// Color for inline code
    pub fn code(&self) -> Color {
        match self {
            Self::Light => Color::Red,
            Self::Dark => Color::Yellow,
        }
    }

    /// Color for the online badge
    pub fn online(&self, online: bool) -> Color {
        if online {
            Color::Green
        } else {
            Color::Red
        }
    }
}
