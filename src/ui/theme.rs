//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::channel::ConnectionState;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic selection based on the
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for the plotted series and highlights.
    pub highlight: Color,
    /// Color for channels that are connecting or degraded.
    pub warning: Color,
    /// Color for failed channels.
    pub critical: Color,
    /// Color for open, healthy channels.
    pub ok: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for the header line.
    pub header: Style,
    /// Style for axis labels.
    pub axis: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            ok: Color::Green,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            axis: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            ok: Color::Green,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            axis: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Whether the hosting terminal has a dark background.
    pub fn terminal_is_dark() -> bool {
        // terminal-light reports background luminance; failure means we
        // cannot ask (no tty), so assume dark
        !matches!(terminal_light::luma(), Ok(luma) if luma > 0.5)
    }

    /// Auto-detect based on terminal background.
    pub fn auto_detect() -> Self {
        if Self::terminal_is_dark() {
            Self::dark()
        } else {
            Self::light()
        }
    }

    /// Get style for a channel's connection state.
    pub fn state_style(&self, state: ConnectionState) -> Style {
        match state {
            ConnectionState::Open => Style::default().fg(self.ok),
            ConnectionState::Connecting => Style::default().fg(self.warning),
            ConnectionState::Closed => Style::default().fg(self.border).add_modifier(Modifier::DIM),
            ConnectionState::Failed => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }
}
