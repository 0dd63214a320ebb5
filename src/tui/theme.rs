//! Centralized theme module for TUI color constants and styles

use crate::config::ThemeMode;
use ratatui::prelude::*;

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Score-based colors (traffic light pattern, high is good)
    pub score_high: Color,
    pub score_mid: Color,
    pub score_low: Color,
    pub bar_empty: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub index_color: Color,
    pub best_cell: Style,
    pub column_selected: Style,

    // Styles
    pub header_style: Style,
    pub row_selected: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,

    // Tab colors
    pub tab_active_style: Style,
    pub tab_inactive_style: Style,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    // Comparison colors
    pub advantage: Color,
    pub disadvantage: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            score_high: Color::Green,
            score_mid: Color::Yellow,
            score_low: Color::Red,
            bar_empty: Color::DarkGray,
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            best_cell: Style::new().fg(Color::Green).bold(),
            column_selected: Style::new().bg(Color::Indexed(238)),
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            tab_active_style: Style::new().fg(Color::Cyan).bold(),
            tab_inactive_style: Style::new().fg(Color::DarkGray),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            advantage: Color::Green,
            disadvantage: Color::Red,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
        }
    }

    pub fn light() -> Self {
        Self {
            score_high: Color::Rgb(0, 128, 0),
            score_mid: Color::Rgb(160, 110, 0),
            score_low: Color::Rgb(180, 0, 0),
            bar_empty: Color::Indexed(250),
            row_alt_bg: Color::Indexed(254),
            index_color: Color::Indexed(244),
            best_cell: Style::new().fg(Color::Rgb(0, 128, 0)).bold(),
            column_selected: Style::new().bg(Color::Indexed(253)),
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Indexed(242),
            title_color: Color::Blue,
            tab_active_style: Style::new().fg(Color::Blue).bold(),
            tab_inactive_style: Style::new().fg(Color::Indexed(246)),
            status_bar_bg: Color::Indexed(253),
            status_key_color: Color::Blue,
            flash_success: Color::Rgb(0, 128, 0),
            flash_error: Color::Rgb(180, 0, 0),
            advantage: Color::Rgb(0, 128, 0),
            disadvantage: Color::Rgb(180, 0, 0),
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
        }
    }

    /// Returns the appropriate color for a score based on its percentage of max score
    pub fn score_color(&self, score: f64, max_score: f64) -> Color {
        let percentage = if max_score > 0.0 {
            (score / max_score) * 100.0
        } else {
            0.0
        };

        if percentage >= 70.0 {
            self.score_high
        } else if percentage >= 40.0 {
            self.score_mid
        } else {
            self.score_low
        }
    }
}

/// Pick a palette for the configured mode. `Auto` asks the terminal for its
/// background luminance and falls back to dark when it can't tell.
pub fn resolve_theme(mode: ThemeMode) -> ThemeColors {
    match mode {
        ThemeMode::Dark => ThemeColors::dark(),
        ThemeMode::Light => ThemeColors::light(),
        ThemeMode::Auto => match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => ThemeColors::light(),
            Ok(_) => ThemeColors::dark(),
            Err(e) => {
                log::debug!("Could not detect terminal background: {}", e);
                ThemeColors::dark()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_color_thresholds() {
        let theme = ThemeColors::dark();
        assert_eq!(theme.score_color(8.0, 10.0), theme.score_high);
        assert_eq!(theme.score_color(7.0, 10.0), theme.score_high);
        assert_eq!(theme.score_color(5.0, 10.0), theme.score_mid);
        assert_eq!(theme.score_color(1.0, 10.0), theme.score_low);
        assert_eq!(theme.score_color(5.0, 0.0), theme.score_low);
    }

    #[test]
    fn test_explicit_modes_skip_detection() {
        assert_eq!(resolve_theme(ThemeMode::Light).title_color, Color::Blue);
        assert_eq!(resolve_theme(ThemeMode::Dark).title_color, Color::Cyan);
    }
}
