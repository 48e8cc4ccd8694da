//! Color themes for the patch viewer.

use ratatui::style::Color;

/// Complete color theme for the application
#[derive(Debug, Clone)]
pub struct Theme {
    // Base colors
    pub panel_bg: Color,
    pub bg_highlight: Color,
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub fg_dim: Color,

    // Diff colors
    pub diff_add: Color,
    pub diff_add_bg: Color,
    pub diff_del: Color,
    pub diff_del_bg: Color,
    pub diff_context: Color,
    pub diff_hunk_header: Color,

    // File status colors
    pub file_added: Color,
    pub file_modified: Color,
    pub file_deleted: Color,
    pub file_renamed: Color,

    // Review thread colors
    pub thread_marker: Color,
    pub comment_author: Color,
    pub comment_timestamp: Color,
    pub comment_link: Color,
    pub comment_hidden: Color,

    // UI element colors
    pub border_focused: Color,
    pub status_bar_bg: Color,
    pub cursor_color: Color,

    // Message colors
    pub message_info_fg: Color,
    pub message_info_bg: Color,
    pub message_warning_fg: Color,
    pub message_warning_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            panel_bg: Color::Rgb(24, 24, 28),
            bg_highlight: Color::Rgb(70, 70, 70),
            fg_primary: Color::White,
            fg_secondary: Color::Rgb(210, 210, 210),
            fg_dim: Color::Rgb(160, 160, 160),

            diff_add: Color::Rgb(80, 220, 120),
            diff_add_bg: Color::Rgb(0, 60, 20),
            diff_del: Color::Rgb(240, 90, 90),
            diff_del_bg: Color::Rgb(70, 0, 0),
            diff_context: Color::Rgb(200, 200, 200),
            diff_hunk_header: Color::Rgb(90, 200, 255),

            file_added: Color::Rgb(80, 220, 120),
            file_modified: Color::Rgb(255, 210, 90),
            file_deleted: Color::Rgb(240, 90, 90),
            file_renamed: Color::Rgb(255, 140, 220),

            thread_marker: Color::Rgb(255, 210, 90),
            comment_author: Color::Rgb(90, 170, 255),
            comment_timestamp: Color::Rgb(140, 140, 140),
            comment_link: Color::Rgb(90, 220, 240),
            comment_hidden: Color::Rgb(110, 110, 110),

            border_focused: Color::Rgb(90, 200, 255),
            status_bar_bg: Color::Rgb(30, 30, 30),
            cursor_color: Color::Rgb(255, 210, 90),

            message_info_fg: Color::Black,
            message_info_bg: Color::Cyan,
            message_warning_fg: Color::Black,
            message_warning_bg: Color::Rgb(255, 210, 90),
        }
    }

    /// For light terminal backgrounds
    pub fn light() -> Self {
        Self {
            panel_bg: Color::Rgb(245, 243, 232),
            bg_highlight: Color::Rgb(200, 200, 220),
            fg_primary: Color::Rgb(0, 0, 0),
            fg_secondary: Color::Rgb(30, 30, 30),
            fg_dim: Color::Rgb(80, 80, 80),

            diff_add: Color::Rgb(0, 80, 0),
            diff_add_bg: Color::Rgb(220, 255, 220),
            diff_del: Color::Rgb(120, 0, 0),
            diff_del_bg: Color::Rgb(255, 240, 240),
            diff_context: Color::Rgb(0, 0, 0),
            diff_hunk_header: Color::Rgb(0, 60, 140),

            file_added: Color::Rgb(0, 100, 0),
            file_modified: Color::Rgb(140, 80, 0),
            file_deleted: Color::Rgb(160, 0, 0),
            file_renamed: Color::Rgb(100, 0, 100),

            thread_marker: Color::Rgb(140, 80, 0),
            comment_author: Color::Rgb(0, 60, 140),
            comment_timestamp: Color::Rgb(90, 90, 90),
            comment_link: Color::Rgb(0, 100, 120),
            comment_hidden: Color::Rgb(120, 120, 120),

            border_focused: Color::Rgb(0, 60, 140),
            status_bar_bg: Color::Rgb(210, 210, 220),
            cursor_color: Color::Rgb(140, 80, 0),

            message_info_fg: Color::Black,
            message_info_bg: Color::Rgb(140, 220, 255),
            message_warning_fg: Color::Black,
            message_warning_bg: Color::Rgb(240, 210, 150),
        }
    }
}

/// Theme selection from CLI argument or config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeArg {
    #[default]
    Dark,
    Light,
}

const THEME_CHOICES: [(&str, ThemeArg); 2] = [("dark", ThemeArg::Dark), ("light", ThemeArg::Light)];

impl ThemeArg {
    fn choices() -> &'static [(&'static str, ThemeArg)] {
        &THEME_CHOICES
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::choices()
            .iter()
            .find_map(|(name, theme)| (*name == normalized).then_some(*theme))
    }

    pub fn valid_values_display() -> String {
        Self::choices()
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn resolve_theme(arg: ThemeArg) -> Theme {
    match arg {
        ThemeArg::Dark => Theme::dark(),
        ThemeArg::Light => Theme::light(),
    }
}

/// CLI wins over config; an unknown config value falls back to dark with a warning.
pub fn resolve_theme_arg_with_config(
    cli_theme: Option<ThemeArg>,
    config_theme: Option<&str>,
) -> (ThemeArg, Vec<String>) {
    let mut warnings = Vec::new();

    if let Some(theme) = cli_theme {
        return (theme, warnings);
    }

    if let Some(config_theme) = config_theme {
        if let Some(theme) = ThemeArg::from_str(config_theme) {
            return (theme, warnings);
        }

        let valid_values = ThemeArg::valid_values_display();
        warnings.push(format!(
            "Warning: Unknown theme '{config_theme}' in config, using dark. Valid options: {valid_values}"
        ));
    }

    (ThemeArg::Dark, warnings)
}

pub fn resolve_theme_with_config(
    cli_theme: Option<ThemeArg>,
    config_theme: Option<&str>,
) -> (Theme, Vec<String>) {
    let (theme_arg, warnings) = resolve_theme_arg_with_config(cli_theme, config_theme);
    (resolve_theme(theme_arg), warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_theme_names_case_insensitively() {
        assert_eq!(ThemeArg::from_str("Light"), Some(ThemeArg::Light));
        assert_eq!(ThemeArg::from_str(" dark "), Some(ThemeArg::Dark));
        assert_eq!(ThemeArg::from_str("solarized"), None);
    }

    #[test]
    fn should_use_cli_theme_over_config_theme() {
        let (resolved, warnings) =
            resolve_theme_arg_with_config(Some(ThemeArg::Light), Some("dark"));
        assert_eq!(resolved, ThemeArg::Light);
        assert!(warnings.is_empty());
    }

    #[test]
    fn should_use_config_theme_when_cli_missing() {
        let (resolved, warnings) = resolve_theme_arg_with_config(None, Some("light"));
        assert_eq!(resolved, ThemeArg::Light);
        assert!(warnings.is_empty());
    }

    #[test]
    fn should_fallback_to_dark_and_warn_for_invalid_config_theme() {
        let (resolved, warnings) = resolve_theme_arg_with_config(None, Some("unknown"));
        assert_eq!(resolved, ThemeArg::Dark);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Unknown theme 'unknown'"));
    }

    #[test]
    fn should_fallback_to_dark_when_no_theme_is_set() {
        let (resolved, warnings) = resolve_theme_arg_with_config(None, None);
        assert_eq!(resolved, ThemeArg::Dark);
        assert!(warnings.is_empty());
    }
}
