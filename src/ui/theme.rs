//! Color themes for the board
//!
//! Presets: darkwall (default), catppuccin-mocha, nord, gruvbox

use ratatui::style::Color;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Main background color
    pub background: Color,
    /// Panel content
    pub foreground: Color,
    /// Border of unfocused panels
    pub border: Color,
    /// Border and title marker of the focused panel
    pub accent: Color,
    /// Panel titles
    pub title: Color,
    /// Secondary info (update age, key hints)
    pub dimmed: Color,
    /// Error indicator of a failed refresh
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::darkwall()
    }
}

impl Theme {
    /// Darkwall theme - default
    pub fn darkwall() -> Self {
        Self {
            background: Color::Rgb(13, 17, 22),    // #0d1116
            foreground: Color::Rgb(229, 234, 241), // #e5eaf1
            border: Color::Rgb(55, 65, 81),        // #374151
            accent: Color::Rgb(180, 83, 9),        // #b45309 (amber)
            title: Color::Rgb(156, 163, 175),      // #9ca3af
            dimmed: Color::Rgb(107, 114, 128),     // #6b7280
            error: Color::Rgb(239, 68, 68),        // #ef4444
        }
    }

    /// Catppuccin Mocha theme
    pub fn catppuccin_mocha() -> Self {
        Self {
            background: Color::Rgb(30, 30, 46),    // #1e1e2e (base)
            foreground: Color::Rgb(205, 214, 244), // #cdd6f4 (text)
            border: Color::Rgb(69, 71, 90),        // #45475a (surface1)
            accent: Color::Rgb(137, 180, 250),     // #89b4fa (blue)
            title: Color::Rgb(166, 173, 200),      // #a6adc8 (subtext0)
            dimmed: Color::Rgb(147, 153, 178),     // #9399b2 (overlay2)
            error: Color::Rgb(243, 139, 168),      // #f38ba8 (red)
        }
    }

    /// Nord theme
    pub fn nord() -> Self {
        Self {
            background: Color::Rgb(46, 52, 64),    // #2e3440 (nord0)
            foreground: Color::Rgb(236, 239, 244), // #eceff4 (nord6)
            border: Color::Rgb(67, 76, 94),        // #434c5e (nord2)
            accent: Color::Rgb(136, 192, 208),     // #88c0d0 (nord8)
            title: Color::Rgb(216, 222, 233),      // #d8dee9 (nord4)
            dimmed: Color::Rgb(76, 86, 106),       // #4c566a (nord3)
            error: Color::Rgb(191, 97, 106),       // #bf616a (nord11)
        }
    }

    /// Gruvbox dark theme
    pub fn gruvbox() -> Self {
        Self {
            background: Color::Rgb(40, 40, 40),    // #282828 (bg)
            foreground: Color::Rgb(235, 219, 178), // #ebdbb2 (fg)
            border: Color::Rgb(80, 73, 69),        // #504945 (bg2)
            accent: Color::Rgb(215, 153, 33),      // #d79921 (yellow)
            title: Color::Rgb(168, 153, 132),      // #a89984 (gray)
            dimmed: Color::Rgb(146, 131, 116),     // #928374 (gray)
            error: Color::Rgb(204, 36, 29),        // #cc241d (red)
        }
    }

    /// Load theme from preset name
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "darkwall" | "default" => Some(Self::darkwall()),
            "catppuccin-mocha" | "catppuccin_mocha" | "catppuccin" => Some(Self::catppuccin_mocha()),
            "nord" => Some(Self::nord()),
            "gruvbox" | "gruvbox-dark" | "gruvbox_dark" => Some(Self::gruvbox()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(Theme::from_preset("darkwall").is_some());
        assert!(Theme::from_preset("Catppuccin-Mocha").is_some());
        assert!(Theme::from_preset("nord").is_some());
        assert!(Theme::from_preset("gruvbox").is_some());
        assert!(Theme::from_preset("nonexistent").is_none());
    }

    #[test]
    fn test_default_is_darkwall() {
        assert_eq!(Theme::default(), Theme::darkwall());
    }
}
