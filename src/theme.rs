//! Styling roles for widget output.
//!
//! A [`Theme`] maps each semantic role of a status line to a lipgloss
//! [`Style`]. Widgets receive a theme at construction time; there is no
//! process-wide theme to mutate.
//!
//! # Basic Usage
//!
//! ```rust
//! use pulse_widgets::theme::{Role, Theme, ThemeConfig};
//!
//! let theme = Theme::default();
//! let tag = theme.paint(Role::Tag, "[import]");
//! assert!(tag.contains("[import]"));
//!
//! // Override single roles from configuration data
//! let config = ThemeConfig {
//!     progress_color: Some("#00ff00".to_string()),
//!     ..ThemeConfig::default()
//! };
//! let themed = Theme::from(config);
//! ```
//!
//! Colours in [`ThemeConfig`] are hex codes or names understood by lipgloss.
//! The field names deserialize from `tagColor`, `progressColor`,
//! `completeColor`, `timeColor` and `userColor`.

use lipgloss_extras::prelude::*;
use serde::Deserialize;

const TAG_COLOR: &str = "#FF5F5F";
const PROGRESS_COLOR: &str = "#5F87FF";
const COMPLETE_COLOR: &str = "#5FD75F";
const TIME_COLOR: &str = "#FFD75F";
const USER_COLOR: &str = "#5FD7D7";

/// Semantic role of a fragment in a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The widget label.
    Tag,
    /// Filled bar cells and animation frames.
    Progress,
    /// Markers shown once a widget completes.
    Complete,
    /// Elapsed-time figures.
    Time,
    /// Caller supplied trailing text.
    User,
}

/// Styles applied to each [`Role`].
#[derive(Debug, Clone)]
pub struct Theme {
    /// Style for [`Role::Tag`].
    pub tag: Style,
    /// Style for [`Role::Progress`].
    pub progress: Style,
    /// Style for [`Role::Complete`].
    pub complete: Style,
    /// Style for [`Role::Time`].
    pub time: Style,
    /// Style for [`Role::User`].
    pub user: Style,
}

impl Theme {
    /// A theme that leaves every fragment untouched.
    pub fn plain() -> Self {
        Self {
            tag: Style::new(),
            progress: Style::new(),
            complete: Style::new(),
            time: Style::new(),
            user: Style::new(),
        }
    }

    /// Returns the style for `role`.
    pub fn style(&self, role: Role) -> &Style {
        match role {
            Role::Tag => &self.tag,
            Role::Progress => &self.progress,
            Role::Complete => &self.complete,
            Role::Time => &self.time,
            Role::User => &self.user,
        }
    }

    /// Renders `text` with the style for `role`.
    ///
    /// Empty fragments are returned as-is so that no stray escape codes end
    /// up on the line.
    pub fn paint(&self, role: Role, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        self.style(role).render(text)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            tag: Style::new().foreground(Color::from(TAG_COLOR)),
            progress: Style::new().foreground(Color::from(PROGRESS_COLOR)),
            complete: Style::new()
                .foreground(Color::from(COMPLETE_COLOR))
                .bold(true),
            time: Style::new().foreground(Color::from(TIME_COLOR)),
            user: Style::new().foreground(Color::from(USER_COLOR)),
        }
    }
}

/// Colour overrides, typically loaded from a config file.
///
/// Unset fields keep the colour of [`Theme::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeConfig {
    /// Colour of the widget label.
    pub tag_color: Option<String>,
    /// Colour of bar fill and frames.
    pub progress_color: Option<String>,
    /// Colour of completion markers.
    pub complete_color: Option<String>,
    /// Colour of elapsed-time figures.
    pub time_color: Option<String>,
    /// Colour of caller supplied text.
    pub user_color: Option<String>,
}

impl From<ThemeConfig> for Theme {
    fn from(config: ThemeConfig) -> Self {
        let mut theme = Theme::default();
        if let Some(color) = config.tag_color {
            theme.tag = Style::new().foreground(Color::from(color.as_str()));
        }
        if let Some(color) = config.progress_color {
            theme.progress = Style::new().foreground(Color::from(color.as_str()));
        }
        if let Some(color) = config.complete_color {
            theme.complete = Style::new()
                .foreground(Color::from(color.as_str()))
                .bold(true);
        }
        if let Some(color) = config.time_color {
            theme.time = Style::new().foreground(Color::from(color.as_str()));
        }
        if let Some(color) = config.user_color {
            theme.user = Style::new().foreground(Color::from(color.as_str()));
        }
        theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lipgloss_extras::lipgloss;

    #[test]
    fn test_plain_theme_is_identity() {
        let theme = Theme::plain();
        assert_eq!(theme.paint(Role::Tag, "[t]"), "[t]");
        assert_eq!(theme.paint(Role::Progress, "===="), "====");
    }

    #[test]
    fn test_default_theme_keeps_visible_text() {
        let theme = Theme::default();
        for role in [
            Role::Tag,
            Role::Progress,
            Role::Complete,
            Role::Time,
            Role::User,
        ] {
            let painted = theme.paint(role, "abc");
            assert_eq!(lipgloss::strip_ansi(&painted), "abc");
        }
    }

    #[test]
    fn test_empty_fragment_is_not_styled() {
        let theme = Theme::default();
        assert_eq!(theme.paint(Role::User, ""), "");
    }

    #[test]
    fn test_config_deserializes_camel_case() {
        let config: ThemeConfig = serde_json::from_str(
            r##"{ "tagColor": "#ff0000", "userColor": "#00ffff" }"##,
        )
        .unwrap();
        assert_eq!(config.tag_color.as_deref(), Some("#ff0000"));
        assert_eq!(config.user_color.as_deref(), Some("#00ffff"));
        assert_eq!(config.progress_color, None);
    }

    #[test]
    fn test_config_into_theme_keeps_text() {
        let config: ThemeConfig = serde_json::from_str(r##"{ "timeColor": "#123456" }"##).unwrap();
        let theme = Theme::from(config);
        assert_eq!(lipgloss::strip_ansi(&theme.paint(Role::Time, "1.0s")), "1.0s");
    }
}
