/// Colour theme of the gradient layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Maps a theme value to a theme. Only exactly `"dark"` selects the dark
    /// palette; every other value renders the light one.
    pub fn from_value(value: &str) -> Self {
        if value == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl From<winit::window::Theme> for Theme {
    fn from(value: winit::window::Theme) -> Self {
        match value {
            winit::window::Theme::Dark => Theme::Dark,
            winit::window::Theme::Light => Theme::Light,
        }
    }
}

/// Synchronous, non-blocking access to the current theme.
pub trait ThemeSource {
    fn current(&self) -> Theme;
}

/// Where the theme comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    /// Always draw the given theme.
    Fixed(Theme),
    /// Follow the theme the windowing system reports.
    #[default]
    System,
}

/// Theme source backed by a preference plus the last theme the host reported.
#[derive(Debug, Clone, Copy)]
pub struct HostTheme {
    preference: ThemePreference,
    reported: Option<Theme>,
}

impl HostTheme {
    pub fn new(preference: ThemePreference, reported: Option<Theme>) -> Self {
        Self {
            preference,
            reported,
        }
    }

    /// Records a theme change from the windowing system. Returns true when the
    /// visible theme changed.
    pub fn report(&mut self, theme: Theme) -> bool {
        let before = self.current();
        self.reported = Some(theme);
        before != self.current()
    }
}

impl ThemeSource for HostTheme {
    fn current(&self) -> Theme {
        match self.preference {
            ThemePreference::Fixed(theme) => theme,
            ThemePreference::System => self.reported.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_dark_selects_dark() {
        assert_eq!(Theme::from_value("dark"), Theme::Dark);
        assert_eq!(Theme::from_value(" Dark "), Theme::Light);
        assert_eq!(Theme::from_value("DARK"), Theme::Light);
        assert_eq!(Theme::from_value("light"), Theme::Light);
        assert_eq!(Theme::from_value("system"), Theme::Light);
        assert_eq!(Theme::from_value(""), Theme::Light);
    }

    #[test]
    fn fixed_preference_ignores_host_reports() {
        let mut source = HostTheme::new(ThemePreference::Fixed(Theme::Dark), None);
        assert!(!source.report(Theme::Light));
        assert_eq!(source.current(), Theme::Dark);
    }

    #[test]
    fn system_preference_follows_host() {
        let mut source = HostTheme::new(ThemePreference::System, None);
        assert_eq!(source.current(), Theme::Light);
        assert!(source.report(Theme::Dark));
        assert_eq!(source.current(), Theme::Dark);
        assert!(!source.report(Theme::Dark));
    }
}
