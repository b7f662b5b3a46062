//! Runtime settings.
//!
//! Built from constants; nothing is persisted.

use crate::reactor::ReactorConfig;

/// Settings for the process host.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Match rule and target level applied by the reactor
    pub reactor: ReactorConfig,

    /// Show the status tray icon
    pub show_tray: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reactor: ReactorConfig::default(),
            show_tray: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::VolumeLevel;
    use crate::reactor::DEFAULT_MATCH_FRAGMENT;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.reactor.rule.fragment(), DEFAULT_MATCH_FRAGMENT);
        assert_eq!(settings.reactor.level, VolumeLevel::MAX);
        assert!(settings.show_tray);
    }
}
