// User preferences
// Stored as config.json under the app configuration root.

use serde::{Deserialize, Serialize};

use crate::document::{Document, StorageRoot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the OS appearance (default)
    #[default]
    System,
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    // Timer lengths, minutes
    pub pomodoro_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,

    /// Pomodoros between long breaks
    pub long_break_interval: u32,

    pub auto_start_breaks: bool,
    pub auto_start_pomodoros: bool,

    // Alerts
    pub sound_enabled: bool,
    pub notifications_enabled: bool,

    pub theme: Theme,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            pomodoro_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            long_break_interval: 4,
            auto_start_breaks: false,
            auto_start_pomodoros: false,
            sound_enabled: true,
            notifications_enabled: true,
            theme: Theme::System,
        }
    }
}

impl Document for UserConfig {
    const FILE_NAME: &'static str = "config.json";
    const ROOT: StorageRoot = StorageRoot::AppConfig;

    fn normalize(&mut self) {
        // zero-length timers would spin the state machine
        let defaults = Self::default();
        if self.pomodoro_minutes == 0 {
            self.pomodoro_minutes = defaults.pomodoro_minutes;
        }
        if self.short_break_minutes == 0 {
            self.short_break_minutes = defaults.short_break_minutes;
        }
        if self.long_break_minutes == 0 {
            self.long_break_minutes = defaults.long_break_minutes;
        }
        if self.long_break_interval == 0 {
            self.long_break_interval = defaults.long_break_interval;
        }
    }
}
