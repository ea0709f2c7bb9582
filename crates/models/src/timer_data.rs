use serde::{Deserialize, Serialize};

use crate::document::{Document, StorageRoot};

/// Phase the timer is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PomodoroState {
    #[default]
    Pomodoro,
    ShortBreak,
    LongBreak,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    /// Pomodoros spent on this task so far
    #[serde(default)]
    pub pomodoros: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<u32>,
}

/// Runtime state of the timer, persisted as data.json under the app data root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerData {
    pub active_task: Option<Task>,
    pub tasks: Vec<Task>,
    /// 1-based index of the current pomodoro in the long-break cycle
    pub reps: u32,
    pub pomodoro_state: PomodoroState,
    /// Epoch milliseconds of the last tick, if the timer has run
    pub last_time: Option<i64>,
    pub elapsed_since_state_change: f64,
}

impl Default for TimerData {
    fn default() -> Self {
        Self {
            active_task: None,
            tasks: Vec::new(),
            reps: 1,
            pomodoro_state: PomodoroState::Pomodoro,
            last_time: None,
            elapsed_since_state_change: 0.0,
        }
    }
}

impl Document for TimerData {
    const FILE_NAME: &'static str = "data.json";
    const ROOT: StorageRoot = StorageRoot::AppData;

    fn normalize(&mut self) {
        if self.reps == 0 {
            self.reps = 1;
        }
    }
}
