//! Learner settings and lesson timing.

use serde::{Deserialize, Serialize};

/// Storage key for [`Settings`] in `localStorage`.
pub const SETTINGS_KEY: &str = "mtc_settings";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub muted: bool,
    pub captions: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { muted: false, captions: true }
    }
}

impl Settings {
    /// Parses a stored settings blob, falling back to defaults when it is
    /// missing or unreadable.
    pub fn from_stored(raw: Option<&str>) -> Settings {
        match raw.map(serde_json::from_str::<Settings>) {
            Some(Ok(s)) => s,
            Some(Err(e)) => {
                log::warn!("ignoring unreadable settings: {e}");
                Settings::default()
            }
            None => Settings::default(),
        }
    }

    pub fn to_stored(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Delays used by the lesson flow, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Incorrect answer until the same check accepts input again.
    pub rearm_ms: u32,
    /// Correct part of a multi-part group until the next part is armed.
    pub next_check_ms: u32,
    /// Correct practice answer until forward navigation unlocks.
    pub unlock_ms: u32,
    /// Recorded assessment answer until the next question loads.
    pub auto_advance_ms: u32,
    pub blink_ms: u32,
    /// Time each numeral stays lit during a sweep.
    pub sweep_ms: u32,
    /// Correct-answer colouring stays this long before fading.
    pub feedback_clear_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            rearm_ms: 1500,
            next_check_ms: 1500,
            unlock_ms: 0,
            auto_advance_ms: 1000,
            blink_ms: 500,
            sweep_ms: 500,
            feedback_clear_ms: 2000,
        }
    }
}
