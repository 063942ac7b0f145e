//! Rest timer between sets

use tracing::info;

/// Target-muscle keywords that get the longer rest
const LARGE_MUSCLE_KEYWORDS: &[&str] = &["chest", "pec", "lat", "back", "quad", "leg", "chain"];

pub const LARGE_MUSCLE_REST_SECS: u32 = 180;
pub const DEFAULT_REST_SECS: u32 = 120;

/// Suggested rest in seconds for an exercise's target muscle
pub fn suggested_rest(target_muscle: Option<&str>) -> u32 {
    let target = target_muscle.unwrap_or("").to_lowercase();
    if LARGE_MUSCLE_KEYWORDS.iter().any(|k| target.contains(k)) {
        LARGE_MUSCLE_REST_SECS
    } else {
        DEFAULT_REST_SECS
    }
}

/// Format seconds as m:ss
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Idle,
    Running(u32),
    /// Reported once, on the tick that reaches zero
    Expired,
}

/// Manually started countdown. Starting while running stops it instead.
#[derive(Debug, Clone, Default)]
pub struct RestTimer {
    remaining: u32,
    active: bool,
}

impl RestTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Start from `suggested` seconds, or cancel the running countdown
    pub fn toggle(&mut self, suggested: u32) {
        if self.active {
            self.active = false;
            return;
        }
        self.remaining = suggested;
        self.active = suggested > 0;
    }

    /// Advance by one second
    pub fn tick(&mut self) -> TimerEvent {
        if !self.active {
            return TimerEvent::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.active = false;
            info!("rest timer expired");
            return TimerEvent::Expired;
        }
        TimerEvent::Running(self.remaining)
    }
}
