use chrono::TimeDelta;

/// Timing knobs of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Minimum time between two accepted saves.
    pub save_cooldown: TimeDelta,
    /// How long saved rows show the success state.
    pub success_flash: TimeDelta,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            save_cooldown: TimeDelta::milliseconds(3000),
            success_flash: TimeDelta::milliseconds(2000),
        }
    }
}

impl RuntimeOptions {
    pub fn with_save_cooldown_ms(mut self, millis: i64) -> Self {
        self.save_cooldown = TimeDelta::milliseconds(millis);
        self
    }

    pub fn with_success_flash_ms(mut self, millis: i64) -> Self {
        self.success_flash = TimeDelta::milliseconds(millis);
        self
    }
}
