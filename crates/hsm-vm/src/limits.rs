/// Bounds on work done per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KernelLimits {
    /// Transitions one event may trigger before the instance is reset
    /// (default: 100).
    pub(crate) max_rtc_steps: u16,
    /// Events dequeued per tick, deferred ones included (default: 10).
    pub(crate) max_events_per_tick: u8,
}

impl Default for KernelLimits {
    fn default() -> Self {
        Self {
            max_rtc_steps: 100,
            max_events_per_tick: 10,
        }
    }
}

impl KernelLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the run-to-completion step cap. Clamped to at least 1.
    pub fn max_rtc_steps(mut self, steps: u16) -> Self {
        self.max_rtc_steps = steps.max(1);
        self
    }

    /// Set the per-tick event cap. Clamped to at least 1.
    pub fn max_events_per_tick(mut self, events: u8) -> Self {
        self.max_events_per_tick = events.max(1);
        self
    }

    pub fn get_max_rtc_steps(&self) -> u16 {
        self.max_rtc_steps
    }
    pub fn get_max_events_per_tick(&self) -> u8 {
        self.max_events_per_tick
    }
}
