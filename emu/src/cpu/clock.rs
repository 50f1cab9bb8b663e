use serde::{Deserialize, Serialize};

/// Monotonic cycle accumulator.
///
/// Time is tracked in two correlated units: the base unit (`m`, one per
/// logical machine step, 1,048,576 Hz) and the fine unit (`t`, the raw
/// 4,194,304 Hz oscillator, always 4x the base). The CPU and PPU each own
/// their own `Clock`; they are never shared.
#[derive(Default, Serialize, Deserialize)]
pub struct Clock {
    m: u64,
    t: u64,
}

impl Clock {
    /// Advances the clock by `steps` base units (and `4 * steps` fine
    /// units). A zero step count is a no-op.
    pub fn tick(&mut self, steps: u32) {
        if steps == 0 {
            return;
        }

        self.m += u64::from(steps);
        self.t += u64::from(steps) * 4;
    }

    pub const fn base_value(&self) -> u64 {
        self.m
    }

    pub const fn t_value(&self) -> u64 {
        self.t
    }

    pub fn reset(&mut self) {
        self.m = 0;
        self.t = 0;
    }

    /// Accumulates another clock's elapsed time into this one.
    pub fn add_time(&mut self, other: &Self) {
        self.m += other.m;
        self.t += other.t;
    }
}
