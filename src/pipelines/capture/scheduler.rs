// SPDX-License-Identifier: GPL-3.0-only

//! Refresh throttling
//!
//! A full-frame refresh decodes and samples every pixel, which is far more
//! work than the host loop can afford each display frame. The scheduler
//! lets one tick in every `period` through.

use std::num::NonZeroU32;

/// Counter that triggers a refresh once every `period` ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureScheduler {
    frame: u32,
    period: NonZeroU32,
}

impl CaptureScheduler {
    pub fn new(period: NonZeroU32) -> Self {
        Self { frame: 0, period }
    }

    /// Advance one tick; `true` when this tick should refresh
    pub fn tick(&mut self) -> bool {
        self.frame = (self.frame + 1) % self.period.get();
        self.frame == 0
    }

    pub fn period(&self) -> NonZeroU32 {
        self.period
    }

    /// Ticks left until the next refresh
    pub fn ticks_until_refresh(&self) -> u32 {
        self.period.get() - self.frame
    }
}

impl Default for CaptureScheduler {
    fn default() -> Self {
        let period = NonZeroU32::new(crate::constants::timing::DEFAULT_REFRESH_PERIOD)
            .unwrap_or(NonZeroU32::MIN);
        Self::new(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(period: u32) -> CaptureScheduler {
        CaptureScheduler::new(NonZeroU32::new(period).unwrap())
    }

    #[test]
    fn test_one_refresh_per_period() {
        for period in [1, 2, 3, 7, 30] {
            let mut s = scheduler(period);
            let fired: Vec<u32> = (1..=period * 4).filter(|_| s.tick()).collect();
            assert_eq!(fired.len(), 4, "period {}", period);
        }
    }

    #[test]
    fn test_refresh_lands_on_period_multiples() {
        let mut s = scheduler(30);
        for tick in 1..=90u32 {
            assert_eq!(s.tick(), tick % 30 == 0, "tick {}", tick);
        }
    }

    #[test]
    fn test_period_one_refreshes_every_tick() {
        let mut s = scheduler(1);
        assert!((0..10).all(|_| s.tick()));
    }

    #[test]
    fn test_ticks_until_refresh() {
        let mut s = scheduler(3);
        assert_eq!(s.ticks_until_refresh(), 3);
        s.tick();
        assert_eq!(s.ticks_until_refresh(), 2);
        s.tick();
        s.tick();
        assert_eq!(s.ticks_until_refresh(), 3);
    }

    #[test]
    fn test_default_period() {
        assert_eq!(CaptureScheduler::default().period().get(), 30);
    }
}
