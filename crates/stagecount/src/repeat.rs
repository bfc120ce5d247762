use stagecount_core::config::HoldConfig;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RepeatState {
    Idle,
    /// Held, waiting out the arm delay.
    Arming { fire_at: Instant },
    /// Held past the delay, firing at the repeat interval.
    Repeating { next: Instant },
}

/// Turns a held count trigger into a timed repeating decrement while hold
/// mode is active. Deadline-based rather than spawned-timer-based: ending
/// a hold is a plain state reset, so a cancelled hold can never leak a
/// stale callback that decrements after release.
#[derive(Debug)]
pub struct RepeatController {
    arm_delay: Duration,
    repeat_interval: Duration,
    state: RepeatState,
}

impl RepeatController {
    pub fn new(arm_delay: Duration, repeat_interval: Duration) -> Self {
        Self {
            arm_delay,
            repeat_interval,
            state: RepeatState::Idle,
        }
    }

    pub fn from_config(config: &HoldConfig) -> Self {
        Self::new(
            Duration::from_millis(config.arm_delay_ms),
            Duration::from_millis(config.repeat_interval_ms),
        )
    }

    /// Arm the repeat cycle for a fresh hold. The caller has already issued
    /// the immediate down-edge decrement. No-op while a hold is active.
    pub fn begin_hold(&mut self, now: Instant) {
        if matches!(self.state, RepeatState::Idle) {
            self.state = RepeatState::Arming {
                fire_at: now + self.arm_delay,
            };
        }
    }

    /// Cancel the pending arm delay and any active repeat. Nothing fires
    /// after this returns.
    pub fn end_hold(&mut self) {
        self.state = RepeatState::Idle;
    }

    pub fn is_holding(&self) -> bool {
        !matches!(self.state, RepeatState::Idle)
    }

    /// When `check_timer` next needs to run, or `None` while idle.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            RepeatState::Idle => None,
            RepeatState::Arming { fire_at } => Some(fire_at),
            RepeatState::Repeating { next } => Some(next),
        }
    }

    /// True when a repeat decrement is due; fires at most once per call and
    /// schedules the next one relative to `now`.
    pub fn check_timer(&mut self, now: Instant) -> bool {
        match self.state {
            RepeatState::Arming { fire_at } if now >= fire_at => {
                self.state = RepeatState::Repeating {
                    next: now + self.repeat_interval,
                };
                true
            }
            RepeatState::Repeating { next } if now >= next => {
                self.state = RepeatState::Repeating {
                    next: now + self.repeat_interval,
                };
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> RepeatController {
        RepeatController::from_config(&HoldConfig::default())
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    // --- arming ---

    #[test]
    fn idle_has_no_deadline() {
        let rc = controller();
        assert!(rc.next_deadline().is_none());
        assert!(!rc.is_holding());
    }

    #[test]
    fn begin_hold_schedules_the_arm_delay() {
        let mut rc = controller();
        let t0 = Instant::now();
        rc.begin_hold(t0);
        assert!(rc.is_holding());
        assert_eq!(rc.next_deadline(), Some(t0 + ms(500)));
    }

    #[test]
    fn begin_hold_while_armed_is_a_noop() {
        let mut rc = controller();
        let t0 = Instant::now();
        rc.begin_hold(t0);
        rc.begin_hold(t0 + ms(200));
        assert_eq!(rc.next_deadline(), Some(t0 + ms(500)), "first deadline kept");
    }

    #[test]
    fn nothing_fires_before_the_arm_delay() {
        let mut rc = controller();
        let t0 = Instant::now();
        rc.begin_hold(t0);
        assert!(!rc.check_timer(t0 + ms(499)));
    }

    // --- repeating ---

    #[test]
    fn fires_once_at_the_arm_deadline_then_at_the_interval() {
        let mut rc = controller();
        let t0 = Instant::now();
        rc.begin_hold(t0);

        assert!(rc.check_timer(t0 + ms(500)), "first repeat at the arm deadline");
        assert_eq!(rc.next_deadline(), Some(t0 + ms(600)));

        assert!(!rc.check_timer(t0 + ms(550)));
        assert!(rc.check_timer(t0 + ms(600)));
        assert!(rc.check_timer(t0 + ms(700)));
    }

    #[test]
    fn held_past_600ms_yields_at_least_two_fires() {
        let mut rc = controller();
        let t0 = Instant::now();
        rc.begin_hold(t0);
        let mut fired = 0;
        for i in 0..7 {
            if rc.check_timer(t0 + ms(i * 100)) {
                fired += 1;
            }
        }
        assert!(fired >= 2, "arm fire plus at least one repeat, got {fired}");
    }

    // --- cancellation ---

    #[test]
    fn end_hold_during_arm_delay_cancels_everything() {
        let mut rc = controller();
        let t0 = Instant::now();
        rc.begin_hold(t0);
        rc.end_hold();
        assert!(!rc.is_holding());
        assert!(rc.next_deadline().is_none());
        assert!(!rc.check_timer(t0 + ms(10_000)), "no fire after end_hold, ever");
    }

    #[test]
    fn end_hold_while_repeating_stops_permanently() {
        let mut rc = controller();
        let t0 = Instant::now();
        rc.begin_hold(t0);
        assert!(rc.check_timer(t0 + ms(500)));
        rc.end_hold();
        assert!(!rc.check_timer(t0 + ms(600)));
        assert!(!rc.check_timer(t0 + ms(60_000)));
    }

    #[test]
    fn a_new_hold_after_cancel_rearms_from_scratch() {
        let mut rc = controller();
        let t0 = Instant::now();
        rc.begin_hold(t0);
        rc.end_hold();
        let t1 = t0 + ms(1000);
        rc.begin_hold(t1);
        assert_eq!(rc.next_deadline(), Some(t1 + ms(500)));
        assert!(!rc.check_timer(t1 + ms(499)));
        assert!(rc.check_timer(t1 + ms(500)));
    }
}
