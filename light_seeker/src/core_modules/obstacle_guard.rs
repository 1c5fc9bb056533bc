// THEORY:
// The `ObstacleGuard` is a two-state machine (Clear, Blocked) evaluated fresh on
// every loop iteration. It never remembers an obstacle from a previous iteration.
//
// 1.  **Detection**: a ranging reading below the threshold moves it to Blocked. The
//     underlights switch to the warning color and the caller counts exactly one
//     obstacle for this detection.
// 2.  **Bounded wait**: a fixed countdown of one-second steps gives the obstacle a
//     chance to move away. Each step is reported. When interruption is enabled a
//     cleared running flag ends the countdown early.
// 3.  **Recheck**: one more measurement decides the outcome. `Cleared` keeps the
//     primary heading, `StillBlocked` tells the loop to divert for this iteration.
//     There is never a second wait for the same detection.

use crate::config::SeekerConfig;
use crate::hardware::{Delay, Indicator, Ranging, Rgb};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Clear,
    Blocked,
}

/// Result of one guard check. Distances are in centimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuardOutcome {
    /// Nothing within the threshold.
    Clear { distance_cm: f64 },
    /// An obstacle was detected but had moved away after the wait.
    Cleared { detected_cm: f64, rechecked_cm: f64 },
    /// The obstacle was still there after the wait.
    StillBlocked { detected_cm: f64, rechecked_cm: f64 },
}

impl GuardOutcome {
    /// True when this check counted as an obstacle encounter.
    pub fn detected(&self) -> bool {
        !matches!(self, GuardOutcome::Clear { .. })
    }

    /// True when the caller must pick an alternative heading.
    pub fn must_divert(&self) -> bool {
        matches!(self, GuardOutcome::StillBlocked { .. })
    }

    /// State the guard ended in.
    pub fn state(&self) -> GuardState {
        if self.must_divert() {
            GuardState::Blocked
        } else {
            GuardState::Clear
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObstacleGuard {
    threshold_cm: f64,
    wait_steps: u32,
    wait_step: Duration,
    interruptible: bool,
    warning_color: Rgb,
}

impl ObstacleGuard {
    pub fn new(threshold_cm: f64, wait_steps: u32, wait_step: Duration, warning_color: Rgb) -> Self {
        Self {
            threshold_cm,
            wait_steps,
            wait_step,
            interruptible: true,
            warning_color,
        }
    }

    pub fn from_config(config: &SeekerConfig) -> Self {
        Self::new(
            config.obstacle_threshold_cm,
            config.obstacle_wait_steps,
            config.wait_step(),
            config.warning_color,
        )
        .interruptible(config.interruptible_wait)
    }

    pub fn interruptible(mut self, interruptible: bool) -> Self {
        self.interruptible = interruptible;
        self
    }

    pub fn classify(&self, distance_cm: f64) -> GuardState {
        if distance_cm < self.threshold_cm {
            GuardState::Blocked
        } else {
            GuardState::Clear
        }
    }

    /// Measures, and on detection runs the warning, countdown and recheck.
    /// `keep_waiting` is polled after every countdown step.
    pub fn check(
        &self,
        ranging: &mut dyn Ranging,
        indicator: &mut dyn Indicator,
        delay: &mut dyn Delay,
        keep_waiting: impl Fn() -> bool,
    ) -> GuardOutcome {
        let distance_cm = ranging.measure_distance_cm();
        if self.classify(distance_cm) == GuardState::Clear {
            return GuardOutcome::Clear { distance_cm };
        }

        warn!(distance_cm, "obstacle detected");
        indicator.set_color(self.warning_color);

        info!(steps = self.wait_steps, "waiting for obstacle removal");
        for remaining in (1..=self.wait_steps).rev() {
            info!("{remaining} seconds remaining...");
            delay.wait(self.wait_step);
            if self.interruptible && !keep_waiting() {
                info!("stop requested, countdown cut short");
                break;
            }
        }

        let rechecked_cm = ranging.measure_distance_cm();
        match self.classify(rechecked_cm) {
            GuardState::Clear => {
                info!(rechecked_cm, "obstacle removed, resuming light search");
                GuardOutcome::Cleared {
                    detected_cm: distance_cm,
                    rechecked_cm,
                }
            }
            GuardState::Blocked => {
                info!(rechecked_cm, "obstacle still present, choosing an alternative direction");
                GuardOutcome::StillBlocked {
                    detected_cm: distance_cm,
                    rechecked_cm,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::VecDeque;

    struct Readings(VecDeque<f64>);

    impl Ranging for Readings {
        fn measure_distance_cm(&mut self) -> f64 {
            self.0.pop_front().unwrap_or(500.0)
        }
    }

    #[derive(Default)]
    struct Colors(Vec<Rgb>);

    impl Indicator for Colors {
        fn set_color(&mut self, color: Rgb) {
            self.0.push(color);
        }
    }

    #[derive(Default)]
    struct Waits(Vec<Duration>);

    impl Delay for Waits {
        fn wait(&mut self, duration: Duration) {
            self.0.push(duration);
        }
    }

    fn guard() -> ObstacleGuard {
        ObstacleGuard::from_config(&SeekerConfig::default())
    }

    #[test]
    fn far_reading_is_clear_without_side_effects() {
        let mut ranging = Readings(VecDeque::from([120.0]));
        let (mut colors, mut waits) = (Colors::default(), Waits::default());

        let outcome = guard().check(&mut ranging, &mut colors, &mut waits, || true);

        assert_eq!(outcome, GuardOutcome::Clear { distance_cm: 120.0 });
        assert!(!outcome.detected());
        assert!(colors.0.is_empty());
        assert!(waits.0.is_empty());
    }

    #[test]
    fn threshold_is_exclusive() {
        assert_eq!(guard().classify(49.0), GuardState::Blocked);
        assert_eq!(guard().classify(49.99), GuardState::Blocked);
        assert_eq!(guard().classify(50.0), GuardState::Clear);
    }

    #[test]
    fn detection_waits_ten_seconds_then_clears() {
        let mut ranging = Readings(VecDeque::from([49.0, 80.0]));
        let (mut colors, mut waits) = (Colors::default(), Waits::default());

        let outcome = guard().check(&mut ranging, &mut colors, &mut waits, || true);

        assert_eq!(
            outcome,
            GuardOutcome::Cleared {
                detected_cm: 49.0,
                rechecked_cm: 80.0
            }
        );
        assert!(outcome.detected());
        assert!(!outcome.must_divert());
        assert_eq!(colors.0, vec![Rgb(255, 0, 0)]);
        assert_eq!(waits.0, vec![Duration::from_secs(1); 10]);
    }

    #[test]
    fn persistent_obstacle_diverts_after_one_wait() {
        let mut ranging = Readings(VecDeque::from([10.0, 12.0, 5.0]));
        let (mut colors, mut waits) = (Colors::default(), Waits::default());

        let outcome = guard().check(&mut ranging, &mut colors, &mut waits, || true);

        assert!(outcome.must_divert());
        assert_eq!(outcome.state(), GuardState::Blocked);
        assert_eq!(waits.0.len(), 10);
        // exactly two measurements: detection and recheck
        assert_eq!(ranging.0, VecDeque::from([5.0]));
    }

    #[test]
    fn cleared_flag_cuts_countdown_short() {
        let mut ranging = Readings(VecDeque::from([10.0, 10.0]));
        let (mut colors, mut waits) = (Colors::default(), Waits::default());
        let polls = Cell::new(0);

        let outcome = guard().check(&mut ranging, &mut colors, &mut waits, || {
            polls.set(polls.get() + 1);
            polls.get() < 3
        });

        assert!(outcome.must_divert());
        assert_eq!(waits.0.len(), 3);
    }

    #[test]
    fn uninterruptible_countdown_ignores_flag() {
        let mut ranging = Readings(VecDeque::from([10.0, 90.0]));
        let (mut colors, mut waits) = (Colors::default(), Waits::default());

        let outcome = guard()
            .interruptible(false)
            .check(&mut ranging, &mut colors, &mut waits, || false);

        assert!(!outcome.must_divert());
        assert_eq!(waits.0.len(), 10);
    }
}
