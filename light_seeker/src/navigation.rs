// THEORY:
// The `navigation` module is the top-level decision loop of the robot. It
// encapsulates the full sense -> analyze -> decide -> (detour) -> act -> log cycle
// behind a single `step` call and a `run` loop that repeats it while the shared
// running flag is set.
//
// Each step runs strictly in order on the caller's thread:
//   1. capture a frame (fatal on failure)
//   2. persist it (best effort)
//   3. analyze it into a `DirectionalReading`
//   4-6. update the light statistics
//   7. consult the `ObstacleGuard` and choose the primary or alternative heading
//   8. light the "moving" color, pulse the wheels and record the move
//
// A stop request only clears the running flag. The step that is already in flight
// still posts its move; the loop halts before the next capture. The explicit
// zero-velocity safety stop is a separate operation (`safety_stop`) issued by the
// `Controller` when it handles the stop event.

use crate::config::SeekerConfig;
use crate::controller::RunFlag;
use crate::core_modules::direction_selector::DirectionSelector;
use crate::core_modules::frame_analyzer::FrameAnalyzer;
use crate::core_modules::heading::{DirectionalReading, Heading};
use crate::core_modules::movement::Movement;
use crate::core_modules::obstacle_guard::{GuardOutcome, ObstacleGuard};
use crate::core_modules::run_statistics::{RunReport, RunStatistics};
use crate::error::Result;
use crate::hardware::Devices;
use std::time::Instant;
use tracing::{error, info};

/// What happened during one loop iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Iteration {
    pub reading: DirectionalReading,
    pub primary: Heading,
    pub heading: Heading,
    pub obstacle: GuardOutcome,
    pub movement: Movement,
}

pub struct NavigationLoop {
    config: SeekerConfig,
    devices: Devices,
    analyzer: FrameAnalyzer,
    selector: DirectionSelector,
    guard: ObstacleGuard,
    stats: RunStatistics,
    running: RunFlag,
}

impl NavigationLoop {
    pub fn new(config: SeekerConfig, devices: Devices) -> Self {
        let selector = DirectionSelector::from_seed(config.tie_break_seed);
        Self::with_selector(config, devices, selector)
    }

    pub fn with_selector(config: SeekerConfig, devices: Devices, selector: DirectionSelector) -> Self {
        let guard = ObstacleGuard::from_config(&config);
        Self {
            config,
            devices,
            analyzer: FrameAnalyzer::new(),
            selector,
            guard,
            stats: RunStatistics::new(),
            running: RunFlag::new(),
        }
    }

    /// Shares an existing flag instead of the loop's own.
    pub fn with_run_flag(mut self, running: RunFlag) -> Self {
        self.running = running;
        self
    }

    pub fn config(&self) -> &SeekerConfig {
        &self.config
    }

    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    /// The flag `run` polls between iterations.
    pub fn run_flag(&self) -> &RunFlag {
        &self.running
    }

    /// A fresh start: restart the clock, forget the baseline, raise the flag.
    pub fn begin_run(&mut self) {
        self.stats.begin_run(Instant::now());
        self.running.set(true);
    }

    /// Resume after a pause. The baseline from the first start is kept.
    pub fn resume(&mut self) {
        self.stats.ensure_started(Instant::now());
        self.running.set(true);
    }

    /// Runs iterations until the running flag is cleared. Returns how many ran.
    pub fn run(&mut self) -> Result<usize> {
        let mut iterations = 0;
        while self.running.is_running() {
            self.step()?;
            iterations += 1;
        }
        Ok(iterations)
    }

    /// One full sense -> decide -> act cycle.
    pub fn step(&mut self) -> Result<Iteration> {
        let frame = self
            .devices
            .camera
            .capture_frame(self.config.resolution)
            .inspect_err(|e| error!("could not capture image: {e}"))?;

        if self.config.save_frames {
            match self.devices.image_sink.save_frame(&frame) {
                Ok(path) => {
                    info!(path = %path.display(), "image saved");
                    self.stats.record_image(path);
                }
                Err(e) => error!("error saving image: {e}"),
            }
        }

        let reading = self.analyzer.analyze(&frame)?;
        self.stats.observe_light(&reading);
        info!("light intensity levels: {reading}");

        let primary = DirectionSelector::select_primary(&reading);
        let running = &self.running;
        let obstacle = self.guard.check(
            self.devices.ranging.as_mut(),
            self.devices.indicator.as_mut(),
            self.devices.delay.as_mut(),
            || running.is_running(),
        );
        let heading = if obstacle.must_divert() {
            self.selector.select_alternative(&reading, primary)
        } else {
            primary
        };

        let movement = Movement::for_heading(heading);
        self.devices.indicator.set_color(self.config.moving_color);
        info!("moving {heading}");
        self.devices
            .motor
            .drive(movement.left_speed, movement.right_speed, movement.duration_ms);
        self.stats.record(&movement, obstacle.detected());

        Ok(Iteration {
            reading,
            primary,
            heading,
            obstacle,
            movement,
        })
    }

    /// Explicit zero-velocity command, distinct from the per-iteration moves.
    pub fn safety_stop(&mut self) {
        info!("stopping wheels");
        self.devices
            .motor
            .drive(0, 0, self.config.safety_stop_duration_ms);
    }

    pub fn report(&self) -> RunReport {
        self.stats.report()
    }

    /// Renders the report, logs it and appends it to the report sink.
    /// A sink failure is logged and otherwise ignored.
    pub fn write_report(&mut self) -> RunReport {
        let report = self.stats.report();
        let text = report.to_string();
        info!("{text}");
        match self.devices.report_sink.append_report(&text) {
            Ok(path) => info!(path = %path.display(), "execution log saved"),
            Err(e) => error!("error saving execution log: {e}"),
        }
        report
    }
}
