// THEORY:
// `RunStatistics` is the robot's memory of its journey. It is owned by the
// `NavigationLoop`, mutated once per iteration and never cleared: a report always
// covers everything since the process started, across any number of stop/resume
// cycles. The only thing a fresh start signal touches is the start instant and the
// threshold marker, so the baseline light level is re-captured from the next frame.
//
// `RunReport` is an immutable snapshot. Rendering it produces the execution-log
// text in its fixed field order.

use crate::core_modules::heading::DirectionalReading;
use crate::core_modules::movement::Movement;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    started_at: Option<Instant>,
    threshold_intensity: Option<u32>,
    brightest_intensity: u32,
    light_detections: u32,
    peak_intensities: Vec<u32>,
    movements: Vec<String>,
    obstacles_detected: u32,
    distance_travelled_cm: f64,
    image_locations: Vec<PathBuf>,
}

/// Snapshot of the run statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Baseline light level of the current run; 0 until the first frame.
    pub threshold_intensity: u32,
    pub brightest_intensity: u32,
    pub light_detections: u32,
    pub elapsed_secs: u64,
    pub distance_travelled_cm: f64,
    pub movements: Vec<String>,
    pub obstacles_detected: u32,
    pub peak_intensities: Vec<u32>,
    pub image_locations: Vec<PathBuf>,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh start signal: restart the clock and forget the baseline.
    pub fn begin_run(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.threshold_intensity = None;
    }

    /// Starts the clock only if no run has started yet.
    pub fn ensure_started(&mut self, now: Instant) {
        self.started_at.get_or_insert(now);
    }

    /// Records one analyzed frame: baseline, brightest, detection count and peak.
    pub fn observe_light(&mut self, reading: &DirectionalReading) {
        self.threshold_intensity.get_or_insert_with(|| reading.mean());
        let peak = reading.peak();
        self.brightest_intensity = self.brightest_intensity.max(peak);
        self.light_detections += 1;
        self.peak_intensities.push(peak);
    }

    /// Records the move issued for this iteration.
    pub fn record(&mut self, movement: &Movement, obstacle_hit: bool) {
        self.movements.push(movement.description());
        self.distance_travelled_cm += movement.distance_cm as f64;
        if obstacle_hit {
            self.obstacles_detected += 1;
        }
    }

    pub fn record_image(&mut self, path: PathBuf) {
        self.image_locations.push(path);
    }

    pub fn threshold_intensity(&self) -> Option<u32> {
        self.threshold_intensity
    }

    pub fn obstacles_detected(&self) -> u32 {
        self.obstacles_detected
    }

    pub fn distance_travelled_cm(&self) -> f64 {
        self.distance_travelled_cm
    }

    pub fn movements(&self) -> &[String] {
        &self.movements
    }

    pub fn report(&self) -> RunReport {
        self.report_at(Instant::now())
    }

    pub fn report_at(&self, now: Instant) -> RunReport {
        let elapsed_secs = self
            .started_at
            .map(|start| now.saturating_duration_since(start).as_secs())
            .unwrap_or_default();
        RunReport {
            threshold_intensity: self.threshold_intensity.unwrap_or_default(),
            brightest_intensity: self.brightest_intensity,
            light_detections: self.light_detections,
            elapsed_secs,
            distance_travelled_cm: self.distance_travelled_cm,
            movements: self.movements.clone(),
            obstacles_detected: self.obstacles_detected,
            peak_intensities: self.peak_intensities.clone(),
            image_locations: self.image_locations.clone(),
        }
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "***** Execution Log *****")?;
        writeln!(f, "Threshold Light Intensity: {}", self.threshold_intensity)?;
        writeln!(f, "Brightest Light Intensity Detected: {}", self.brightest_intensity)?;
        writeln!(f, "Number of Light Detections: {}", self.light_detections)?;
        writeln!(f, "Total Execution Time: {} seconds", self.elapsed_secs)?;
        writeln!(f, "Total Distance Travelled: {:.1} cm", self.distance_travelled_cm)?;
        writeln!(f, "Movements Taken: [{}]", self.movements.join(", "))?;
        writeln!(f, "Objects Detected: {}", self.obstacles_detected)?;
        writeln!(f, "***************************")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::heading::Heading;
    use std::time::Duration;

    #[test]
    fn threshold_is_captured_once_per_run() {
        let mut stats = RunStatistics::new();
        stats.begin_run(Instant::now());
        stats.observe_light(&DirectionalReading::new(100, 80, 90));
        stats.observe_light(&DirectionalReading::new(10, 10, 10));
        assert_eq!(stats.threshold_intensity(), Some(90));

        stats.begin_run(Instant::now());
        assert_eq!(stats.threshold_intensity(), None);
        stats.observe_light(&DirectionalReading::new(30, 30, 30));
        assert_eq!(stats.threshold_intensity(), Some(30));
    }

    #[test]
    fn brightest_never_decreases() {
        let mut stats = RunStatistics::new();
        stats.observe_light(&DirectionalReading::new(10, 200, 5));
        stats.observe_light(&DirectionalReading::new(10, 20, 5));
        let report = stats.report();
        assert_eq!(report.brightest_intensity, 200);
        assert_eq!(report.peak_intensities, vec![200, 20]);
        assert_eq!(report.light_detections, 2);
    }

    #[test]
    fn record_accumulates_distance_and_obstacles() {
        let mut stats = RunStatistics::new();
        stats.record(&Movement::for_heading(Heading::Left), false);
        stats.record(&Movement::for_heading(Heading::Center), true);
        stats.record(&Movement::for_heading(Heading::Right), false);
        assert_eq!(stats.distance_travelled_cm(), 60.0);
        assert_eq!(stats.obstacles_detected(), 1);
        assert_eq!(stats.movements(), ["Left 15 cm", "Straight 30 cm", "Right 15 cm"]);
    }

    #[test]
    fn elapsed_counts_whole_seconds_since_start() {
        let start = Instant::now();
        let mut stats = RunStatistics::new();
        assert_eq!(stats.report_at(start).elapsed_secs, 0);
        stats.begin_run(start);
        stats.ensure_started(start + Duration::from_secs(100));
        assert_eq!(stats.report_at(start + Duration::from_millis(12_900)).elapsed_secs, 12);
    }

    #[test]
    fn reporting_is_idempotent() {
        let now = Instant::now();
        let mut stats = RunStatistics::new();
        stats.begin_run(now);
        stats.observe_light(&DirectionalReading::new(1, 2, 3));
        stats.record(&Movement::for_heading(Heading::Right), false);
        assert_eq!(stats.report_at(now), stats.report_at(now));
    }

    #[test]
    fn renders_execution_log_in_field_order() {
        let report = RunReport {
            threshold_intensity: 90,
            brightest_intensity: 100,
            light_detections: 2,
            elapsed_secs: 7,
            distance_travelled_cm: 45.0,
            movements: vec!["Left 15 cm".into(), "Straight 30 cm".into()],
            obstacles_detected: 1,
            peak_intensities: vec![100, 95],
            image_locations: Vec::new(),
        };
        let expected = "\n***** Execution Log *****\n\
                        Threshold Light Intensity: 90\n\
                        Brightest Light Intensity Detected: 100\n\
                        Number of Light Detections: 2\n\
                        Total Execution Time: 7 seconds\n\
                        Total Distance Travelled: 45.0 cm\n\
                        Movements Taken: [Left 15 cm, Straight 30 cm]\n\
                        Objects Detected: 1\n\
                        ***************************\n";
        assert_eq!(report.to_string(), expected);
    }
}
