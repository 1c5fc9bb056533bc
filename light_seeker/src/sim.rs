// THEORY:
// Scripted stand-ins for every device in `hardware`. They let the whole
// sense -> decide -> act cycle run without a robot: the camera replays a queue of
// frames, the ranging sensor replays a queue of distances, and every actuator
// records what it was asked to do into a shared log that a `SimProbe` can inspect
// after the devices have been moved into a `NavigationLoop`.

use crate::core_modules::band::band::ColumnBand;
use crate::error::{CaptureError, PersistenceError};
use crate::hardware::{
    Camera, Delay, Devices, Frame, ImageSink, Indicator, Motor, Ranging, ReportSink, Resolution, Rgb,
};
use image::{GrayImage, Luma};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Builds a frame whose left, center and right bands are uniformly lit.
pub fn banded_frame(width: u32, height: u32, levels: [u8; 3]) -> Frame {
    let mut frame = GrayImage::new(width, height);
    if width < 3 {
        return frame;
    }
    for (band, level) in ColumnBand::split(width).iter().zip(levels) {
        for x in band.start..band.end {
            for y in 0..height {
                frame.put_pixel(x, y, Luma([level]));
            }
        }
    }
    frame
}

/// A wheel command as the motor received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorCommand {
    pub left_speed: i32,
    pub right_speed: i32,
    pub duration_ms: u64,
}

impl MotorCommand {
    pub fn is_stop(&self) -> bool {
        self.left_speed == 0 && self.right_speed == 0
    }
}

type CaptureHook = Box<dyn FnMut(usize) + Send>;

/// Replays frames in order. Fails once the queue is exhausted unless the last
/// frame is set to repeat.
pub struct ScriptedCamera {
    frames: VecDeque<Frame>,
    repeat_last: bool,
    captures: usize,
    on_capture: Option<CaptureHook>,
}

impl ScriptedCamera {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            repeat_last: false,
            captures: 0,
            on_capture: None,
        }
    }

    pub fn repeat_last(mut self) -> Self {
        self.repeat_last = true;
        self
    }

    /// Runs `hook` with the 1-based capture number before each frame is returned.
    pub fn on_capture(mut self, hook: impl FnMut(usize) + Send + 'static) -> Self {
        self.on_capture = Some(Box::new(hook));
        self
    }
}

impl Camera for ScriptedCamera {
    fn capture_frame(&mut self, _resolution: Resolution) -> Result<Frame, CaptureError> {
        self.captures += 1;
        if let Some(hook) = self.on_capture.as_mut() {
            hook(self.captures);
        }
        if self.repeat_last && self.frames.len() == 1 {
            return self.frames.front().cloned().ok_or(CaptureError::Unavailable);
        }
        self.frames.pop_front().ok_or(CaptureError::Unavailable)
    }
}

/// Replays distances, then keeps answering `fallback_cm`.
pub struct ScriptedRanging {
    readings: VecDeque<f64>,
    fallback_cm: f64,
}

impl ScriptedRanging {
    pub fn new(readings: impl IntoIterator<Item = f64>, fallback_cm: f64) -> Self {
        Self {
            readings: readings.into_iter().collect(),
            fallback_cm,
        }
    }

    /// Always reports a clear path.
    pub fn clear() -> Self {
        Self::new([], 200.0)
    }
}

impl Ranging for ScriptedRanging {
    fn measure_distance_cm(&mut self) -> f64 {
        self.readings.pop_front().unwrap_or(self.fallback_cm)
    }
}

pub struct RecordingMotor(Arc<Mutex<Vec<MotorCommand>>>);

impl Motor for RecordingMotor {
    fn drive(&mut self, left_speed: i32, right_speed: i32, duration_ms: u64) {
        self.0.lock().unwrap().push(MotorCommand {
            left_speed,
            right_speed,
            duration_ms,
        });
    }
}

pub struct RecordingIndicator(Arc<Mutex<Vec<Rgb>>>);

impl Indicator for RecordingIndicator {
    fn set_color(&mut self, color: Rgb) {
        self.0.lock().unwrap().push(color);
    }
}

pub struct RecordingDelay(Arc<Mutex<Vec<Duration>>>);

impl Delay for RecordingDelay {
    fn wait(&mut self, duration: Duration) {
        self.0.lock().unwrap().push(duration);
    }
}

/// Keeps frames in memory; can be told to fail every save.
pub struct MemoryImageSink {
    saved: Arc<Mutex<Vec<Frame>>>,
    fail: bool,
}

impl ImageSink for MemoryImageSink {
    fn save_frame(&mut self, frame: &Frame) -> Result<PathBuf, PersistenceError> {
        if self.fail {
            return Err(PersistenceError::Rejected("image sink offline".to_string()));
        }
        let mut saved = self.saved.lock().unwrap();
        saved.push(frame.clone());
        Ok(PathBuf::from(format!("memory://image_{}.png", saved.len())))
    }
}

pub struct MemoryReportSink {
    reports: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl ReportSink for MemoryReportSink {
    fn append_report(&mut self, text: &str) -> Result<PathBuf, PersistenceError> {
        if self.fail {
            return Err(PersistenceError::Rejected("report sink offline".to_string()));
        }
        self.reports.lock().unwrap().push(text.to_string());
        Ok(PathBuf::from("memory://execution_log.txt"))
    }
}

/// Shared views into what the simulated devices were asked to do.
#[derive(Clone, Default)]
pub struct SimProbe {
    pub motor: Arc<Mutex<Vec<MotorCommand>>>,
    pub colors: Arc<Mutex<Vec<Rgb>>>,
    pub waits: Arc<Mutex<Vec<Duration>>>,
    pub saved_frames: Arc<Mutex<Vec<Frame>>>,
    pub reports: Arc<Mutex<Vec<String>>>,
}

impl SimProbe {
    pub fn motor_commands(&self) -> Vec<MotorCommand> {
        self.motor.lock().unwrap().clone()
    }

    pub fn stop_commands(&self) -> usize {
        self.motor.lock().unwrap().iter().filter(|c| c.is_stop()).count()
    }

    pub fn colors(&self) -> Vec<Rgb> {
        self.colors.lock().unwrap().clone()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }

    pub fn saved_frame_count(&self) -> usize {
        self.saved_frames.lock().unwrap().len()
    }

    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().unwrap().clone()
    }
}

/// Assembles scripted devices around a camera and ranging sensor.
pub struct SimRig {
    camera: ScriptedCamera,
    ranging: ScriptedRanging,
    failing_image_sink: bool,
    failing_report_sink: bool,
}

impl SimRig {
    pub fn new(camera: ScriptedCamera, ranging: ScriptedRanging) -> Self {
        Self {
            camera,
            ranging,
            failing_image_sink: false,
            failing_report_sink: false,
        }
    }

    pub fn failing_image_sink(mut self) -> Self {
        self.failing_image_sink = true;
        self
    }

    pub fn failing_report_sink(mut self) -> Self {
        self.failing_report_sink = true;
        self
    }

    pub fn build(self) -> (Devices, SimProbe) {
        let probe = SimProbe::default();
        let devices = Devices {
            camera: Box::new(self.camera),
            ranging: Box::new(self.ranging),
            motor: Box::new(RecordingMotor(probe.motor.clone())),
            indicator: Box::new(RecordingIndicator(probe.colors.clone())),
            image_sink: Box::new(MemoryImageSink {
                saved: probe.saved_frames.clone(),
                fail: self.failing_image_sink,
            }),
            report_sink: Box::new(MemoryReportSink {
                reports: probe.reports.clone(),
                fail: self.failing_report_sink,
            }),
            delay: Box::new(RecordingDelay(probe.waits.clone())),
        };
        (devices, probe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banded_frame_fills_each_third() {
        let frame = banded_frame(7, 2, [10, 20, 30]);
        let row: Vec<u8> = (0..7).map(|x| frame.get_pixel(x, 1)[0]).collect();
        assert_eq!(row, vec![10, 10, 20, 20, 30, 30, 30]);
    }

    #[test]
    fn camera_runs_dry_unless_repeating() {
        let mut camera = ScriptedCamera::new([banded_frame(3, 1, [1, 2, 3])]);
        assert!(camera.capture_frame(Resolution::SQUARE_720).is_ok());
        assert!(matches!(
            camera.capture_frame(Resolution::SQUARE_720),
            Err(CaptureError::Unavailable)
        ));

        let mut camera = ScriptedCamera::new([banded_frame(3, 1, [1, 2, 3])]).repeat_last();
        for _ in 0..3 {
            assert!(camera.capture_frame(Resolution::SQUARE_720).is_ok());
        }
    }

    #[test]
    fn capture_hook_sees_capture_numbers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut camera = ScriptedCamera::new([banded_frame(3, 1, [0, 0, 0])])
            .repeat_last()
            .on_capture(move |n| sink.lock().unwrap().push(n));
        for _ in 0..3 {
            camera.capture_frame(Resolution::SQUARE_720).unwrap();
        }
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn ranging_falls_back_after_script() {
        let mut ranging = ScriptedRanging::new([30.0], 150.0);
        assert_eq!(ranging.measure_distance_cm(), 30.0);
        assert_eq!(ranging.measure_distance_cm(), 150.0);
    }
}
