// THEORY:
// The `hardware` module is the seam between the decision loop and the physical
// robot. Every capability the loop consumes (camera, ultrasound ranging, wheels,
// underlights, persistence and even the passage of time) is a narrow trait here.
// The loop owns one boxed implementation of each through `Devices`, so the same
// `NavigationLoop` drives a real robot, the `seeker_sim` runner, or the scripted
// devices used by the tests.
//
// File-backed persistence ships in this module because both runners need it:
// `FileImageSink` writes every captured frame as a PNG and `FileReportSink` appends
// the rendered execution log to a text file.

use crate::error::{CaptureError, PersistenceError};
use image::GrayImage;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// A captured grayscale frame. One luma byte per pixel.
pub type Frame = GrayImage;

/// Requested capture size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const SQUARE_720: Resolution = Resolution {
        width: 720,
        height: 720,
    };
}

/// An underlight color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub trait Camera {
    fn capture_frame(&mut self, resolution: Resolution) -> Result<Frame, CaptureError>;
}

pub trait Ranging {
    /// Distance to the nearest object ahead, in centimeters.
    fn measure_distance_cm(&mut self) -> f64;
}

pub trait Motor {
    /// Open-loop pulse: both wheel speeds for a fixed duration. `(0, 0, _)` stops.
    fn drive(&mut self, left_speed: i32, right_speed: i32, duration_ms: u64);
}

pub trait Indicator {
    fn set_color(&mut self, color: Rgb);
}

pub trait ImageSink {
    fn save_frame(&mut self, frame: &Frame) -> Result<PathBuf, PersistenceError>;
}

pub trait ReportSink {
    fn append_report(&mut self, text: &str) -> Result<PathBuf, PersistenceError>;
}

/// Blocking pause on the loop's own thread.
pub trait Delay {
    fn wait(&mut self, duration: Duration);
}

/// Every collaborator the navigation loop talks to.
pub struct Devices {
    pub camera: Box<dyn Camera + Send>,
    pub ranging: Box<dyn Ranging + Send>,
    pub motor: Box<dyn Motor + Send>,
    pub indicator: Box<dyn Indicator + Send>,
    pub image_sink: Box<dyn ImageSink + Send>,
    pub report_sink: Box<dyn ReportSink + Send>,
    pub delay: Box<dyn Delay + Send>,
}

/// Real wall-clock delay.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Delay for ThreadSleep {
    fn wait(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Saves frames as `image_<unix millis>.png` inside a directory.
#[derive(Debug, Clone)]
pub struct FileImageSink {
    dir: PathBuf,
}

impl FileImageSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn next_path(&self) -> PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let mut path = self.dir.join(format!("image_{millis}.png"));
        let mut suffix = 1;
        while path.exists() {
            path = self.dir.join(format!("image_{millis}_{suffix}.png"));
            suffix += 1;
        }
        path
    }
}

impl ImageSink for FileImageSink {
    fn save_frame(&mut self, frame: &Frame) -> Result<PathBuf, PersistenceError> {
        let path = self.next_path();
        frame
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|source| PersistenceError::Encode {
                path: path.clone(),
                source,
            })?;
        Ok(absolute(&path))
    }
}

/// Appends rendered reports to a text file, creating it on first use.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    path: PathBuf,
}

impl FileReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for FileReportSink {
    fn append_report(&mut self, text: &str) -> Result<PathBuf, PersistenceError> {
        let io_err = |source| PersistenceError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(text.as_bytes()).map_err(io_err)?;
        debug!(path = %self.path.display(), bytes = text.len(), "report appended");
        Ok(absolute(&self.path))
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn image_sink_writes_readable_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileImageSink::new(dir.path());
        let frame = GrayImage::from_pixel(6, 4, Luma([77]));

        let first = sink.save_frame(&frame).unwrap();
        let second = sink.save_frame(&frame).unwrap();

        assert_ne!(first, second);
        assert!(first.is_absolute());
        let name = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("image_") && name.ends_with(".png"));
        let decoded = image::open(&first).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (6, 4));
        assert_eq!(decoded.get_pixel(3, 2), &Luma([77]));
    }

    #[test]
    fn image_sink_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileImageSink::new(dir.path().join("missing"));
        let frame = GrayImage::new(3, 1);
        assert!(matches!(
            sink.save_frame(&frame),
            Err(PersistenceError::Encode { .. })
        ));
    }

    #[test]
    fn report_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("execution_log.txt");
        let mut sink = FileReportSink::new(&path);

        sink.append_report("first\n").unwrap();
        sink.append_report("second\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
