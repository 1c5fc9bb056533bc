// Desk-side stand-ins for the robot's hardware. The cameras produce real grayscale
// frames (either replayed from image files or rendered from a wandering light
// source), the ranging sensor occasionally reports an obstacle, and the actuators
// log what they would have done. Motor pulses take their real duration so the
// loop runs at the robot's pace.

use anyhow::{Context, bail};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use light_seeker::hardware::{Camera, Indicator, Motor, Ranging};
use light_seeker::{CaptureError, Frame, Resolution, Rgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Replays the images of a directory in name order, looping forever.
pub struct FolderCamera {
    paths: Vec<PathBuf>,
    next: usize,
}

impl FolderCamera {
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if is_image {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            bail!("no images found in {}", dir.display());
        }
        paths.sort();
        info!(count = paths.len(), dir = %dir.display(), "folder camera ready");
        Ok(Self { paths, next: 0 })
    }
}

impl Camera for FolderCamera {
    fn capture_frame(&mut self, resolution: Resolution) -> Result<Frame, CaptureError> {
        let path = &self.paths[self.next];
        self.next = (self.next + 1) % self.paths.len();
        let image = image::open(path)
            .map_err(|e| CaptureError::Device(format!("{}: {e}", path.display())))?
            .to_luma8();
        debug!(path = %path.display(), "frame loaded");
        if image.dimensions() == (resolution.width, resolution.height) {
            return Ok(image);
        }
        Ok(imageops::resize(
            &image,
            resolution.width,
            resolution.height,
            FilterType::Triangle,
        ))
    }
}

/// Renders a dim room with one bright light that drifts sideways between captures.
pub struct DriftingLightCamera {
    rng: StdRng,
    /// Horizontal position of the light in [0, 1].
    light_x: f32,
}

impl DriftingLightCamera {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let light_x = rng.gen_range(0.0..1.0);
        Self { rng, light_x }
    }
}

impl Camera for DriftingLightCamera {
    fn capture_frame(&mut self, resolution: Resolution) -> Result<Frame, CaptureError> {
        self.light_x = (self.light_x + self.rng.gen_range(-0.15..0.15)).clamp(0.0, 1.0);
        let (width, height) = (resolution.width, resolution.height);
        let center_x = self.light_x * width as f32;
        let center_y = height as f32 * 0.4;
        let radius = width.max(height) as f32 * 0.35;
        let frame = GrayImage::from_fn(width, height, |x, y| {
            let dx = x as f32 - center_x;
            let dy = y as f32 - center_y;
            let falloff = (1.0 - (dx * dx + dy * dy).sqrt() / radius).max(0.0);
            Luma([(30.0 + 220.0 * falloff) as u8])
        });
        Ok(frame)
    }
}

/// Mostly open space, with an obstacle now and then.
pub struct RandomRanging {
    rng: StdRng,
    obstacle_chance: f64,
}

impl RandomRanging {
    pub fn new(seed: u64, obstacle_chance: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            obstacle_chance: obstacle_chance.clamp(0.0, 1.0),
        }
    }
}

impl Ranging for RandomRanging {
    fn measure_distance_cm(&mut self) -> f64 {
        let distance = if self.rng.gen_bool(self.obstacle_chance) {
            self.rng.gen_range(5.0..50.0)
        } else {
            self.rng.gen_range(50.0..300.0)
        };
        debug!(distance_cm = distance, "ultrasound");
        distance
    }
}

/// Logs wheel pulses and holds for their duration.
pub struct ConsoleMotor;

impl Motor for ConsoleMotor {
    fn drive(&mut self, left_speed: i32, right_speed: i32, duration_ms: u64) {
        info!(left_speed, right_speed, duration_ms, "wheels");
        std::thread::sleep(Duration::from_millis(duration_ms));
    }
}

pub struct ConsoleIndicator;

impl Indicator for ConsoleIndicator {
    fn set_color(&mut self, Rgb(r, g, b): Rgb) {
        info!("underlights -> rgb({r}, {g}, {b})");
    }
}
