// THEORY:
// The `FrameAnalyzer` is the perception layer. It transforms a raw grayscale frame
// into the only thing the decision logic cares about: a `DirectionalReading` with
// one average brightness per heading.
//
// Key architectural principles:
// 1.  **Data Transformation**: It slices the frame into three `ColumnBand`s and walks
//     the raw luma buffer row by row, letting each band pool its own columns. A single
//     pass over contiguous memory keeps a 720x720 frame cheap.
// 2.  **Stateless**: Nothing is retained between calls. The frame is borrowed for the
//     duration of `analyze` and the reading is the only output.
// 3.  **Historical Parity**: All three sums are divided by `(width / 3) * height`.
//     See `band.rs` for why the right band keeps that divisor.

use crate::core_modules::band::band::ColumnBand;
use crate::core_modules::heading::DirectionalReading;
use crate::error::{Result, SeekerError};
use crate::hardware::Frame;

/// Smallest frame width that still yields three non-empty bands.
pub const MIN_FRAME_WIDTH: u32 = 3;

#[derive(Debug, Default, Clone, Copy)]
pub struct FrameAnalyzer;

impl FrameAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Converts a frame into left/center/right average brightness.
    pub fn analyze(&self, frame: &Frame) -> Result<DirectionalReading> {
        let (width, height) = frame.dimensions();
        if width < MIN_FRAME_WIDTH || height == 0 {
            return Err(SeekerError::InvalidFrame { width, height });
        }

        let bands = ColumnBand::split(width);
        let mut sums = [0u64; 3];
        for row in frame.as_raw().chunks_exact(width as usize) {
            for (sum, band) in sums.iter_mut().zip(bands.iter()) {
                *sum += band.row_sum(row);
            }
        }

        let divisor = bands[0].divisor_width as u64 * height as u64;
        Ok(DirectionalReading::from_levels(
            sums.map(|sum| (sum / divisor) as u32),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn frame_from_columns(columns: &[u8], height: u32) -> GrayImage {
        GrayImage::from_fn(columns.len() as u32, height, |x, _| Luma([columns[x as usize]]))
    }

    #[test]
    fn uniform_frame_reads_uniformly() {
        let frame = GrayImage::from_pixel(720, 720, Luma([128]));
        let reading = FrameAnalyzer::new().analyze(&frame).unwrap();
        assert_eq!(reading.levels(), [128, 128, 128]);
    }

    #[test]
    fn bright_left_third_dominates() {
        let frame = GrayImage::from_fn(9, 4, |x, _| Luma([if x < 3 { 250 } else { 10 }]));
        let reading = FrameAnalyzer::new().analyze(&frame).unwrap();
        assert_eq!(reading.levels(), [250, 10, 10]);
    }

    #[test]
    fn averages_use_integer_division() {
        // left: (1 + 2) * 2 rows / (2 * 2) = 1
        let frame = frame_from_columns(&[1, 2, 5, 5, 9, 9], 2);
        let reading = FrameAnalyzer::new().analyze(&frame).unwrap();
        assert_eq!(reading.levels(), [1, 5, 9]);
    }

    #[test]
    fn wide_right_band_keeps_base_divisor() {
        // Known quirk: width 8 gives bands of 2, 2 and 4 columns, and the right band
        // is still divided by 2 * height, so its "average" is double the true mean.
        let frame = GrayImage::from_pixel(8, 3, Luma([100]));
        let reading = FrameAnalyzer::new().analyze(&frame).unwrap();
        assert_eq!(reading.levels(), [100, 100, 200]);
    }

    #[test]
    fn sum_weighted_reconstruction_approximates_total() {
        let frame = GrayImage::from_fn(30, 20, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));
        let reading = FrameAnalyzer::new().analyze(&frame).unwrap();

        let total: u64 = frame.as_raw().iter().map(|&p| p as u64).sum();
        let band_pixels = 10 * 20;
        let rebuilt: u64 = reading.levels().iter().map(|&v| v as u64 * band_pixels).sum();
        assert!(rebuilt <= total);
        assert!(total - rebuilt < 3 * band_pixels);
    }

    #[test]
    fn minimum_width_frame_is_accepted() {
        let frame = frame_from_columns(&[3, 6, 9], 1);
        let reading = FrameAnalyzer::new().analyze(&frame).unwrap();
        assert_eq!(reading.levels(), [3, 6, 9]);
    }

    #[test]
    fn too_narrow_or_empty_frames_are_rejected() {
        let analyzer = FrameAnalyzer::new();
        assert!(matches!(
            analyzer.analyze(&GrayImage::new(2, 10)),
            Err(SeekerError::InvalidFrame { width: 2, height: 10 })
        ));
        assert!(matches!(
            analyzer.analyze(&GrayImage::new(9, 0)),
            Err(SeekerError::InvalidFrame { .. })
        ));
    }
}
