// THEORY:
// The `ColumnBand` module represents one vertical third of a frame. It is the
// spatial unit of the light analysis: the robot only ever asks "is it brighter to
// my left, ahead of me, or to my right?", so a frame is pooled into three
// contiguous column ranges rather than analyzed pixel by pixel.
//
// Key architectural principles:
// 1.  **Spatial Pooling**: A band sums every pixel in its columns across all rows.
//     Pooling over a third of the image cancels single-pixel sensor noise.
// 2.  **Fixed Geometry**: Band boundaries depend only on the frame width. The base
//     width is `width / 3`; the right band runs to the edge and absorbs any
//     remainder columns.
// 3.  **Shared Divisor**: Every band reports its `divisor_width` as the base width,
//     including a right band that is wider than that. The averages therefore match
//     the robot's historical output exactly, and a wider right band reads slightly
//     brighter than its true mean.
// 4.  **Data Container**: A band is a "dumb" data container. It knows its
//     own columns and how to sum a row; it does not compare itself to other bands.

pub mod band {
    use crate::core_modules::heading::Heading;

    /// A contiguous, half-open column range `[start, end)` of a frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ColumnBand {
        pub heading: Heading,
        pub start: u32,
        pub end: u32,
        /// The width every band divides by: `frame_width / 3`.
        pub divisor_width: u32,
    }

    impl ColumnBand {
        /// Splits a frame width into left, center and right bands.
        /// Callers must ensure `width >= 3`.
        pub fn split(width: u32) -> [ColumnBand; 3] {
            let third = width / 3;
            let band = |heading, start, end| ColumnBand {
                heading,
                start,
                end,
                divisor_width: third,
            };
            [
                band(Heading::Left, 0, third),
                band(Heading::Center, third, 2 * third),
                band(Heading::Right, 2 * third, width),
            ]
        }

        /// Number of columns actually covered by the band.
        pub fn width(&self) -> u32 {
            self.end - self.start
        }

        /// Sums the band's pixels in one row of luma bytes.
        pub fn row_sum(&self, row: &[u8]) -> u64 {
            row[self.start as usize..self.end as usize]
                .iter()
                .map(|&p| p as u64)
                .sum()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::band::ColumnBand;
    use crate::core_modules::heading::Heading;

    #[test]
    fn even_width_splits_into_equal_thirds() {
        let [left, center, right] = ColumnBand::split(720);
        assert_eq!((left.start, left.end), (0, 240));
        assert_eq!((center.start, center.end), (240, 480));
        assert_eq!((right.start, right.end), (480, 720));
        assert_eq!(right.heading, Heading::Right);
        assert!([left, center, right].iter().all(|b| b.divisor_width == 240));
    }

    #[test]
    fn remainder_columns_go_right() {
        let [left, center, right] = ColumnBand::split(8);
        assert_eq!(left.width(), 2);
        assert_eq!(center.width(), 2);
        assert_eq!(right.width(), 4);
        assert_eq!(right.divisor_width, 2);
    }

    #[test]
    fn row_sum_covers_only_band_columns() {
        let row = [1u8, 2, 3, 4, 5, 6, 7];
        let [left, center, right] = ColumnBand::split(row.len() as u32);
        assert_eq!(left.row_sum(&row), 1 + 2);
        assert_eq!(center.row_sum(&row), 3 + 4);
        assert_eq!(right.row_sum(&row), 5 + 6 + 7);
    }
}
