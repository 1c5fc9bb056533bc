use crate::core_modules::heading::Heading;

/// One row of the movement table: an open-loop wheel pulse and the distance it is
/// credited with. The credit is a declared approximation, not odometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    pub heading: Heading,
    pub left_speed: i32,
    pub right_speed: i32,
    pub duration_ms: u64,
    pub distance_cm: u32,
}

impl Movement {
    pub const fn for_heading(heading: Heading) -> Movement {
        match heading {
            Heading::Left => Movement {
                heading,
                left_speed: -50,
                right_speed: 50,
                duration_ms: 500,
                distance_cm: 15,
            },
            Heading::Center => Movement {
                heading,
                left_speed: 50,
                right_speed: 50,
                duration_ms: 1000,
                distance_cm: 30,
            },
            Heading::Right => Movement {
                heading,
                left_speed: 50,
                right_speed: -50,
                duration_ms: 500,
                distance_cm: 15,
            },
        }
    }

    /// Movement log entry, e.g. `Left 15 cm`.
    pub fn description(&self) -> String {
        let label = match self.heading {
            Heading::Left => "Left",
            Heading::Center => "Straight",
            Heading::Right => "Right",
        };
        format!("{label} {} cm", self.distance_cm)
    }
}
