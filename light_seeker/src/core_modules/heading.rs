// THEORY:
// `Heading` is the unit of navigational decision: every iteration ends with the
// robot turning left, driving straight or turning right. `DirectionalReading` is
// the perception that feeds that decision, one average brightness per heading.
//
// Both are plain data. The scan order Left -> Center -> Right is significant: the
// selectors resolve ties in favor of whichever heading a left-to-right scan meets
// first, so `Heading::ALL` is the single source of that order.

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    Left,
    Center,
    Right,
}

impl Heading {
    /// All headings in scan order.
    pub const ALL: [Heading; 3] = [Heading::Left, Heading::Center, Heading::Right];

    pub fn index(self) -> usize {
        match self {
            Heading::Left => 0,
            Heading::Center => 1,
            Heading::Right => 2,
        }
    }
}

impl Display for Heading {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Heading::Left => write!(f, "LEFT"),
            Heading::Center => write!(f, "FORWARD"),
            Heading::Right => write!(f, "RIGHT"),
        }
    }
}

/// Average brightness of the left, center and right thirds of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectionalReading {
    levels: [u32; 3],
}

impl DirectionalReading {
    pub fn new(left: u32, center: u32, right: u32) -> Self {
        Self {
            levels: [left, center, right],
        }
    }

    pub fn from_levels(levels: [u32; 3]) -> Self {
        Self { levels }
    }

    pub fn get(&self, heading: Heading) -> u32 {
        self.levels[heading.index()]
    }

    pub fn levels(&self) -> [u32; 3] {
        self.levels
    }

    /// The highest of the three values.
    pub fn peak(&self) -> u32 {
        self.levels.iter().copied().max().unwrap_or_default()
    }

    /// Integer mean of the three values.
    pub fn mean(&self) -> u32 {
        let sum: u64 = self.levels.iter().map(|&v| v as u64).sum();
        (sum / 3) as u32
    }
}

impl Display for DirectionalReading {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Left: {} | Center: {} | Right: {}",
            self.levels[0], self.levels[1], self.levels[2]
        )
    }
}
