// THEORY:
// The `DirectionSelector` turns a `DirectionalReading` into a `Heading`.
//
// 1.  **Primary choice**: the brightest heading wins. A later heading only replaces
//     the current best when it is strictly brighter, so ties go to whichever
//     heading a left-to-right scan meets first.
// 2.  **Alternative choice**: used when the primary heading is still blocked after
//     the obstacle countdown. The blocked heading is skipped and the same
//     first-strictly-greater scan runs over the rest.
// 3.  **Symmetric fallback**: when the left and right readings are exactly equal and
//     both are still available, or when no candidate remains at all, the robot
//     picks Left or Right at random. Center is never the random answer.
//
// The random source is owned by the selector and injected at construction, so a
// seeded `StdRng` makes the symmetric fallback reproducible.

use crate::core_modules::heading::{DirectionalReading, Heading};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tracing::debug;

pub struct DirectionSelector {
    rng: Box<dyn RngCore + Send>,
}

impl DirectionSelector {
    pub fn new(rng: Box<dyn RngCore + Send>) -> Self {
        Self { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Box::new(StdRng::seed_from_u64(seed)))
    }

    /// Seeded when a seed is given, OS entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(Box::new(StdRng::from_entropy())),
        }
    }

    /// Brightest heading; ties resolve to the first in scan order.
    pub fn select_primary(reading: &DirectionalReading) -> Heading {
        let mut best = Heading::Left;
        for heading in Heading::ALL.into_iter().skip(1) {
            if reading.get(heading) > reading.get(best) {
                best = heading;
            }
        }
        best
    }

    /// Best heading other than `blocked`, with a random lateral fallback.
    pub fn select_alternative(&mut self, reading: &DirectionalReading, blocked: Heading) -> Heading {
        let mut best: Option<Heading> = None;
        for heading in Heading::ALL {
            if heading == blocked {
                continue;
            }
            match best {
                Some(current) if reading.get(heading) <= reading.get(current) => {}
                _ => best = Some(heading),
            }
        }

        let laterals_open = blocked == Heading::Center;
        let symmetric = laterals_open && reading.get(Heading::Left) == reading.get(Heading::Right);
        match best {
            Some(heading) if !symmetric => heading,
            _ => {
                let heading = if self.rng.gen_bool(0.5) {
                    Heading::Left
                } else {
                    Heading::Right
                };
                debug!(%heading, "symmetric light, picked a random side");
                heading
            }
        }
    }
}
