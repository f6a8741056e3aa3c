//! Concrete `RandomSource` implementations. The domain crate only defines the
//! capability (`wrldcore_domain::RandomSource`); this crate supplies the two
//! implementations that matter: a real one backed by `rand`, and a fixed one
//! for deterministic replay/tests.

use std::cell::RefCell;

use rand::Rng;
use wrldcore_domain::RandomSource;

/// The production random source. Each call reaches into `rand::thread_rng()` —
/// never stored as a long-lived global, always constructed and passed down
/// explicitly by the turn pipeline for the duration of one resolve call.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }

    fn gen_probability(&self) -> f64 {
        rand::thread_rng().gen_range(0.0..1.0)
    }
}

/// A scripted random source for deterministic tests and snapshot-replay
/// verification: returns values from a fixed queue, falling back to a default
/// once exhausted rather than panicking.
pub struct FixedRandom {
    ints: RefCell<Vec<i32>>,
    probabilities: RefCell<Vec<f64>>,
}

impl FixedRandom {
    pub fn new(ints: Vec<i32>, probabilities: Vec<f64>) -> Self {
        Self {
            ints: RefCell::new(ints),
            probabilities: RefCell::new(probabilities),
        }
    }
}

impl RandomSource for FixedRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        let mut queue = self.ints.borrow_mut();
        if queue.is_empty() {
            min
        } else {
            queue.remove(0).clamp(min, max)
        }
    }

    fn gen_probability(&self) -> f64 {
        let mut queue = self.probabilities.borrow_mut();
        if queue.is_empty() {
            0.0
        } else {
            queue.remove(0)
        }
    }
}
