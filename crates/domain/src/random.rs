//! The single seam through which every subsystem draws variance.
//!
//! Dice rolls, initiative tiebreaks, wound rolls, director probability checks —
//! all of it flows through a `&dyn RandomSource` handed down from the turn
//! pipeline. Nothing in `rules` or `model` calls into a global RNG: that's what
//! makes a turn reproducible from its inputs plus the sequence of draws it made,
//! and what lets tests pin exact outcomes with a fixed source.

/// A source of randomness, injected rather than reached for globally.
///
/// Implementations live in the engine crate (`SystemRandom` wraps `rand::thread_rng`,
/// `FixedRandom` returns a pinned value for tests) — this crate only defines the
/// capability, following the same split the turn pipeline's clock port uses.
pub trait RandomSource {
    /// Inclusive random integer in `[min, max]`.
    fn gen_range(&self, min: i32, max: i32) -> i32;

    /// Uniform float in `[0.0, 1.0)`, used by probability checks (wound healing,
    /// bounty-hunter spawn chance, trait-generation fallbacks).
    fn gen_probability(&self) -> f64;
}

impl RandomSource for &dyn RandomSource {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        (**self).gen_range(min, max)
    }

    fn gen_probability(&self) -> f64 {
        (**self).gen_probability()
    }
}
