//! # Per-Cell Seeded RNG
//!
//! The legacy biome-layer linear congruential generator.
//!
//! ## Algorithm
//!
//! All arithmetic is two's-complement `i64` with wrapping overflow:
//!
//! ```text
//! mix(s, v)        = s * (s * 6364136223846793005 + 1442695040888963407) + v
//! start(seed, x, z) = mix(mix(mix(mix(seed, x), z), x), z)
//! next_int(bound)  = floor_mod(state >> 24, bound); state = mix(state, seed)
//! ```
//!
//! ## Determinism Guarantee
//!
//! The generator state is a pure function of `(layer seed, x, z)`. Nothing
//! leaks between cells, so any cell can be evaluated alone, in any order, on
//! any thread, and it yields the same value as part of a larger region.
//!
//! The bounded draw keeps the modulo bias of the reference engine. Downstream
//! layers depend on the exact values, so it must not be "fixed".

use crate::error::{LayerError, LayerResult};

/// LCG multiplier (Knuth's MMIX constant).
pub const MULTIPLIER: i64 = 6_364_136_223_846_793_005;

/// LCG increment.
pub const INCREMENT: i64 = 1_442_695_040_888_963_407;

/// One step of the seed mixer: `s * (s * MULTIPLIER + INCREMENT) + value`.
#[inline]
#[must_use]
pub const fn mix_seed(seed: i64, value: i64) -> i64 {
    seed.wrapping_mul(seed.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT))
        .wrapping_add(value)
}

/// Mixes a cell coordinate into a layer seed.
#[inline]
#[must_use]
pub const fn start_seed(seed: i64, x: i32, z: i32) -> i64 {
    let x = x as i64;
    let z = z as i64;
    mix_seed(mix_seed(mix_seed(mix_seed(seed, x), z), x), z)
}

/// World seed for deterministic generation.
///
/// All per-layer seeds derive from this value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(i64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: i64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Derives the seed of one pipeline stage from its salt.
    ///
    /// The salt is first scrambled with itself three times, then mixed into
    /// the world seed three times. The result is the value hosts pass to the
    /// grid drivers.
    #[inline]
    #[must_use]
    pub const fn layer_seed(self, salt: i64) -> i64 {
        let mut salted = salt;
        let mut i = 0;
        while i < 3 {
            salted = mix_seed(salted, salt);
            i += 1;
        }

        let mut seed = self.0;
        let mut i = 0;
        while i < 3 {
            seed = mix_seed(seed, salted);
            i += 1;
        }
        seed
    }
}

impl From<i64> for WorldSeed {
    fn from(seed: i64) -> Self {
        Self(seed)
    }
}

/// Compile-time guard for const-generic bounds.
struct PositiveBound<const BOUND: i32>;

impl<const BOUND: i32> PositiveBound<BOUND> {
    const OK: () = assert!(BOUND > 0, "bound must be positive");
}

/// Ephemeral random generator for a single cell.
///
/// Created (or reseeded) for one coordinate, drawn from while that cell is
/// evaluated, then dropped. Never shared between cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRng {
    /// Layer seed; re-added on every advance.
    seed: i64,
    /// Current generator state.
    state: i64,
}

impl CellRng {
    /// Creates a generator seeded for cell `(x, z)`.
    #[inline]
    #[must_use]
    pub const fn new(seed: i64, x: i32, z: i32) -> Self {
        Self {
            seed,
            state: start_seed(seed, x, z),
        }
    }

    /// Reseeds this generator for another cell of the same layer.
    ///
    /// Discards all previous state; equivalent to `CellRng::new(seed, x, z)`.
    #[inline]
    pub fn reseed(&mut self, x: i32, z: i32) {
        self.state = start_seed(self.seed, x, z);
    }

    /// Returns the layer seed this generator was built with.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> i64 {
        self.seed
    }

    /// Returns the current raw state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> i64 {
        self.state
    }

    /// Draws the raw value and advances the state.
    #[inline]
    fn step(&mut self, bound: i64) -> i32 {
        let value = (self.state >> 24).rem_euclid(bound) as i32;
        self.state = mix_seed(self.state, self.seed);
        value
    }

    /// Returns a value in `[0, BOUND)` for a compile-time bound.
    ///
    /// A non-positive `BOUND` is rejected at compile time.
    #[inline]
    pub fn next_bounded<const BOUND: i32>(&mut self) -> i32 {
        #[allow(clippy::let_unit_value)]
        let () = PositiveBound::<BOUND>::OK;

        if BOUND & (BOUND - 1) == 0 {
            let value = ((self.state >> 24) & i64::from(BOUND - 1)) as i32;
            self.state = mix_seed(self.state, self.seed);
            value
        } else {
            self.step(i64::from(BOUND))
        }
    }

    /// Returns a value in `[0, bound)`.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidArgument`] if `bound <= 0`. The state is
    /// not advanced in that case.
    #[inline]
    pub fn next_int(&mut self, bound: i32) -> LayerResult<i32> {
        if bound <= 0 {
            return Err(LayerError::InvalidArgument {
                parameter: "bound",
                value: i64::from(bound),
                requirement: "must be positive",
            });
        }
        Ok(self.step(i64::from(bound)))
    }
}
