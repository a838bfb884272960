//! # Translation Layers
//!
//! `output[cell] = f(rng at cell, input[cell])`, with no neighbor lookups.

use super::Layer;
use crate::rng::CellRng;

/// A pure transform of one input value.
///
/// Implemented by named transforms such as [`super::RiverInit`] and by any
/// closure `Fn(&mut CellRng, i32) -> i32`.
pub trait Translate: Sync {
    /// Maps the input value of one cell to its output value.
    fn translate(&self, rng: &mut CellRng, value: i32) -> i32;
}

impl<F> Translate for F
where
    F: Fn(&mut CellRng, i32) -> i32 + Sync,
{
    #[inline]
    fn translate(&self, rng: &mut CellRng, value: i32) -> i32 {
        self(rng, value)
    }
}

/// Adapts a [`Translate`] into a single-input [`Layer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TranslationLayer<T> {
    transform: T,
}

impl<T: Translate> TranslationLayer<T> {
    /// Wraps a transform.
    #[inline]
    #[must_use]
    pub const fn new(transform: T) -> Self {
        Self { transform }
    }

    /// Returns the wrapped transform.
    #[inline]
    #[must_use]
    pub const fn transform(&self) -> &T {
        &self.transform
    }

    /// Evaluates a single cell.
    #[inline]
    pub fn eval(&self, rng: &mut CellRng, value: i32) -> i32 {
        self.transform.translate(rng, value)
    }
}

impl<T: Translate> Layer for TranslationLayer<T> {
    #[inline]
    fn input_count(&self) -> usize {
        1
    }

    #[inline]
    fn evaluate(&self, rng: &mut CellRng, inputs: &[i32]) -> i32 {
        self.transform.translate(rng, inputs[0])
    }
}
