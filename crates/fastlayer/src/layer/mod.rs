//! # Layers
//!
//! A layer is a pure per-cell transform. The drivers reseed a [`CellRng`]
//! for each absolute coordinate and hand it to [`Layer::evaluate`] together
//! with the same-position values of the layer's input grids.
//!
//! Layers carry no mutable state. A layer value can be shared between threads
//! and reused across any number of calls.

pub mod river_init;
pub mod translation;

pub use river_init::RiverInit;
pub use translation::{Translate, TranslationLayer};

use crate::rng::CellRng;

/// A per-cell evaluation strategy.
pub trait Layer: Sync {
    /// Number of input grids this layer reads.
    ///
    /// Zero for generator layers, one for translation layers.
    fn input_count(&self) -> usize;

    /// Computes one output cell.
    ///
    /// `rng` is already seeded for the cell's coordinate. `inputs` holds
    /// exactly [`Layer::input_count`] values, one per input grid, taken from
    /// the same position.
    fn evaluate(&self, rng: &mut CellRng, inputs: &[i32]) -> i32;
}

impl<L: Layer + ?Sized> Layer for &L {
    #[inline]
    fn input_count(&self) -> usize {
        (**self).input_count()
    }

    #[inline]
    fn evaluate(&self, rng: &mut CellRng, inputs: &[i32]) -> i32 {
        (**self).evaluate(rng, inputs)
    }
}
