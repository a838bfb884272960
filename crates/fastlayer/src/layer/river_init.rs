//! # River Initialization
//!
//! Seeds river sources: every land cell (input > 0) gets a random river id
//! in `[2, 300001)`, everything else stays 0. Later river layers compare
//! neighboring ids to carve river edges.

use super::translation::{Translate, TranslationLayer};
use crate::rng::CellRng;

/// Stage salt of the river-init layer in the biome pipeline.
pub const RIVER_INIT_SALT: i64 = 100;

/// Number of distinct river ids.
pub const RIVER_ID_RANGE: i32 = 299_999;

/// Smallest river id; 0 and 1 are reserved.
pub const RIVER_ID_MIN: i32 = 2;

/// The river-init transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RiverInit;

impl RiverInit {
    /// Returns this transform as a [`TranslationLayer`].
    #[inline]
    #[must_use]
    pub const fn layer() -> TranslationLayer<Self> {
        TranslationLayer::new(Self)
    }
}

impl Translate for RiverInit {
    #[inline]
    fn translate(&self, rng: &mut CellRng, value: i32) -> i32 {
        if value > 0 {
            rng.next_bounded::<RIVER_ID_RANGE>() + RIVER_ID_MIN
        } else {
            0
        }
    }
}
