//! # FASTLAYER
//!
//! Deterministic, seed-derived grid layers for procedural biome generation.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: a cell's value is a pure function of the layer seed,
//!    its absolute coordinate and its input value
//! 2. **Stateless**: layers are plain values, drivers keep nothing between
//!    calls, and there is no global RNG
//! 3. **Fail before writing**: bad arguments and short buffers are rejected
//!    before the first cell is touched
//! 4. **Bit-exact**: the RNG reproduces the legacy biome-layer generator,
//!    modulo bias included
//!
//! ## Core Components
//!
//! - `CellRng`: per-cell reseeded linear congruential generator
//! - `Layer` / `TranslationLayer`: per-cell transform contract
//! - `RiverInit`: the river-initialization transform
//! - `GridDriver`: evaluates one rectangular region
//! - `MultiGridDriver`: evaluates a lattice of square regions in one call
//!
//! ## Example
//!
//! ```rust
//! use fastlayer::{GridDriver, Region, RiverInit, WorldSeed, RIVER_INIT_SALT};
//!
//! let seed = WorldSeed::new(12345).layer_seed(RIVER_INIT_SALT);
//! let layer = RiverInit::layer();
//!
//! // Land mask in, river ids out.
//! let mut cells = vec![1, 0, 1, 0];
//! GridDriver::new(&layer, seed)
//!     .grid(Region::new(0, 0, 2, 2), &mut cells)
//!     .unwrap();
//! assert_eq!(cells[1], 0);
//! assert!(cells[0] >= 2);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod grid;
pub mod layer;
pub mod rng;

pub use config::{DriverConfig, EngineConfig};
pub use error::{ErrorKind, LayerError, LayerResult};
pub use grid::{GridDriver, MultiGridDriver, MultiGridRequest, Region};
pub use layer::river_init::{RIVER_ID_MIN, RIVER_ID_RANGE, RIVER_INIT_SALT};
pub use layer::{Layer, RiverInit, Translate, TranslationLayer};
pub use rng::{CellRng, WorldSeed};
