//! # Single-Region Driver
//!
//! Evaluates a layer over one rectangular region into a caller-owned buffer.

use super::{check_capacity, eval_region, Input, Region};
use crate::config::DriverConfig;
use crate::error::{LayerError, LayerResult};
use crate::layer::Layer;
use crate::rng::CellRng;

/// Runs a [`Layer`] over single regions.
///
/// The driver borrows the layer and holds the per-layer seed; it keeps no
/// state between calls and never retains the caller's buffers.
///
/// # Example
///
/// ```rust
/// use fastlayer::{GridDriver, Region, RiverInit};
///
/// let layer = RiverInit::layer();
/// let driver = GridDriver::new(&layer, 123_456_789);
///
/// let mut cells = [5];
/// driver.grid(Region::new(0, 0, 1, 1), &mut cells).unwrap();
/// assert_eq!(cells[0], 229_526);
/// ```
#[derive(Debug)]
pub struct GridDriver<'l, L: ?Sized> {
    /// The layer to evaluate.
    layer: &'l L,
    /// Per-layer seed.
    seed: i64,
    /// Scheduling settings.
    config: DriverConfig,
}

impl<'l, L: Layer + ?Sized> GridDriver<'l, L> {
    /// Creates a sequential driver for `layer` seeded with `seed`.
    #[must_use]
    pub fn new(layer: &'l L, seed: i64) -> Self {
        Self {
            layer,
            seed,
            config: DriverConfig::default(),
        }
    }

    /// Sets the scheduling configuration.
    #[must_use]
    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the per-layer seed.
    #[must_use]
    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// Returns the scheduling configuration.
    #[must_use]
    pub fn config(&self) -> DriverConfig {
        self.config
    }

    /// Evaluates `region` in place.
    ///
    /// For a translation layer, `inout` holds the input grid on entry. On
    /// return its first `size_x * size_z` cells hold the output; cells past
    /// that are untouched.
    ///
    /// # Errors
    ///
    /// - [`LayerError::InvalidArgument`] if an extent is not positive.
    /// - [`LayerError::MissingInput`] if the layer reads more than one grid.
    /// - [`LayerError::InsufficientCapacity`] if `inout` is too short.
    ///
    /// Nothing is written on error.
    pub fn grid(&self, region: Region, inout: &mut [i32]) -> LayerResult<()> {
        self.run(region, None, true, inout)
    }

    /// Evaluates `region` from a separate input grid into `output`.
    ///
    /// `input` is ignored by layers that read no input.
    ///
    /// # Errors
    ///
    /// - [`LayerError::InvalidArgument`] if an extent is not positive.
    /// - [`LayerError::MissingInput`] if the layer needs an input grid and
    ///   `input` is `None`.
    /// - [`LayerError::InsufficientCapacity`] if either buffer is too short.
    ///
    /// Nothing is written on error.
    pub fn grid_from(
        &self,
        region: Region,
        input: Option<&[i32]>,
        output: &mut [i32],
    ) -> LayerResult<()> {
        self.run(region, input, false, output)
    }

    /// Evaluates a single cell.
    ///
    /// Produces the same value as the cell at `(x, z)` of any region
    /// containing it.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::MissingInput`] if `inputs` does not hold exactly
    /// one value per input grid.
    pub fn cell(&self, x: i32, z: i32, inputs: &[i32]) -> LayerResult<i32> {
        let expected = self.layer.input_count();
        if inputs.len() != expected {
            return Err(LayerError::MissingInput {
                expected,
                provided: inputs.len(),
            });
        }
        let mut rng = CellRng::new(self.seed, x, z);
        Ok(self.layer.evaluate(&mut rng, inputs))
    }

    fn run(
        &self,
        region: Region,
        input: Option<&[i32]>,
        in_place: bool,
        output: &mut [i32],
    ) -> LayerResult<()> {
        let (cells, input) = self
            .validate(region, input, in_place, output.len())
            .inspect_err(|e| {
                tracing::warn!("Rejected grid request {:?}: {}", region, e);
            })?;

        tracing::debug!(
            "Grid evaluation: {}x{} at ({}, {}), seed {}",
            region.size_x,
            region.size_z,
            region.origin_x,
            region.origin_z,
            self.seed
        );

        eval_region(
            self.layer,
            self.seed,
            region,
            input.slice(0, cells),
            &mut output[..cells],
            self.config.use_parallel(cells),
        );
        Ok(())
    }

    /// Validates everything up front; returns the cell count and input wiring.
    fn validate<'a>(
        &self,
        region: Region,
        input: Option<&'a [i32]>,
        in_place: bool,
        available: usize,
    ) -> LayerResult<(usize, Input<'a>)> {
        let required = region.cell_count()?;
        let input = Input::resolve(self.layer, input, in_place)?;
        input.check_capacity(Some(required))?;
        let cells = check_capacity("output", Some(required), available)?;
        Ok((cells, input))
    }
}
