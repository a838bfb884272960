//! # Multi-Grid Driver
//!
//! Evaluates many same-sized square regions spaced on a regular lattice in
//! one call, writing all of them into one concatenated buffer.
//!
//! Two lattices are supported:
//!
//! - **Strip**: `count` regions along x at `(origin_x + i * dist, origin_z)`.
//! - **Square**: `count × count` regions at
//!   `(origin_x + gx * dist, origin_z + gz * dist)`, ordered by `gx`, then
//!   `gz`.
//!
//! Each region is a `size × size` row-major grid at offset
//! `index * size * size`. Lattice offsets wrap in `i32` like cell
//! coordinates do.

use rayon::prelude::*;

use super::{check_capacity, eval_region, positive, Input, Region};
use crate::config::DriverConfig;
use crate::error::{LayerError, LayerResult};
use crate::layer::Layer;

/// A batch of square regions on a lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MultiGridRequest {
    /// X coordinate of the first region's first cell.
    pub origin_x: i32,
    /// Z coordinate of the first region's first cell.
    pub origin_z: i32,
    /// Side length of every region, in cells.
    pub size: i32,
    /// Distance between consecutive region origins, in cells.
    pub dist: i32,
    /// Number of regions (per axis for the square lattice).
    pub count: i32,
}

impl MultiGridRequest {
    /// Creates a request.
    #[inline]
    #[must_use]
    pub const fn new(origin_x: i32, origin_z: i32, size: i32, dist: i32, count: i32) -> Self {
        Self {
            origin_x,
            origin_z,
            size,
            dist,
            count,
        }
    }

    /// Returns the `i`-th region of the strip lattice.
    #[inline]
    #[must_use]
    pub const fn strip_region(&self, i: i32) -> Region {
        Region::square(
            self.origin_x.wrapping_add(i.wrapping_mul(self.dist)),
            self.origin_z,
            self.size,
        )
    }

    /// Returns region `(gx, gz)` of the square lattice.
    #[inline]
    #[must_use]
    pub const fn lattice_region(&self, gx: i32, gz: i32) -> Region {
        Region::square(
            self.origin_x.wrapping_add(gx.wrapping_mul(self.dist)),
            self.origin_z.wrapping_add(gz.wrapping_mul(self.dist)),
            self.size,
        )
    }

    /// Checks `size > 0` and `count >= 0`; returns cells per region and
    /// region count.
    fn validate(&self) -> LayerResult<(u64, u64)> {
        let size = positive("size", self.size)?;
        if self.count < 0 {
            return Err(LayerError::InvalidArgument {
                parameter: "count",
                value: i64::from(self.count),
                requirement: "must not be negative",
            });
        }
        Ok((size * size, self.count as u64))
    }
}

/// Which lattice a batch is laid out on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lattice {
    Strip,
    Square,
}

/// Runs a [`Layer`] over batches of regions.
///
/// # Example
///
/// ```rust
/// use fastlayer::{MultiGridDriver, MultiGridRequest, RiverInit};
///
/// let layer = RiverInit::layer();
/// let driver = MultiGridDriver::new(&layer, 123_456_789);
///
/// // Three 4x4 regions, 16 cells apart along x.
/// let mut cells = vec![1; 3 * 16];
/// driver
///     .multi_grid(MultiGridRequest::new(0, 0, 4, 16, 3), &mut cells)
///     .unwrap();
/// assert_eq!(cells[0], 229_526);
/// ```
#[derive(Debug)]
pub struct MultiGridDriver<'l, L: ?Sized> {
    /// The layer to evaluate.
    layer: &'l L,
    /// Per-layer seed.
    seed: i64,
    /// Scheduling settings.
    config: DriverConfig,
}

impl<'l, L: Layer + ?Sized> MultiGridDriver<'l, L> {
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

    /// Evaluates a strip of `count` regions in place.
    ///
    /// For a translation layer, `inout` holds the `count` concatenated input
    /// grids on entry. `count == 0` is valid and writes nothing.
    ///
    /// # Errors
    ///
    /// - [`LayerError::InvalidArgument`] if `size <= 0` or `count < 0`.
    /// - [`LayerError::MissingInput`] if the layer reads more than one grid.
    /// - [`LayerError::InsufficientCapacity`] if `inout` holds fewer than
    ///   `count * size * size` cells.
    /// - [`LayerError::CapacityOverflow`] if that product overflows.
    ///
    /// Nothing is written on error.
    pub fn multi_grid(&self, request: MultiGridRequest, inout: &mut [i32]) -> LayerResult<()> {
        self.run(request, Lattice::Strip, None, true, inout)
    }

    /// Evaluates a strip of regions from separate input grids into `output`.
    ///
    /// # Errors
    ///
    /// As [`MultiGridDriver::multi_grid`], plus [`LayerError::MissingInput`]
    /// if the layer needs input and `input` is `None`.
    pub fn multi_grid_from(
        &self,
        request: MultiGridRequest,
        input: Option<&[i32]>,
        output: &mut [i32],
    ) -> LayerResult<()> {
        self.run(request, Lattice::Strip, input, false, output)
    }

    /// Evaluates a `count × count` square lattice of regions in place.
    ///
    /// # Errors
    ///
    /// As [`MultiGridDriver::multi_grid`], with a required length of
    /// `count * count * size * size`.
    pub fn multi_grid_square(
        &self,
        request: MultiGridRequest,
        inout: &mut [i32],
    ) -> LayerResult<()> {
        self.run(request, Lattice::Square, None, true, inout)
    }

    fn run(
        &self,
        request: MultiGridRequest,
        lattice: Lattice,
        input: Option<&[i32]>,
        in_place: bool,
        output: &mut [i32],
    ) -> LayerResult<()> {
        let (per_region, regions, input) = self
            .validate(request, lattice, input, in_place, output.len())
            .inspect_err(|e| {
                tracing::warn!("Rejected {:?} multi-grid request {:?}: {}", lattice, request, e);
            })?;

        tracing::debug!(
            "Multi-grid evaluation: {} {:?} regions of {}x{} from ({}, {}), dist {}, seed {}",
            regions,
            lattice,
            request.size,
            request.size,
            request.origin_x,
            request.origin_z,
            request.dist,
            self.seed
        );

        if regions == 0 {
            return Ok(());
        }

        let count = request.count as usize;
        let region_of = |index: usize| match lattice {
            Lattice::Strip => request.strip_region(index as i32),
            Lattice::Square => {
                request.lattice_region((index / count) as i32, (index % count) as i32)
            }
        };

        let total = per_region * regions;
        let region_task = |(index, cells): (usize, &mut [i32])| {
            let region = region_of(index);
            tracing::trace!("Sub-region {} at ({}, {})", index, region.origin_x, region.origin_z);
            eval_region(
                self.layer,
                self.seed,
                region,
                input.slice(index * per_region, per_region),
                cells,
                false,
            );
        };

        let output = &mut output[..total];
        if self.config.use_parallel(total) {
            output.par_chunks_mut(per_region).enumerate().for_each(region_task);
        } else {
            output.chunks_mut(per_region).enumerate().for_each(region_task);
        }
        Ok(())
    }

    /// Validates everything up front; returns cells per region, region count
    /// and input wiring.
    fn validate<'a>(
        &self,
        request: MultiGridRequest,
        lattice: Lattice,
        input: Option<&'a [i32]>,
        in_place: bool,
        available: usize,
    ) -> LayerResult<(usize, usize, Input<'a>)> {
        let (per_region, count) = request.validate()?;
        let regions = match lattice {
            Lattice::Strip => Some(count),
            Lattice::Square => count.checked_mul(count),
        };
        let required = regions.and_then(|regions| regions.checked_mul(per_region));

        let input = Input::resolve(self.layer, input, in_place)?;
        input.check_capacity(required)?;
        let total = check_capacity("output", required, available)?;

        // total fits in usize and per_region > 0, so both factors do too
        let per_region = per_region as usize;
        Ok((per_region, total / per_region, input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridDriver;
    use crate::layer::RiverInit;

    #[test]
    fn test_strip_matches_single_grids() {
        let layer = RiverInit::layer();
        let multi = MultiGridDriver::new(&layer, 77);
        let single = GridDriver::new(&layer, 77);
        let request = MultiGridRequest::new(-10, 20, 3, 5, 4);

        let mut batch = vec![1; 4 * 9];
        multi.multi_grid(request, &mut batch).unwrap();

        for (i, chunk) in batch.chunks(9).enumerate() {
            let mut expected = vec![1; 9];
            single
                .grid(Region::square(-10 + 5 * i as i32, 20, 3), &mut expected)
                .unwrap();
            assert_eq!(chunk, expected.as_slice(), "region {i}");
        }
    }

    #[test]
    fn test_zero_count_is_noop() {
        let layer = RiverInit::layer();
        let driver = MultiGridDriver::new(&layer, 1);

        let mut empty: Vec<i32> = Vec::new();
        driver
            .multi_grid(MultiGridRequest::new(0, 0, 4, 4, 0), &mut empty)
            .unwrap();
    }

    #[test]
    fn test_invalid_arguments() {
        let layer = RiverInit::layer();
        let driver = MultiGridDriver::new(&layer, 1);
        let mut cells = vec![0; 64];

        let err = driver
            .multi_grid(MultiGridRequest::new(0, 0, 0, 4, 1), &mut cells)
            .unwrap_err();
        assert!(matches!(err, LayerError::InvalidArgument { parameter: "size", .. }));

        let err = driver
            .multi_grid(MultiGridRequest::new(0, 0, 4, 4, -1), &mut cells)
            .unwrap_err();
        assert!(matches!(err, LayerError::InvalidArgument { parameter: "count", .. }));
    }

    #[test]
    fn test_capacity() {
        let layer = RiverInit::layer();
        let driver = MultiGridDriver::new(&layer, 1);
        let request = MultiGridRequest::new(0, 0, 4, 4, 3);

        let mut short = vec![1; 47];
        assert_eq!(
            driver.multi_grid(request, &mut short),
            Err(LayerError::InsufficientCapacity {
                buffer: "output",
                required: 48,
                available: 47,
            })
        );
        assert!(short.iter().all(|&v| v == 1));

        let mut exact = vec![1; 48];
        assert!(driver.multi_grid(request, &mut exact).is_ok());
    }

    #[test]
    fn test_overflowing_request() {
        let layer = RiverInit::layer();
        let driver = MultiGridDriver::new(&layer, 1);
        let mut cells = vec![0; 16];

        let err = driver
            .multi_grid_square(MultiGridRequest::new(0, 0, i32::MAX, 1, i32::MAX), &mut cells)
            .unwrap_err();
        assert_eq!(err, LayerError::CapacityOverflow { buffer: "output" });
    }

    #[test]
    fn test_square_lattice_order() {
        let layer = RiverInit::layer();
        let multi = MultiGridDriver::new(&layer, 31);
        let single = GridDriver::new(&layer, 31);
        let request = MultiGridRequest::new(0, 0, 2, 8, 3);

        let mut batch = vec![1; 9 * 4];
        multi.multi_grid_square(request, &mut batch).unwrap();

        for gx in 0..3 {
            for gz in 0..3 {
                let index = (gx * 3 + gz) as usize;
                let mut expected = vec![1; 4];
                single
                    .grid(Region::square(gx * 8, gz * 8, 2), &mut expected)
                    .unwrap();
                assert_eq!(&batch[index * 4..index * 4 + 4], expected.as_slice());
            }
        }
    }

    #[test]
    fn test_missing_input() {
        let layer = RiverInit::layer();
        let driver = MultiGridDriver::new(&layer, 1);
        let mut output = vec![0; 16];

        let err = driver
            .multi_grid_from(MultiGridRequest::new(0, 0, 2, 2, 4), None, &mut output)
            .unwrap_err();
        assert_eq!(
            err,
            LayerError::MissingInput {
                expected: 1,
                provided: 0,
            }
        );
    }

    #[test]
    fn test_region_offsets_wrap() {
        let request = MultiGridRequest::new(i32::MAX - 1, 0, 2, 2, 2);
        assert_eq!(request.strip_region(1).origin_x, i32::MIN);
    }
}
