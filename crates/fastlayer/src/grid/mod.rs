//! # Grid Evaluation
//!
//! Drivers that run a [`Layer`] over rectangular regions of world space.
//!
//! ## Buffer Layout
//!
//! A region of `size_x × size_z` cells is stored row-major: the cell at
//! offset `(dx, dz)` lives at index `dz * size_x + dx`. Batched calls
//! concatenate such grids back to back.
//!
//! ## Coordinate Arithmetic
//!
//! Absolute coordinates are `origin + offset` in `i32` with wrapping
//! overflow. A region straddling `i32::MAX` continues at `i32::MIN`, exactly
//! like the reference engine.
//!
//! ## Failure Model
//!
//! Arguments, input wiring and buffer capacity are all checked before the
//! first cell is written. Evaluation itself cannot fail.

pub mod driver;
pub mod multi;

pub use driver::GridDriver;
pub use multi::{MultiGridDriver, MultiGridRequest};

use rayon::prelude::*;

use crate::error::{LayerError, LayerResult};
use crate::layer::Layer;
use crate::rng::CellRng;

/// A rectangular region of cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    /// X coordinate of the first cell.
    pub origin_x: i32,
    /// Z coordinate of the first cell.
    pub origin_z: i32,
    /// Width in cells.
    pub size_x: i32,
    /// Depth in cells.
    pub size_z: i32,
}

impl Region {
    /// Creates a region.
    #[inline]
    #[must_use]
    pub const fn new(origin_x: i32, origin_z: i32, size_x: i32, size_z: i32) -> Self {
        Self {
            origin_x,
            origin_z,
            size_x,
            size_z,
        }
    }

    /// Creates a square region.
    #[inline]
    #[must_use]
    pub const fn square(origin_x: i32, origin_z: i32, size: i32) -> Self {
        Self::new(origin_x, origin_z, size, size)
    }

    /// Returns the number of cells, checking both extents are positive.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidArgument`] if either extent is not
    /// positive.
    pub fn cell_count(&self) -> LayerResult<u64> {
        let size_x = positive("size_x", self.size_x)?;
        let size_z = positive("size_z", self.size_z)?;
        size_x
            .checked_mul(size_z)
            .ok_or(LayerError::CapacityOverflow { buffer: "output" })
    }

    /// Returns the buffer index of absolute cell `(x, z)`, if it lies inside.
    #[must_use]
    pub fn index_of(&self, x: i32, z: i32) -> Option<usize> {
        let dx = x.wrapping_sub(self.origin_x);
        let dz = z.wrapping_sub(self.origin_z);
        if (0..self.size_x).contains(&dx) && (0..self.size_z).contains(&dz) {
            Some(dz as usize * self.size_x as usize + dx as usize)
        } else {
            None
        }
    }
}

/// Checks a size parameter and widens it.
pub(crate) fn positive(parameter: &'static str, value: i32) -> LayerResult<u64> {
    if value > 0 {
        Ok(value as u64)
    } else {
        Err(LayerError::InvalidArgument {
            parameter,
            value: i64::from(value),
            requirement: "must be positive",
        })
    }
}

/// Checks that a buffer of `available` cells can hold `required` cells.
///
/// `None` means the size computation overflowed.
pub(crate) fn check_capacity(
    buffer: &'static str,
    required: Option<u64>,
    available: usize,
) -> LayerResult<usize> {
    let required = required.ok_or(LayerError::CapacityOverflow { buffer })?;
    if required > available as u64 {
        return Err(LayerError::InsufficientCapacity {
            buffer,
            required,
            available,
        });
    }
    // required <= available, so it fits
    Ok(required as usize)
}

/// Where a layer's single input grid comes from.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Input<'a> {
    /// The layer reads no input.
    Empty,
    /// The output buffer holds the input on entry.
    InPlace,
    /// A separate, read-only grid with the output's layout.
    Grid(&'a [i32]),
}

impl<'a> Input<'a> {
    /// Resolves the input wiring for `layer`.
    ///
    /// `supplied` is the separate grid, if any; `in_place` says whether the
    /// output buffer may serve as input.
    pub(crate) fn resolve<L: Layer + ?Sized>(
        layer: &L,
        supplied: Option<&'a [i32]>,
        in_place: bool,
    ) -> LayerResult<Self> {
        match (layer.input_count(), supplied) {
            (0, _) => Ok(Self::Empty),
            (1, Some(grid)) => Ok(Self::Grid(grid)),
            (1, None) if in_place => Ok(Self::InPlace),
            (expected, supplied) => Err(LayerError::MissingInput {
                expected,
                provided: usize::from(supplied.is_some() || in_place),
            }),
        }
    }

    /// Checks a separate input grid against the required cell count.
    pub(crate) fn check_capacity(&self, required: Option<u64>) -> LayerResult<()> {
        if let Self::Grid(grid) = self {
            check_capacity("input", required, grid.len())?;
        }
        Ok(())
    }

    /// Narrows this input to `len` cells starting at `offset`.
    #[inline]
    pub(crate) fn slice(self, offset: usize, len: usize) -> Self {
        match self {
            Self::Grid(grid) => Self::Grid(&grid[offset..offset + len]),
            other => other,
        }
    }
}

/// Evaluates one row of cells starting at absolute `(x, z)`.
#[inline]
fn eval_row<L: Layer + ?Sized>(
    layer: &L,
    rng: &mut CellRng,
    x: i32,
    z: i32,
    input: Input<'_>,
    row: &mut [i32],
) {
    for (dx, cell) in row.iter_mut().enumerate() {
        rng.reseed(x.wrapping_add(dx as i32), z);
        *cell = match input {
            Input::Empty => layer.evaluate(rng, &[]),
            Input::InPlace => layer.evaluate(rng, &[*cell]),
            Input::Grid(grid) => layer.evaluate(rng, &[grid[dx]]),
        };
    }
}

/// Evaluates a validated region into `output`.
///
/// `output` (and a separate input grid) must hold exactly
/// `size_x * size_z` cells. Rows are independent, so with `parallel` they
/// are spread over the rayon pool; the result is identical either way.
pub(crate) fn eval_region<L: Layer + ?Sized>(
    layer: &L,
    seed: i64,
    region: Region,
    input: Input<'_>,
    output: &mut [i32],
    parallel: bool,
) {
    let width = region.size_x as usize;
    let row_task = |(dz, row): (usize, &mut [i32])| {
        let z = region.origin_z.wrapping_add(dz as i32);
        let mut rng = CellRng::new(seed, region.origin_x, z);
        eval_row(
            layer,
            &mut rng,
            region.origin_x,
            z,
            input.slice(dz * width, width),
            row,
        );
    };

    if parallel {
        output.par_chunks_mut(width).enumerate().for_each(row_task);
    } else {
        output.chunks_mut(width).enumerate().for_each(row_task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::RiverInit;

    /// Generator layer used to exercise the no-input path.
    struct Noise;

    impl Layer for Noise {
        fn input_count(&self) -> usize {
            0
        }

        fn evaluate(&self, rng: &mut CellRng, inputs: &[i32]) -> i32 {
            assert!(inputs.is_empty());
            rng.next_bounded::<100>()
        }
    }

    #[test]
    fn test_cell_count() {
        assert_eq!(Region::new(0, 0, 4, 4).cell_count(), Ok(16));
        assert_eq!(
            Region::new(0, 0, 1 << 20, 1 << 20).cell_count(),
            Ok(1 << 40)
        );
        assert!(matches!(
            Region::new(0, 0, 0, 4).cell_count(),
            Err(LayerError::InvalidArgument { parameter: "size_x", .. })
        ));
        assert!(matches!(
            Region::new(0, 0, 4, -1).cell_count(),
            Err(LayerError::InvalidArgument { parameter: "size_z", value: -1, .. })
        ));
    }

    #[test]
    fn test_index_of() {
        let region = Region::new(-2, 10, 4, 3);
        assert_eq!(region.index_of(-2, 10), Some(0));
        assert_eq!(region.index_of(1, 10), Some(3));
        assert_eq!(region.index_of(-1, 12), Some(9));
        assert_eq!(region.index_of(2, 10), None);
        assert_eq!(region.index_of(-2, 9), None);
    }

    #[test]
    fn test_check_capacity() {
        assert_eq!(check_capacity("output", Some(16), 16), Ok(16));
        assert_eq!(
            check_capacity("output", Some(16), 15),
            Err(LayerError::InsufficientCapacity {
                buffer: "output",
                required: 16,
                available: 15,
            })
        );
        assert_eq!(
            check_capacity("input", None, usize::MAX),
            Err(LayerError::CapacityOverflow { buffer: "input" })
        );
    }

    #[test]
    fn test_input_resolution() {
        let river = RiverInit::layer();
        let grid = [1, 2, 3];

        assert!(matches!(Input::resolve(&river, Some(&grid[..]), false), Ok(Input::Grid(_))));
        assert!(matches!(Input::resolve(&river, None, true), Ok(Input::InPlace)));
        assert_eq!(
            Input::resolve(&river, None, false).unwrap_err(),
            LayerError::MissingInput {
                expected: 1,
                provided: 0,
            }
        );
        assert!(matches!(Input::resolve(&Noise, None, false), Ok(Input::Empty)));
    }

    #[test]
    fn test_eval_region_without_input() {
        let region = Region::new(5, 5, 3, 2);
        let mut output = [-1; 6];
        eval_region(&Noise, 9, region, Input::Empty, &mut output, false);

        for (i, &value) in output.iter().enumerate() {
            let x = 5 + (i % 3) as i32;
            let z = 5 + (i / 3) as i32;
            let mut rng = CellRng::new(9, x, z);
            assert_eq!(value, rng.next_bounded::<100>(), "cell ({x}, {z})");
        }
    }

    #[test]
    fn test_eval_region_wraps_coordinates() {
        let region = Region::new(i32::MAX, 0, 2, 1);
        let mut output = [0; 2];
        eval_region(&Noise, 3, region, Input::Empty, &mut output, false);

        let mut rng = CellRng::new(3, i32::MIN, 0);
        assert_eq!(output[1], rng.next_bounded::<100>());
    }
}
