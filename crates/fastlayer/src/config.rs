//! # Engine Configuration
//!
//! Execution settings for the grid drivers, loaded once at host startup
//! from a TOML file:
//!
//! ```toml
//! [driver]
//! parallel = true
//! parallel_min_cells = 65536
//! ```
//!
//! Configuration only changes *how* cells are scheduled, never their values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LayerError, LayerResult};

/// How a driver schedules cell evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Evaluate rows / sub-regions on the rayon thread pool.
    pub parallel: bool,
    /// Calls covering fewer cells than this always run on the caller's thread.
    pub parallel_min_cells: usize,
}

impl DriverConfig {
    /// Default threshold for parallel evaluation.
    pub const DEFAULT_PARALLEL_MIN_CELLS: usize = 16_384;

    /// Single-threaded evaluation.
    #[must_use]
    pub const fn sequential() -> Self {
        Self {
            parallel: false,
            parallel_min_cells: Self::DEFAULT_PARALLEL_MIN_CELLS,
        }
    }

    /// Parallel evaluation above the default threshold.
    #[must_use]
    pub const fn parallel() -> Self {
        Self {
            parallel: true,
            parallel_min_cells: Self::DEFAULT_PARALLEL_MIN_CELLS,
        }
    }

    /// Sets the parallel threshold.
    #[must_use]
    pub const fn with_min_cells(mut self, cells: usize) -> Self {
        self.parallel_min_cells = cells;
        self
    }

    /// Returns true if a call covering `cells` cells should run in parallel.
    #[inline]
    #[must_use]
    pub const fn use_parallel(&self, cells: usize) -> bool {
        self.parallel && cells >= self.parallel_min_cells
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::sequential()
    }
}

/// Top-level engine configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Driver scheduling.
    pub driver: DriverConfig,
}

impl EngineConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidConfig`] if the text is not valid TOML,
    /// does not match the schema, or fails [`EngineConfig::validate`].
    pub fn from_toml_str(text: &str) -> LayerResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| LayerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidConfig`] if the file cannot be read or
    /// parsed.
    pub fn load(path: impl AsRef<Path>) -> LayerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LayerError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded engine config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Serializes this configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> LayerResult<String> {
        toml::to_string(self).map_err(|e| LayerError::InvalidConfig(e.to_string()))
    }

    /// Checks the configuration for values the drivers cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidConfig`] if `parallel_min_cells` is zero.
    pub fn validate(&self) -> LayerResult<()> {
        if self.driver.parallel_min_cells == 0 {
            return Err(LayerError::InvalidConfig(
                "driver.parallel_min_cells must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
