//! Merge ordering.
//!
//! Decides which inputs take part in a merge and in which order. Inputs that
//! do not exist are skipped and reported, never silently dropped.

use std::path::PathBuf;
use tracing::error;

use crate::error::{PdfinatorError, Result};
use crate::utils::collect_paths_for_patterns;

/// Ordered list of documents to concatenate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    /// Existing inputs, in merge order.
    pub inputs: Vec<PathBuf>,

    /// Inputs that were requested but not found.
    pub skipped: Vec<PathBuf>,
}

impl MergePlan {
    /// Minimum number of existing inputs for a merge.
    pub const MIN_INPUTS: usize = 2;

    /// Build a plan from explicit paths, keeping their order.
    ///
    /// Each missing input is logged at error level and recorded in
    /// [`MergePlan::skipped`].
    ///
    /// # Errors
    ///
    /// Returns [`PdfinatorError::NotEnoughInputs`] when fewer than two inputs
    /// exist.
    pub fn build(paths: &[PathBuf]) -> Result<Self> {
        let mut inputs = Vec::with_capacity(paths.len());
        let mut skipped = Vec::new();

        for path in paths {
            if path.is_file() {
                inputs.push(path.clone());
            } else {
                error!("Merge input not found, skipping: {}", path.display());
                skipped.push(path.clone());
            }
        }

        if inputs.len() < Self::MIN_INPUTS {
            return Err(PdfinatorError::NotEnoughInputs {
                found: inputs.len(),
            });
        }

        Ok(Self { inputs, skipped })
    }

    /// Build a plan from glob patterns, expanded in the order given.
    pub fn from_patterns<T>(patterns: T) -> Result<Self>
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let paths = collect_paths_for_patterns(patterns)?;
        Self::build(&paths)
    }

    /// Whether some requested inputs were skipped.
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }
}
