use crate::coord::{Size3, AXES};
use crate::model::Label;
use ndarray::Array3;
use thiserror::Error;

/// Which arc-consistency algorithm drives propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Revision-based: re-derive support by scanning the transition
    /// relation. No auxiliary state.
    Ac3,
    /// Support-counting: per-cell counters updated incrementally.
    Ac4,
}

/// Normalized synthesis specification, as produced by an input stage.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Extents of the output grid. The z extent is floored to 1.
    pub grid_size: Size3,
    /// Extents of the blocks the grid is decomposed into. Zero components
    /// default to the grid extent; all components are clamped to it.
    pub block_size: Size3,
    /// Whether the x and y axes wrap. The z axis never wraps.
    pub periodic: bool,
    pub algorithm: Algorithm,
    /// Selection weight per label. Non-negative; at least one positive.
    pub weights: Vec<f32>,
    /// Adjacency relation, shape `(3, num_labels, num_labels)`:
    /// `transition[[axis, a, b]]` means label `a` may be immediately
    /// followed by label `b` along the positive direction of `axis`.
    pub transition: Array3<bool>,
    /// Label seeding each z layer of the grid before synthesis. Must
    /// describe a valid model on its own.
    pub initial_labels: Vec<Label>,
    /// Label forced onto the bottom row to anchor a ground plane.
    pub ground: Option<Label>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("grid extents must be positive, got {x}x{y}")]
    EmptyGrid { x: u32, y: u32 },
    #[error("at least one label is required")]
    NoLabels,
    #[error("expected one weight per label ({expected}), got {found}")]
    WeightCount { expected: usize, found: usize },
    #[error("weight of label {label} must be finite and non-negative")]
    InvalidWeight { label: Label },
    #[error("at least one label must have positive weight")]
    NoPositiveWeight,
    #[error("transition relation must have shape (3, {labels}, {labels}), got {found:?}")]
    TransitionShape { labels: usize, found: (usize, usize, usize) },
    #[error("expected one initial label per layer ({expected}), got {found}")]
    InitialLabelCount { expected: usize, found: usize },
    #[error("initial label {label} out of range for {labels} labels")]
    InitialLabelOutOfRange { label: Label, labels: usize },
    #[error("ground label {label} out of range for {labels} labels")]
    GroundOutOfRange { label: Label, labels: usize },
}

impl Settings {
    pub fn num_labels(&self) -> usize {
        self.weights.len()
    }

    /// Number of constrained dimensions: 2 for single-layer grids.
    pub fn num_dims(&self) -> u32 {
        if self.grid_size.z() > 1 {
            3
        } else {
            2
        }
    }

    /// Floor the z extent to one layer and resolve the block extents
    /// against the grid.
    pub fn normalized(&self) -> Self {
        let mut settings = self.clone();
        let mut grid_size = settings.grid_size;
        grid_size.set(crate::coord::Axis::Z, grid_size.z().max(1));
        let mut block_size = settings.block_size;
        for axis in AXES {
            let grid = grid_size.get(axis);
            let block = block_size.get(axis);
            let block = if block == 0 { grid } else { block.min(grid) };
            block_size.set(axis, block);
        }
        settings.grid_size = grid_size;
        settings.block_size = block_size;
        settings
    }

    /// Fail fast on configuration defects before any grid state exists.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let grid = self.grid_size;
        if grid.x() == 0 || grid.y() == 0 {
            return Err(SettingsError::EmptyGrid {
                x: grid.x(),
                y: grid.y(),
            });
        }
        let labels = self.num_labels();
        if labels == 0 {
            return Err(SettingsError::NoLabels);
        }
        for (label, &weight) in self.weights.iter().enumerate() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(SettingsError::InvalidWeight {
                    label: label as Label,
                });
            }
        }
        if !self.weights.iter().any(|&weight| weight > 0.0) {
            return Err(SettingsError::NoPositiveWeight);
        }
        let found = self.transition.dim();
        if found != (3, labels, labels) {
            return Err(SettingsError::TransitionShape { labels, found });
        }
        let layers = grid.z() as usize;
        if self.initial_labels.len() != layers {
            return Err(SettingsError::InitialLabelCount {
                expected: layers,
                found: self.initial_labels.len(),
            });
        }
        if let Some(&label) = self
            .initial_labels
            .iter()
            .find(|&&label| label as usize >= labels)
        {
            return Err(SettingsError::InitialLabelOutOfRange { label, labels });
        }
        if let Some(label) = self.ground {
            if label as usize >= labels {
                return Err(SettingsError::GroundOutOfRange { label, labels });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coord::Size3;

    fn base() -> Settings {
        Settings {
            grid_size: Size3::new(4, 4, 0),
            block_size: Size3::new(0, 8, 2),
            periodic: false,
            algorithm: Algorithm::Ac4,
            weights: vec![1.0, 2.0],
            transition: Array3::from_elem((3, 2, 2), true),
            initial_labels: vec![0],
            ground: None,
        }
    }

    #[test]
    fn normalization_resolves_extents() {
        let settings = base().normalized();
        assert_eq!(settings.grid_size, Size3::new(4, 4, 1));
        // zero defaults to the grid extent, oversize clamps to it
        assert_eq!(settings.block_size, Size3::new(4, 4, 1));
    }

    #[test]
    fn validates_weights() {
        let mut settings = base().normalized();
        settings.weights = vec![1.0];
        assert_eq!(
            settings.validate(),
            Err(SettingsError::TransitionShape {
                labels: 1,
                found: (3, 2, 2)
            })
        );
        settings.weights = vec![0.0, -1.0];
        assert_eq!(
            settings.validate(),
            Err(SettingsError::InvalidWeight { label: 1 })
        );
        settings.weights = vec![0.0, 0.0];
        assert_eq!(settings.validate(), Err(SettingsError::NoPositiveWeight));
    }

    #[test]
    fn validates_label_ranges() {
        let mut settings = base().normalized();
        settings.ground = Some(2);
        assert_eq!(
            settings.validate(),
            Err(SettingsError::GroundOutOfRange {
                label: 2,
                labels: 2
            })
        );
        settings.ground = None;
        settings.initial_labels = vec![5];
        assert_eq!(
            settings.validate(),
            Err(SettingsError::InitialLabelOutOfRange {
                label: 5,
                labels: 2
            })
        );
    }

    #[test]
    fn accepts_valid_settings() {
        assert_eq!(base().normalized().validate(), Ok(()));
    }
}
