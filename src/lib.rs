//! Generate large grids of discrete labels (texture tiles or voxel
//! building blocks) that locally resemble a small example, using
//! arc-consistency propagation over an adjacency model and block-wise
//! synthesis with randomized retry.
//!
//! The engine consumes a normalized [`Settings`] description (adjacency
//! relation, label weights, grid and block extents) produced by an input
//! stage, and returns the finished grid plus a per-block report; parsing
//! examples and serializing output are left to the caller.

pub mod coord;
pub mod direction;
mod ac3;
mod ac4;
mod model;
mod propagator;
mod settings;
mod synthesizer;

pub use ac3::Ac3;
pub use ac4::Ac4;
pub use model::{ConstraintModel, Label, LabelTable};
pub use propagator::{BlockBounds, Contradiction, Propagator};
pub use settings::{Algorithm, Settings, SettingsError};
pub use synthesizer::{synthesize, BlockReport, Synthesis, Synthesizer, NUM_ATTEMPTS};
