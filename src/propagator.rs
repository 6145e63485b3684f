use crate::coord::{Axis, Coord3, Size3, AXES};
use crate::direction::Direction;
use crate::model::{ConstraintModel, Label};
use ndarray::{Array3, Array4};
use rand::Rng;

/// A cell's possibility set became empty; the current block attempt is
/// infeasible and must be abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contradiction;

/// The capability set shared by the AC-3 and AC-4 variants. Callers
/// depend only on this contract; the variants are interchangeable
/// implementations of the same consistency relation.
pub trait Propagator {
    fn model(&self) -> &ConstraintModel;

    /// Reinitialize every cell to "every label possible".
    fn reset(&mut self);

    fn is_possible(&self, position: Coord3, label: Label) -> bool;

    /// Collapse a cell to exactly one label and propagate the
    /// consequences to a fixpoint. Fails the instant any cell's
    /// possibility set becomes empty.
    fn commit(&mut self, position: Coord3, label: Label) -> Result<(), Contradiction>;

    /// Remove one label from a cell's possibility set and propagate.
    /// Removing an already-impossible label is a no-op success.
    fn exclude(&mut self, position: Coord3, label: Label) -> Result<(), Contradiction>;

    /// Sample one of the labels still possible at a cell, each with
    /// probability proportional to its weight. `None` if the possibility
    /// set is empty or every possible label has zero weight.
    fn pick_label<R: Rng>(&self, position: Coord3, rng: &mut R) -> Option<Label>
    where
        Self: Sized,
    {
        let model = self.model();
        let num_labels = model.num_labels() as Label;
        let mut sum_weight = 0.0f32;
        for label in 0..num_labels {
            if self.is_possible(position, label) {
                sum_weight += model.weight(label);
            }
        }
        if sum_weight <= 0.0 {
            return None;
        }
        let mut remaining = rng.gen::<f32>() * sum_weight;
        let mut chosen = None;
        for label in 0..num_labels {
            if !self.is_possible(position, label) {
                continue;
            }
            let weight = model.weight(label);
            if weight <= 0.0 {
                continue;
            }
            chosen = Some(label);
            if remaining < weight {
                break;
            }
            remaining -= weight;
        }
        // rounding can leave a sliver of `remaining`; it lands on the
        // last weighted possible label
        chosen
    }
}

/// Outcome of removing a label from a cell's possibility set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Removal {
    AlreadyExcluded,
    Excluded,
    /// The removal emptied the cell's possibility set.
    ExcludedLast,
}

/// Per-cell boolean possibility flags for one block, plus a per-cell
/// count of surviving labels so emptiness is detected the instant it
/// happens. Flags are only ever narrowed between resets.
#[derive(Debug, Clone)]
pub(crate) struct PossibilityGrid {
    possible: Array4<bool>,
    num_possible: Array3<u32>,
    num_labels: usize,
}

impl PossibilityGrid {
    pub fn new(size: Size3, num_labels: usize) -> Self {
        let (x, y, z) = size.to_dim();
        Self {
            possible: Array4::from_elem((x, y, z, num_labels), true),
            num_possible: Array3::from_elem((x, y, z), num_labels as u32),
            num_labels,
        }
    }

    pub fn reset(&mut self) {
        self.possible.fill(true);
        self.num_possible.fill(self.num_labels as u32);
    }

    pub fn is_possible(&self, position: Coord3, label: Label) -> bool {
        let [x, y, z] = position.to_index();
        self.possible[[x, y, z, label as usize]]
    }

    pub fn remove(&mut self, position: Coord3, label: Label) -> Removal {
        let [x, y, z] = position.to_index();
        let flag = &mut self.possible[[x, y, z, label as usize]];
        if !*flag {
            return Removal::AlreadyExcluded;
        }
        *flag = false;
        let count = &mut self.num_possible[[x, y, z]];
        *count -= 1;
        if *count == 0 {
            Removal::ExcludedLast
        } else {
            Removal::Excluded
        }
    }
}

/// Geometry of one block's possibility space: extents (block plus a
/// one-cell halo on each decomposed axis), the per-axis halo offset, and
/// the stepping rules between neighbouring cells. The x and y axes wrap
/// when the output is periodic and the block spans the whole axis; the
/// z axis never wraps.
#[derive(Debug, Clone, Copy)]
pub struct BlockBounds {
    grid_size: Size3,
    possibility_size: Size3,
    offset: Coord3,
    periodic: bool,
}

impl BlockBounds {
    pub fn new(grid_size: Size3, block_size: Size3, periodic: bool) -> Self {
        let mut possibility_size = Size3::default();
        let mut offset = Coord3::default();
        for axis in AXES {
            let grid = grid_size.get(axis);
            let block = block_size.get(axis);
            if block < grid {
                // one halo cell on each side of a decomposed axis
                offset.set(axis, 1);
                possibility_size.set(axis, block + 2);
            } else {
                possibility_size.set(axis, grid);
            }
        }
        Self {
            grid_size,
            possibility_size,
            offset,
            periodic,
        }
    }

    pub fn possibility_size(&self) -> Size3 {
        self.possibility_size
    }

    pub fn offset(&self) -> Coord3 {
        self.offset
    }

    /// The cell propagation reaches by moving one step from `from` in
    /// `direction`, or `None` at the edge of the possibility space.
    /// Constraints flow out of halo cells but never back into them.
    pub fn step(&self, from: Coord3, direction: Direction) -> Option<Coord3> {
        let axis = direction.axis();
        let offset = self.offset.get(axis);
        let extent = self.possibility_size.get(axis) as i32;
        let wraps = self.periodic && axis != Axis::Z && offset == 0;
        if wraps {
            let mut to = from + direction.coord();
            let grid = self.grid_size.get(axis) as i32;
            let value = to.get(axis);
            if value < 0 {
                to.set(axis, value + grid);
            } else if value > extent - 1 {
                to.set(axis, value - grid);
            }
            return Some(to);
        }
        let value = from.get(axis);
        if direction.is_positive() {
            if value >= extent - offset - 1 {
                return None;
            }
        } else if value <= offset {
            return None;
        }
        Some(from + direction.coord())
    }
}
