use crate::ac3::Ac3;
use crate::ac4::Ac4;
use crate::coord::{Axis, Coord3, Size3, AXES};
use crate::direction::{Direction, DirectionTable, Directions};
use crate::model::{ConstraintModel, Label};
use crate::propagator::{BlockBounds, Contradiction, Propagator};
use crate::settings::{Algorithm, Settings, SettingsError};
use ndarray::{s, Array3};
use rand::Rng;

/// Retry budget per block before its previous contents are restored.
pub const NUM_ATTEMPTS: u32 = 20;

/// Outcome of synthesizing one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockReport {
    /// Grid coordinate of the block's footprint origin.
    pub start: Coord3,
    pub attempts: u32,
    pub success: bool,
}

/// A completed run: the label grid and one report per block. Failed
/// blocks keep the values they held before their first attempt.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub grid: Array3<Label>,
    pub blocks: Vec<BlockReport>,
}

impl Synthesis {
    pub fn all_succeeded(&self) -> bool {
        self.blocks.iter().all(|block| block.success)
    }
}

/// Validate the settings, build the constraint model and synthesize a
/// grid with the selected propagation algorithm.
pub fn synthesize<R: Rng>(settings: &Settings, rng: &mut R) -> Result<Synthesis, SettingsError> {
    let settings = settings.normalized();
    settings.validate()?;
    let model = ConstraintModel::new(&settings);
    let bounds = BlockBounds::new(settings.grid_size, settings.block_size, settings.periodic);
    let synthesis = match settings.algorithm {
        Algorithm::Ac3 => Synthesizer::new(&settings, Ac3::new(&model, bounds)).run(rng),
        Algorithm::Ac4 => Synthesizer::new(&settings, Ac4::new(&model, bounds)).run(rng),
    };
    Ok(synthesis)
}

/// How blocks step along one axis: consecutive blocks are offset by half
/// the block extent (at least one cell), and the final step is clamped
/// to the end of the grid.
#[derive(Debug, Clone, Copy)]
struct AxisSteps {
    shift: u32,
    num_steps: u32,
    max_start: u32,
}

impl AxisSteps {
    fn new(size: u32, block: u32) -> Self {
        let shift = (block / 2).max(1);
        let max_start = size - block;
        let num_steps = if max_start == 0 {
            1
        } else {
            (max_start + shift - 1) / shift + 1
        };
        Self {
            shift,
            num_steps,
            max_start,
        }
    }

    /// Start coordinate for a step, plus whether the block has a
    /// committed neighbour on its negative/positive side.
    fn start(&self, step: u32) -> (i32, bool, bool) {
        let raw = step * self.shift;
        let negative = step > 0;
        if raw >= self.max_start {
            (self.max_start as i32, negative, false)
        } else {
            (raw as i32, negative, true)
        }
    }
}

/// Owns the output grid and drives one propagator over it block by
/// block, in raster order. Each block attempt resets the propagator,
/// injects boundary and ground constraints, then assigns interior cells
/// one at a time; contradictions retry the block up to [`NUM_ATTEMPTS`]
/// times before its saved contents are restored.
pub struct Synthesizer<'a, P> {
    settings: &'a Settings,
    propagator: P,
    grid: Array3<Label>,
    saved_block: Array3<Label>,
    offset: Coord3,
}

impl<'a, P: Propagator> Synthesizer<'a, P> {
    /// `settings` must be normalized and validated; `propagator` must be
    /// built over `BlockBounds` for the same geometry.
    pub fn new(settings: &'a Settings, propagator: P) -> Self {
        let mut offset = Coord3::default();
        for axis in AXES {
            if settings.block_size.get(axis) < settings.grid_size.get(axis) {
                offset.set(axis, 1);
            }
        }
        Self {
            settings,
            propagator,
            grid: Array3::from_elem(settings.grid_size.to_dim(), 0),
            saved_block: Array3::from_elem(settings.block_size.to_dim(), 0),
            offset,
        }
    }

    pub fn run<R: Rng>(mut self, rng: &mut R) -> Synthesis {
        self.seed_initial_labels();
        let steps_x = AxisSteps::new(self.settings.grid_size.x(), self.settings.block_size.x());
        let steps_y = AxisSteps::new(self.settings.grid_size.y(), self.settings.block_size.y());
        let steps_z = AxisSteps::new(self.settings.grid_size.z(), self.settings.block_size.z());
        let mut blocks = Vec::new();
        for step_x in 0..steps_x.num_steps {
            let (x, x_neg, x_pos) = steps_x.start(step_x);
            for step_y in 0..steps_y.num_steps {
                let (y, y_neg, y_pos) = steps_y.start(step_y);
                for step_z in 0..steps_z.num_steps {
                    let (z, z_neg, z_pos) = steps_z.start(step_z);
                    let start = Coord3::new(x, y, z);
                    let mut boundaries = DirectionTable::new_array([
                        x_neg, x_pos, y_neg, y_pos, z_neg, z_pos,
                    ]);
                    if self.settings.grid_size.z() > 1 {
                        // top and bottom are always constrained, to force
                        // a ground plane to emerge
                        *boundaries.get_mut(Direction::ZNeg) = true;
                        *boundaries.get_mut(Direction::ZPos) = true;
                    }
                    blocks.push(self.synthesize_block(start, &boundaries, rng));
                }
            }
        }
        Synthesis {
            grid: self.grid,
            blocks,
        }
    }

    /// Every cell starts at its layer's initial label; the seed must be
    /// a valid model for boundary injection to be satisfiable.
    fn seed_initial_labels(&mut self) {
        for (layer, &label) in self.settings.initial_labels.iter().enumerate() {
            self.grid.slice_mut(s![.., .., layer]).fill(label);
        }
    }

    fn synthesize_block<R: Rng>(
        &mut self,
        start: Coord3,
        boundaries: &DirectionTable<bool>,
        rng: &mut R,
    ) -> BlockReport {
        self.save_block(start);
        let mut attempts = 0;
        let mut success = false;
        while !success && attempts < NUM_ATTEMPTS {
            success = self.attempt_block(start, boundaries, rng).is_ok();
            attempts += 1;
        }
        if !success {
            self.restore_block(start);
        }
        BlockReport {
            start,
            attempts,
            success,
        }
    }

    fn attempt_block<R: Rng>(
        &mut self,
        start: Coord3,
        boundaries: &DirectionTable<bool>,
        rng: &mut R,
    ) -> Result<(), Contradiction> {
        self.propagator.reset();
        for direction in Directions {
            if *boundaries.get(direction) {
                self.add_boundary(start, direction)?;
            }
        }
        if let Some(ground) = self.settings.ground {
            self.add_ground(start, ground)?;
        }
        if self.settings.algorithm == Algorithm::Ac4 {
            // AC-3 removes these labels during propagation; AC-4's
            // counters never fire for labels with no support at all
            self.remove_unsupported(start)?;
        }
        self.assign_cells(start, rng)
    }

    /// Commit the already-finalized grid values along one side of the
    /// block. On the negative side the constraint lands in the halo cell
    /// outside the footprint; on the positive side it pins the block's
    /// own last plane, keeping the unsynthesized region beyond
    /// consistent.
    fn add_boundary(
        &mut self,
        start: Coord3,
        direction: Direction,
    ) -> Result<(), Contradiction> {
        let axis = direction.axis();
        let block = self.settings.block_size.get(axis) as i32;
        let offset = self.offset.get(axis);
        let mut plane = if direction.is_positive() {
            block + offset - 1
        } else {
            0
        };
        if !direction.is_positive() && start.get(axis) - offset < 0 {
            // no committed neighbour below a forced vertical boundary;
            // the grid's own bottom layer stands in
            plane = offset;
        }
        let (a1, a2) = axis.others();
        for i in self.axis_interior(a1) {
            for j in self.axis_interior(a2) {
                let mut local = Coord3::default();
                local.set(axis, plane);
                local.set(a1, i);
                local.set(a2, j);
                let cell = self.local_to_grid(start, local);
                let label = self.grid[cell.to_index()];
                self.propagator.commit(local, label)?;
            }
        }
        Ok(())
    }

    /// Anchor the ground plane: in blocks reaching the bottom row of the
    /// grid (y grows downward), the bottom row is committed to the
    /// ground label and the label is excluded from the rest of the
    /// block's base plane.
    fn add_ground(&mut self, start: Coord3, ground: Label) -> Result<(), Contradiction> {
        let block_y = self.settings.block_size.y() as i32;
        if start.y + block_y != self.settings.grid_size.y() as i32 {
            return Ok(());
        }
        let bottom = block_y + self.offset.y - 1;
        let layer = self.offset.z;
        for x in self.axis_interior(Axis::X) {
            for y in self.axis_interior(Axis::Y) {
                let local = Coord3::new(x, y, layer);
                if y == bottom {
                    self.propagator.commit(local, ground)?;
                } else {
                    self.propagator.exclude(local, ground)?;
                }
            }
        }
        Ok(())
    }

    /// Exclude labels whose support count is zero in some direction from
    /// every cell not sitting on the matching outer edge of the grid;
    /// such labels can only legally exist on the model's boundary.
    fn remove_unsupported(&mut self, start: Coord3) -> Result<(), Contradiction> {
        let num_directions = 2 * self.settings.num_dims() as usize;
        let mut zero_support = Vec::new();
        {
            let model = self.propagator.model();
            for label in 0..model.num_labels() as Label {
                for &direction in &Direction::ALL[..num_directions] {
                    if *model.support_counts(label).get(direction) == 0 {
                        zero_support.push((label, direction));
                    }
                }
            }
        }
        for (label, direction) in zero_support {
            let axis = direction.axis();
            let edge = if direction.is_positive() {
                self.settings.grid_size.get(axis) as i32 - 1
            } else {
                0
            };
            for local in interior_of(self.settings.block_size, self.offset) {
                let cell = self.local_to_grid(start, local);
                if cell.get(axis) == edge {
                    continue;
                }
                self.propagator.exclude(local, label)?;
            }
        }
        Ok(())
    }

    /// Visit every interior cell in raster order, sample a label from
    /// the surviving possibilities and commit it. An empty possibility
    /// set aborts the attempt immediately.
    fn assign_cells<R: Rng>(&mut self, start: Coord3, rng: &mut R) -> Result<(), Contradiction> {
        for local in interior_of(self.settings.block_size, self.offset) {
            let label = self.propagator.pick_label(local, rng).ok_or(Contradiction)?;
            self.propagator.commit(local, label)?;
            let cell = self.local_to_grid(start, local);
            self.grid[cell.to_index()] = label;
        }
        Ok(())
    }

    fn save_block(&mut self, start: Coord3) {
        let [x, y, z] = start.to_index();
        let (bx, by, bz) = self.settings.block_size.to_dim();
        self.saved_block
            .assign(&self.grid.slice(s![x..x + bx, y..y + by, z..z + bz]));
    }

    fn restore_block(&mut self, start: Coord3) {
        let [x, y, z] = start.to_index();
        let (bx, by, bz) = self.settings.block_size.to_dim();
        self.grid
            .slice_mut(s![x..x + bx, y..y + by, z..z + bz])
            .assign(&self.saved_block);
    }

    fn axis_interior(&self, axis: Axis) -> std::ops::Range<i32> {
        let offset = self.offset.get(axis);
        offset..self.settings.block_size.get(axis) as i32 + offset
    }

    fn local_to_grid(&self, start: Coord3, local: Coord3) -> Coord3 {
        local + start - self.offset
    }
}

/// Block-local coordinates of the interior cells, in raster order.
fn interior_of(block: Size3, offset: Coord3) -> impl Iterator<Item = Coord3> {
    block.coords().map(move |coord| coord + offset)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn undecomposed_axis_is_a_single_step() {
        let steps = AxisSteps::new(8, 8);
        assert_eq!(steps.num_steps, 1);
        assert_eq!(steps.start(0), (0, false, false));
    }

    #[test]
    fn steps_shift_by_half_the_block_and_clamp() {
        let steps = AxisSteps::new(10, 4);
        assert_eq!(steps.shift, 2);
        assert_eq!(steps.max_start, 6);
        assert_eq!(steps.num_steps, 4);
        assert_eq!(steps.start(0), (0, false, true));
        assert_eq!(steps.start(1), (2, true, true));
        assert_eq!(steps.start(2), (4, true, true));
        assert_eq!(steps.start(3), (6, true, false));
    }

    #[test]
    fn final_step_lands_exactly_on_the_grid_end() {
        let steps = AxisSteps::new(9, 4);
        assert_eq!(steps.num_steps, 4);
        assert_eq!(steps.start(3), (5, true, false));
    }

    #[test]
    fn single_cell_blocks_shift_by_one() {
        let steps = AxisSteps::new(3, 1);
        assert_eq!(steps.shift, 1);
        assert_eq!(steps.num_steps, 3);
    }
}
