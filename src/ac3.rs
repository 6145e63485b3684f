use crate::coord::Coord3;
use crate::model::{ConstraintModel, Label};
use crate::propagator::{BlockBounds, Contradiction, PossibilityGrid, Propagator, Removal};
use crate::direction::{Direction, Directions};
use hashbrown::HashSet;
use std::collections::VecDeque;

/// Revision-based arc consistency. Each queued cell re-derives its
/// neighbours' possibilities by scanning the transition relation against
/// its own current possibility set: O(labels²) per direction per dequeued
/// cell, no auxiliary structures such as support counters.
pub struct Ac3<'a> {
    model: &'a ConstraintModel,
    bounds: BlockBounds,
    possibility: PossibilityGrid,
    queue: VecDeque<Coord3>,
    queued: HashSet<Coord3>,
}

impl<'a> Ac3<'a> {
    pub fn new(model: &'a ConstraintModel, bounds: BlockBounds) -> Self {
        let size = bounds.possibility_size();
        Self {
            model,
            bounds,
            possibility: PossibilityGrid::new(size, model.num_labels()),
            queue: VecDeque::with_capacity(size.count()),
            queued: HashSet::with_capacity(size.count()),
        }
    }

    fn enqueue(&mut self, position: Coord3) {
        if self.queued.insert(position) {
            self.queue.push_back(position);
        }
    }

    /// Breadth-first fixpoint: drain the queue, revising the neighbours
    /// of every cell whose possibility set changed.
    fn drain(&mut self) -> Result<(), Contradiction> {
        while let Some(position) = self.queue.pop_front() {
            self.queued.remove(&position);
            for direction in Directions {
                self.revise_neighbour(position, direction)?;
            }
        }
        Ok(())
    }

    /// Re-derive which labels survive at the neighbour of `position` in
    /// `direction`: a label survives only while some label still possible
    /// at `position` validates the adjacency.
    fn revise_neighbour(
        &mut self,
        position: Coord3,
        direction: Direction,
    ) -> Result<(), Contradiction> {
        let neighbour = match self.bounds.step(position, direction) {
            Some(neighbour) => neighbour,
            None => return Ok(()),
        };
        let model = self.model;
        let num_labels = model.num_labels() as Label;
        for label in 0..num_labels {
            if !self.possibility.is_possible(neighbour, label) {
                continue;
            }
            let supported = (0..num_labels).any(|near| {
                self.possibility.is_possible(position, near)
                    && model.allows(near, direction, label)
            });
            if supported {
                continue;
            }
            match self.possibility.remove(neighbour, label) {
                Removal::ExcludedLast => return Err(Contradiction),
                Removal::Excluded => self.enqueue(neighbour),
                Removal::AlreadyExcluded => unreachable!("label checked possible above"),
            }
        }
        Ok(())
    }
}

impl Propagator for Ac3<'_> {
    fn model(&self) -> &ConstraintModel {
        self.model
    }

    fn reset(&mut self) {
        self.possibility.reset();
        self.queue.clear();
        self.queued.clear();
    }

    fn is_possible(&self, position: Coord3, label: Label) -> bool {
        self.possibility.is_possible(position, label)
    }

    fn commit(&mut self, position: Coord3, label: Label) -> Result<(), Contradiction> {
        if !self.possibility.is_possible(position, label) {
            // collapsing to an excluded label would empty the cell;
            // labels are never revived
            return Err(Contradiction);
        }
        for other in 0..self.model.num_labels() as Label {
            if other != label {
                self.possibility.remove(position, other);
            }
        }
        self.enqueue(position);
        self.drain()
    }

    fn exclude(&mut self, position: Coord3, label: Label) -> Result<(), Contradiction> {
        match self.possibility.remove(position, label) {
            Removal::AlreadyExcluded => Ok(()),
            Removal::ExcludedLast => Err(Contradiction),
            Removal::Excluded => {
                self.enqueue(position);
                self.drain()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coord::Size3;
    use ndarray::Array3;

    // two labels that only ever neighbour themselves
    fn uniform_model() -> ConstraintModel {
        let mut adjacency = Array3::from_elem((3, 2, 2), false);
        for axis in 0..3 {
            adjacency[[axis, 0, 0]] = true;
            adjacency[[axis, 1, 1]] = true;
        }
        ConstraintModel::from_parts(adjacency, vec![1.0, 1.0])
    }

    fn line_bounds() -> BlockBounds {
        BlockBounds::new(Size3::new(4, 1, 1), Size3::new(4, 1, 1), false)
    }

    #[test]
    fn commit_cascades_along_the_line() {
        let model = uniform_model();
        let mut ac3 = Ac3::new(&model, line_bounds());
        ac3.reset();
        ac3.commit(Coord3::new(0, 0, 0), 1).unwrap();
        for x in 0..4 {
            assert!(ac3.is_possible(Coord3::new(x, 0, 0), 1));
            assert!(!ac3.is_possible(Coord3::new(x, 0, 0), 0));
        }
    }

    #[test]
    fn conflicting_commits_contradict() {
        let model = uniform_model();
        let mut ac3 = Ac3::new(&model, line_bounds());
        ac3.reset();
        ac3.commit(Coord3::new(0, 0, 0), 1).unwrap();
        assert_eq!(ac3.commit(Coord3::new(3, 0, 0), 0), Err(Contradiction));
    }

    #[test]
    fn exclusion_is_monotonic_and_idempotent() {
        let model = uniform_model();
        let mut ac3 = Ac3::new(&model, line_bounds());
        ac3.reset();
        let cell = Coord3::new(2, 0, 0);
        ac3.exclude(cell, 0).unwrap();
        assert!(!ac3.is_possible(cell, 0));
        // a second exclusion of the same label is a no-op success
        ac3.exclude(cell, 0).unwrap();
        // excluding label 0 at one cell starves it everywhere
        for x in 0..4 {
            assert!(!ac3.is_possible(Coord3::new(x, 0, 0), 0));
            assert!(ac3.is_possible(Coord3::new(x, 0, 0), 1));
        }
    }

    #[test]
    fn reset_restores_every_label() {
        let model = uniform_model();
        let mut ac3 = Ac3::new(&model, line_bounds());
        ac3.reset();
        ac3.commit(Coord3::new(0, 0, 0), 0).unwrap();
        ac3.reset();
        for x in 0..4 {
            for label in 0..2 {
                assert!(ac3.is_possible(Coord3::new(x, 0, 0), label));
            }
        }
    }
}
