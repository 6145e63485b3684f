use crate::direction::{Direction, DirectionTable, Directions};
use crate::settings::Settings;
use ndarray::Array3;
use std::iter;
use std::ops::{Index, IndexMut};
use std::slice;

/// Identifies a tile/pattern/voxel type. Labels are dense in
/// `[0, num_labels)`.
pub type Label = u32;

/// Storage indexed by label.
#[derive(Default, Clone, Debug)]
pub struct LabelTable<T> {
    table: Vec<T>,
}

impl<T> LabelTable<T> {
    pub fn from_vec(table: Vec<T>) -> Self {
        Self { table }
    }
    pub fn len(&self) -> usize {
        self.table.len()
    }
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
    pub fn iter(&self) -> slice::Iter<T> {
        self.table.iter()
    }
    pub fn iter_mut(&mut self) -> slice::IterMut<T> {
        self.table.iter_mut()
    }
    pub fn enumerate(&self) -> impl Iterator<Item = (Label, &T)> {
        self.iter()
            .enumerate()
            .map(|(index, item)| (index as Label, item))
    }
}

impl<T> iter::FromIterator<T> for LabelTable<T> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self {
            table: Vec::from_iter(iter),
        }
    }
}

impl<T> Index<Label> for LabelTable<T> {
    type Output = T;
    fn index(&self, index: Label) -> &Self::Output {
        self.table.index(index as usize)
    }
}

impl<T> IndexMut<Label> for LabelTable<T> {
    fn index_mut(&mut self, index: Label) -> &mut Self::Output {
        self.table.index_mut(index as usize)
    }
}

/// The immutable constraint data shared by every propagator for the
/// lifetime of a synthesis run: the adjacency relation over labels, the
/// per-direction compatibility lists derived from it, the per-direction
/// support counts underlying AC-4, and the label selection weights.
#[derive(Debug, Clone)]
pub struct ConstraintModel {
    /// `adjacency[[axis, a, b]]`: `a` may be immediately followed by `b`
    /// along the positive direction of `axis`.
    adjacency: Array3<bool>,
    /// Labels permitted at the neighbour in each direction.
    compatible: LabelTable<DirectionTable<Vec<Label>>>,
    /// `support_counts[label][direction]` is the number of labels that,
    /// placed at the neighbour in that direction, validate `label`.
    support_counts: LabelTable<DirectionTable<u32>>,
    weights: LabelTable<f32>,
    sum_weight: f32,
}

impl ConstraintModel {
    /// Build the model from validated settings. Compatibility lists and
    /// support counts are derived from the transition relation once.
    pub fn new(settings: &Settings) -> Self {
        Self::from_parts(settings.transition.clone(), settings.weights.clone())
    }

    pub fn from_parts(adjacency: Array3<bool>, weights: Vec<f32>) -> Self {
        let num_labels = weights.len();
        assert_eq!(adjacency.dim(), (3, num_labels, num_labels));
        let compatible = (0..num_labels as Label)
            .map(|label| {
                let mut by_direction = DirectionTable::<Vec<Label>>::default();
                for direction in Directions {
                    let axis = direction.axis().index();
                    let list = (0..num_labels as Label)
                        .filter(|&other| {
                            let (a, b) = (label as usize, other as usize);
                            if direction.is_positive() {
                                adjacency[[axis, a, b]]
                            } else {
                                adjacency[[axis, b, a]]
                            }
                        })
                        .collect();
                    *by_direction.get_mut(direction) = list;
                }
                by_direction
            })
            .collect::<LabelTable<_>>();
        let support_counts = compatible
            .iter()
            .map(|by_direction| {
                let mut counts = DirectionTable::<u32>::default();
                for direction in Directions {
                    *counts.get_mut(direction) = by_direction.get(direction).len() as u32;
                }
                counts
            })
            .collect::<LabelTable<_>>();
        let sum_weight = weights.iter().sum();
        Self {
            adjacency,
            compatible,
            support_counts,
            weights: LabelTable::from_vec(weights),
            sum_weight,
        }
    }

    pub fn num_labels(&self) -> usize {
        self.weights.len()
    }
    pub fn weight(&self, label: Label) -> f32 {
        self.weights[label]
    }
    pub fn sum_weight(&self) -> f32 {
        self.sum_weight
    }
    /// Whether `b` is permitted at the neighbour of `a` in `direction`.
    pub fn allows(&self, a: Label, direction: Direction, b: Label) -> bool {
        let axis = direction.axis().index();
        if direction.is_positive() {
            self.adjacency[[axis, a as usize, b as usize]]
        } else {
            self.adjacency[[axis, b as usize, a as usize]]
        }
    }
    pub fn compatible_in_direction(&self, label: Label, direction: Direction) -> &[Label] {
        self.compatible[label].get(direction)
    }
    pub fn support_counts(&self, label: Label) -> &DirectionTable<u32> {
        &self.support_counts[label]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::direction::Direction;
    use ndarray::Array3;

    // 0 may be followed by 0 or 1 along x; only by itself elsewhere.
    fn chain_model() -> ConstraintModel {
        let mut adjacency = Array3::from_elem((3, 2, 2), false);
        adjacency[[0, 0, 0]] = true;
        adjacency[[0, 0, 1]] = true;
        adjacency[[0, 1, 1]] = true;
        adjacency[[1, 0, 0]] = true;
        adjacency[[1, 1, 1]] = true;
        adjacency[[2, 0, 0]] = true;
        adjacency[[2, 1, 1]] = true;
        ConstraintModel::from_parts(adjacency, vec![1.0, 3.0])
    }

    #[test]
    fn compatibility_lists_follow_orientation() {
        let model = chain_model();
        assert_eq!(model.compatible_in_direction(0, Direction::XPos), &[0, 1]);
        assert_eq!(model.compatible_in_direction(0, Direction::XNeg), &[0]);
        assert_eq!(model.compatible_in_direction(1, Direction::XNeg), &[0, 1]);
        assert_eq!(model.compatible_in_direction(1, Direction::XPos), &[1]);
        assert_eq!(model.compatible_in_direction(1, Direction::YPos), &[1]);
    }

    #[test]
    fn support_counts_match_list_lengths() {
        let model = chain_model();
        for (label, counts) in (0..2).map(|l| (l as Label, model.support_counts(l))) {
            for (direction, &count) in counts.enumerate() {
                assert_eq!(
                    count as usize,
                    model.compatible_in_direction(label, direction).len()
                );
            }
        }
    }

    #[test]
    fn allows_agrees_with_lists() {
        let model = chain_model();
        for direction in crate::direction::Directions {
            for a in 0..2 {
                for b in 0..2 {
                    let listed = model
                        .compatible_in_direction(a, direction)
                        .contains(&b);
                    assert_eq!(model.allows(a, direction, b), listed);
                }
            }
        }
    }
}
