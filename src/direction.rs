use crate::coord::{Axis, Coord3};

pub const NUM_DIRECTIONS: usize = 6;

/// One of the six axis-aligned oriented directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    XNeg = 0,
    XPos,
    YNeg,
    YPos,
    ZNeg,
    ZPos,
}

use self::Direction::*;

impl Direction {
    pub const ALL: [Direction; NUM_DIRECTIONS] = [XNeg, XPos, YNeg, YPos, ZNeg, ZPos];

    pub const fn opposite(self) -> Self {
        match self {
            XNeg => XPos,
            XPos => XNeg,
            YNeg => YPos,
            YPos => YNeg,
            ZNeg => ZPos,
            ZPos => ZNeg,
        }
    }
    pub const fn axis(self) -> Axis {
        match self {
            XNeg | XPos => Axis::X,
            YNeg | YPos => Axis::Y,
            ZNeg | ZPos => Axis::Z,
        }
    }
    pub const fn is_positive(self) -> bool {
        match self {
            XPos | YPos | ZPos => true,
            XNeg | YNeg | ZNeg => false,
        }
    }
    /// Unit offset of this direction.
    pub const fn coord(self) -> Coord3 {
        match self {
            XNeg => Coord3::new(-1, 0, 0),
            XPos => Coord3::new(1, 0, 0),
            YNeg => Coord3::new(0, -1, 0),
            YPos => Coord3::new(0, 1, 0),
            ZNeg => Coord3::new(0, 0, -1),
            ZPos => Coord3::new(0, 0, 1),
        }
    }
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Iterable over all six directions, in index order.
#[derive(Debug, Clone, Copy)]
pub struct Directions;

impl IntoIterator for Directions {
    type Item = Direction;
    type IntoIter = std::array::IntoIter<Direction, NUM_DIRECTIONS>;
    fn into_iter(self) -> Self::IntoIter {
        Direction::ALL.into_iter()
    }
}

/// Direction-indexed storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectionTable<T> {
    values: [T; NUM_DIRECTIONS],
}

impl<T> DirectionTable<T> {
    pub const fn new_array(values: [T; NUM_DIRECTIONS]) -> Self {
        Self { values }
    }
    pub fn get(&self, direction: Direction) -> &T {
        &self.values[direction.index()]
    }
    pub fn get_mut(&mut self, direction: Direction) -> &mut T {
        &mut self.values[direction.index()]
    }
    pub fn iter(&self) -> std::slice::Iter<T> {
        self.values.iter()
    }
    pub fn enumerate(&self) -> impl Iterator<Item = (Direction, &T)> {
        Direction::ALL.iter().copied().zip(self.values.iter())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn opposites() {
        for direction in Directions {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_eq!(direction.opposite().axis(), direction.axis());
            assert_ne!(direction.opposite().is_positive(), direction.is_positive());
            assert_eq!(
                direction.coord() + direction.opposite().coord(),
                Coord3::default()
            );
        }
    }

    #[test]
    fn table_indexing() {
        let mut table = DirectionTable::<u32>::default();
        *table.get_mut(Direction::YPos) = 5;
        assert_eq!(*table.get(Direction::YPos), 5);
        assert_eq!(*table.get(Direction::YNeg), 0);
        assert_eq!(table.iter().sum::<u32>(), 5);
    }
}
