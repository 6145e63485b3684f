use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

pub const AXES: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

impl Axis {
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
    /// The two axes spanning the plane orthogonal to this one.
    pub fn others(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }
}

/// A cell position. Components are signed so positions may step outside
/// a grid before being bounds-checked or wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Coord3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coord3 {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
    pub fn get(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
    pub fn set(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
    }
    pub fn is_valid(self, size: Size3) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.z >= 0
            && (self.x as u32) < size.x()
            && (self.y as u32) < size.y()
            && (self.z as u32) < size.z()
    }
    /// Array index of a coordinate known to be in bounds.
    pub fn to_index(self) -> [usize; 3] {
        debug_assert!(self.x >= 0 && self.y >= 0 && self.z >= 0);
        [self.x as usize, self.y as usize, self.z as usize]
    }
}

impl Add for Coord3 {
    type Output = Coord3;
    fn add(self, rhs: Coord3) -> Self::Output {
        Coord3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Coord3 {
    type Output = Coord3;
    fn sub(self, rhs: Coord3) -> Self::Output {
        Coord3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Extents of a 3-D grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size3 {
    x: u32,
    y: u32,
    z: u32,
}

impl Size3 {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
    pub const fn x(self) -> u32 {
        self.x
    }
    pub const fn y(self) -> u32 {
        self.y
    }
    pub const fn z(self) -> u32 {
        self.z
    }
    pub fn get(self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
    pub fn set(&mut self, axis: Axis, value: u32) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
    }
    pub fn count(self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }
    pub fn to_dim(self) -> (usize, usize, usize) {
        (self.x as usize, self.y as usize, self.z as usize)
    }
    /// Iterate all coordinates in raster order, innermost axis last.
    pub fn coords(self) -> impl Iterator<Item = Coord3> {
        let (x, y, z) = (self.x as i32, self.y as i32, self.z as i32);
        (0..x).flat_map(move |cx| {
            (0..y).flat_map(move |cy| (0..z).map(move |cz| Coord3::new(cx, cy, cz)))
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn validity() {
        let size = Size3::new(4, 3, 2);
        assert!(Coord3::new(0, 0, 0).is_valid(size));
        assert!(Coord3::new(3, 2, 1).is_valid(size));
        assert!(!Coord3::new(4, 2, 1).is_valid(size));
        assert!(!Coord3::new(-1, 0, 0).is_valid(size));
    }

    #[test]
    fn axis_access() {
        let mut coord = Coord3::new(1, 2, 3);
        assert_eq!(coord.get(Axis::Y), 2);
        coord.set(Axis::Z, 7);
        assert_eq!(coord, Coord3::new(1, 2, 7));
        assert_eq!(Size3::new(4, 3, 2).get(Axis::X), 4);
    }

    #[test]
    fn raster_order() {
        let coords: Vec<_> = Size3::new(2, 1, 2).coords().collect();
        assert_eq!(
            coords,
            vec![
                Coord3::new(0, 0, 0),
                Coord3::new(0, 0, 1),
                Coord3::new(1, 0, 0),
                Coord3::new(1, 0, 1),
            ]
        );
    }
}
