//! Mesh coordinates.
//!
//! A node position is an `(x, y)` pair supplied externally to each router.
//! `x` grows East, `y` grows South.

use crate::{Direction, Error, Result};

/// A node position in the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    /// Column, growing East
    pub x: u16,
    /// Row, growing South
    pub y: u16,
}

impl Coord {
    /// Origin of the mesh (North-West corner).
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a new coordinate.
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Manhattan distance, the hop count of a dimension-order route.
    pub fn manhattan(&self, other: &Self) -> u32 {
        u32::from(self.x.abs_diff(other.x)) + u32::from(self.y.abs_diff(other.y))
    }

    /// The coordinate one hop away in `dir`.
    ///
    /// Returns `None` for `Here` and when the step would leave the
    /// representable coordinate range.
    pub fn step(&self, dir: Direction) -> Option<Self> {
        match dir {
            Direction::North => self.y.checked_sub(1).map(|y| Self { y, ..*self }),
            Direction::South => self.y.checked_add(1).map(|y| Self { y, ..*self }),
            Direction::East => self.x.checked_add(1).map(|x| Self { x, ..*self }),
            Direction::West => self.x.checked_sub(1).map(|x| Self { x, ..*self }),
            Direction::Here => None,
        }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Dimensions of a rectangular mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshShape {
    pub width: u16,
    pub height: u16,
}

impl MeshShape {
    /// Create a mesh shape, rejecting empty dimensions.
    pub fn new(width: u16, height: u16) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyMesh { width, height });
        }
        Ok(Self { width, height })
    }

    /// Number of nodes in the mesh.
    pub fn len(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// A validated shape always has at least one node.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the coordinate lies inside the mesh.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// The neighbor of `coord` in `dir`, if it exists inside the mesh.
    pub fn neighbor(&self, coord: Coord, dir: Direction) -> Option<Coord> {
        coord.step(dir).filter(|c| self.contains(*c))
    }

    /// Row-major index of a coordinate.
    pub fn index_of(&self, coord: Coord) -> Result<usize> {
        if !self.contains(coord) {
            return Err(Error::OutOfBounds {
                coord,
                width: self.width,
                height: self.height,
            });
        }
        Ok(usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x))
    }

    /// Coordinate at a row-major index.
    pub fn coord_at(&self, index: usize) -> Option<Coord> {
        if index >= self.len() {
            return None;
        }
        let width = usize::from(self.width);
        // Both fit in u16: index < width * height.
        Some(Coord::new((index % width) as u16, (index / width) as u16))
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.len()).filter_map(move |i| self.coord_at(i))
    }
}
