//! Router port directions.
//!
//! Every router has five ports. The declaration order of [`Direction`] is the
//! fixed order the round-robin arbiters cycle through.

/// A router port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North,
    East,
    South,
    West,
    /// The local port towards this node's compute tile
    Here,
}

impl Direction {
    /// All five ports in arbitration order.
    pub const ALL: [Self; 5] = [Self::North, Self::East, Self::South, Self::West, Self::Here];

    /// The four neighbor-facing ports.
    pub const NEIGHBORS: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Position of this port in arbitration order (0..5).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Port at `index` in arbitration order.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::North),
            1 => Some(Self::East),
            2 => Some(Self::South),
            3 => Some(Self::West),
            4 => Some(Self::Here),
            _ => None,
        }
    }

    /// The port on the far side of a link leaving through `self`.
    ///
    /// A word leaving East arrives at the neighbor's West port.
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
            Self::Here => Self::Here,
        }
    }

    /// North or South.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::North | Self::South)
    }

    /// Anything but the local port.
    pub const fn is_neighbor(self) -> bool {
        !matches!(self, Self::Here)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::North => "N",
            Self::East => "E",
            Self::South => "S",
            Self::West => "W",
            Self::Here => "H",
        };
        f.write_str(s)
    }
}

/// A set of ports, stored as a 5-bit mask indexed by [`Direction::index`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectionSet(u8);

impl DirectionSet {
    const MASK: u8 = 0b1_1111;

    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every port.
    pub const fn all() -> Self {
        Self(Self::MASK)
    }

    /// A set holding exactly one port.
    pub const fn single(dir: Direction) -> Self {
        Self(1 << dir.index())
    }

    /// Build from a raw bitmask; bits above the five ports are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    /// The raw bitmask.
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn insert(&mut self, dir: Direction) {
        self.0 |= 1 << dir.index();
    }

    pub fn remove(&mut self, dir: Direction) {
        self.0 &= !(1 << dir.index());
    }

    /// Copy of the set without `dir`.
    #[must_use]
    pub const fn without(self, dir: Direction) -> Self {
        Self(self.0 & !(1 << dir.index()))
    }

    pub const fn contains(self, dir: Direction) -> bool {
        self.0 & (1 << dir.index()) != 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn is_subset(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// Members in arbitration order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = Self::empty();
        for dir in iter {
            set.insert(dir);
        }
        set
    }
}

impl std::fmt::Debug for DirectionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
