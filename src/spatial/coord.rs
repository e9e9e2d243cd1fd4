//! Integer coordinates and the six axis directions

use std::fmt;
use std::ops::{Add, Neg};

/// Signed integer position or offset in a 3D grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Coord3 {
    /// X component
    pub x: i32,
    /// Y component (up)
    pub y: i32,
    /// Z component
    pub z: i32,
}

impl Coord3 {
    /// Origin
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Create a coordinate from its components
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Coordinate of an in-grid cell index
    pub const fn from_index(index: [usize; 3]) -> Self {
        Self::new(index[0] as i32, index[1] as i32, index[2] as i32)
    }

    /// Convert to a cell index when inside `extent`
    pub const fn to_index(self, extent: [usize; 3]) -> Option<[usize; 3]> {
        if self.x < 0 || self.y < 0 || self.z < 0 {
            return None;
        }
        let index = [self.x as usize, self.y as usize, self.z as usize];
        if index[0] < extent[0] && index[1] < extent[1] && index[2] < extent[2] {
            Some(index)
        } else {
            None
        }
    }

    /// Wrap each component into `extent` toroidally
    ///
    /// Every component of `extent` must be non-zero.
    pub const fn wrap(self, extent: [usize; 3]) -> [usize; 3] {
        [
            self.x.rem_euclid(extent[0] as i32) as usize,
            self.y.rem_euclid(extent[1] as i32) as usize,
            self.z.rem_euclid(extent[2] as i32) as usize,
        ]
    }

    /// Multiply every component by `factor`
    pub const fn scale(self, factor: i32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl Add for Coord3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Neg for Coord3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Coord3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// One of the six axis-aligned unit steps
///
/// The discriminant doubles as the adjacency table column for the lattice model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// +X
    Right = 0,
    /// -X
    Left = 1,
    /// +Y
    Up = 2,
    /// -Y
    Down = 3,
    /// +Z
    Forward = 4,
    /// -Z
    Back = 5,
}

impl Direction {
    /// All directions in table order
    pub const ALL: [Self; 6] = [
        Self::Right,
        Self::Left,
        Self::Up,
        Self::Down,
        Self::Forward,
        Self::Back,
    ];

    /// Unit offset of this direction
    pub const fn offset(self) -> Coord3 {
        match self {
            Self::Right => Coord3::new(1, 0, 0),
            Self::Left => Coord3::new(-1, 0, 0),
            Self::Up => Coord3::new(0, 1, 0),
            Self::Down => Coord3::new(0, -1, 0),
            Self::Forward => Coord3::new(0, 0, 1),
            Self::Back => Coord3::new(0, 0, -1),
        }
    }

    /// The direction pointing the other way
    pub const fn opposite(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Forward => Self::Back,
            Self::Back => Self::Forward,
        }
    }

    /// Axis this direction moves along (0 = x, 1 = y, 2 = z)
    pub const fn axis(self) -> usize {
        match self {
            Self::Right | Self::Left => 0,
            Self::Up | Self::Down => 1,
            Self::Forward | Self::Back => 2,
        }
    }

    /// Whether this direction moves towards larger coordinates
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Right | Self::Up | Self::Forward)
    }

    /// Column of this direction in an axis adjacency table
    pub const fn index(self) -> usize {
        self as usize
    }
}
