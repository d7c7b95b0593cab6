use crate::Vec3;

/// One of the six cardinal directions. Discriminants are the stable `[0..6)` indices
/// used for neighbour links and the 6x6 visibility matrix.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Direction {
    Up = 0,
    Down = 1,
    North = 2,
    South = 3,
    West = 4,
    East = 5,
}

impl Direction {
    pub const COUNT: usize = 6;

    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Down,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Converts a `[0..6)` index back into a direction.
    #[inline]
    pub const fn from_index(i: usize) -> Option<Direction> {
        match i {
            0 => Some(Direction::Up),
            1 => Some(Direction::Down),
            2 => Some(Direction::North),
            3 => Some(Direction::South),
            4 => Some(Direction::West),
            5 => Some(Direction::East),
            _ => None,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    /// Integer grid delta `(dx, dy, dz)` when stepping out through this direction.
    #[inline]
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Direction::Up => (0, 1, 0),
            Direction::Down => (0, -1, 0),
            Direction::North => (0, 0, -1),
            Direction::South => (0, 0, 1),
            Direction::West => (-1, 0, 0),
            Direction::East => (1, 0, 0),
        }
    }

    #[inline]
    pub fn unit_vector(self) -> Vec3 {
        let (x, y, z) = self.offset();
        Vec3::new(x as f32, y as f32, z as f32)
    }

    /// Single-bit mask `1 << index`, used for face sets.
    #[inline]
    pub const fn bit(self) -> u8 {
        1 << self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_roundtrip() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_index(d.index()), Some(d));
        }
        assert_eq!(Direction::from_index(6), None);
    }

    #[test]
    fn opposite_offsets_cancel() {
        for d in Direction::ALL {
            let (ax, ay, az) = d.offset();
            let (bx, by, bz) = d.opposite().offset();
            assert_eq!((ax + bx, ay + by, az + bz), (0, 0, 0));
            assert_ne!(d, d.opposite());
        }
    }
}
