#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Compass direction of a neighbor relative to the acting cell.
///
/// Variants are declared in clockwise ring order starting at north, so
/// `as usize` is the index into [`Direction::RING`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// North (row - 1).
    #[default]
    N,
    /// North-east.
    NE,
    /// East (col + 1).
    E,
    /// South-east.
    SE,
    /// South (row + 1).
    S,
    /// South-west.
    SW,
    /// West (col - 1).
    W,
    /// North-west.
    NW,
}

impl Direction {
    /// All eight directions, clockwise from north.
    pub const RING: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    /// The four cardinal directions, clockwise from north.
    pub const CARDINALS: [Direction; 4] = [Direction::N, Direction::E, Direction::S, Direction::W];

    /// Tags an offset `(drow, dcol)` by the signs of its components.
    ///
    /// Returns `None` for the zero offset. Longer offsets share the tag of
    /// the unit offset with the same signs.
    pub fn from_offset(offset: (i32, i32)) -> Option<Direction> {
        match (offset.0.signum(), offset.1.signum()) {
            (-1, 0) => Some(Direction::N),
            (-1, 1) => Some(Direction::NE),
            (0, 1) => Some(Direction::E),
            (1, 1) => Some(Direction::SE),
            (1, 0) => Some(Direction::S),
            (1, -1) => Some(Direction::SW),
            (0, -1) => Some(Direction::W),
            (-1, -1) => Some(Direction::NW),
            _ => None,
        }
    }

    /// Unit offset `(drow, dcol)` for this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::N => (-1, 0),
            Direction::NE => (-1, 1),
            Direction::E => (0, 1),
            Direction::SE => (1, 1),
            Direction::S => (1, 0),
            Direction::SW => (1, -1),
            Direction::W => (0, -1),
            Direction::NW => (-1, -1),
        }
    }

    /// Rotates clockwise by `steps` eighth-turns.
    pub fn rotate_cw(self, steps: usize) -> Direction {
        Self::RING[(self as usize + steps) % 8]
    }

    /// Rotates counter-clockwise by `steps` eighth-turns.
    pub fn rotate_ccw(self, steps: usize) -> Direction {
        self.rotate_cw(8 - steps % 8)
    }

    /// The opposite direction.
    pub fn opposite(self) -> Direction {
        self.rotate_cw(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_round_trips_through_tag() {
        for dir in Direction::RING {
            assert_eq!(Direction::from_offset(dir.offset()), Some(dir));
        }
        assert_eq!(Direction::from_offset((0, 0)), None);
    }

    #[test]
    fn test_long_offsets_share_tag() {
        assert_eq!(Direction::from_offset((-2, 1)), Some(Direction::NE));
        assert_eq!(Direction::from_offset((0, -3)), Some(Direction::W));
    }

    #[test]
    fn test_rotation() {
        assert_eq!(Direction::N.rotate_cw(2), Direction::E);
        assert_eq!(Direction::NW.rotate_cw(1), Direction::N);
        assert_eq!(Direction::SE.opposite(), Direction::NW);
        assert_eq!(Direction::N.rotate_ccw(2), Direction::W);
        assert_eq!(Direction::E.rotate_ccw(8), Direction::E);
        assert_eq!(Direction::NE.rotate_ccw(11), Direction::W);
    }
}
