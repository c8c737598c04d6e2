//! Direction, axis and light-face types.

use serde::{Deserialize, Serialize};

/// The six face directions.
///
/// North is -Z, south is +Z, west is -X and east is +X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Direction {
    /// All six directions in order.
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// The four horizontal directions.
    pub const HORIZONTAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Position in [`Direction::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Get the offset for this direction.
    pub fn offset(&self) -> (i32, i32, i32) {
        match self {
            Direction::Down => (0, -1, 0),
            Direction::Up => (0, 1, 0),
            Direction::North => (0, 0, -1),
            Direction::South => (0, 0, 1),
            Direction::West => (-1, 0, 0),
            Direction::East => (1, 0, 0),
        }
    }

    /// Get the normal vector for this direction.
    pub fn normal(&self) -> [f32; 3] {
        let (x, y, z) = self.offset();
        [x as f32, y as f32, z as f32]
    }

    /// Get the opposite direction.
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    /// Get the axis this direction is on.
    pub fn axis(&self) -> Axis {
        match self {
            Direction::Down | Direction::Up => Axis::Y,
            Direction::North | Direction::South => Axis::Z,
            Direction::West | Direction::East => Axis::X,
        }
    }

    /// Which light channel lights a face pointing this way.
    ///
    /// Faces along X read the north/south channel and faces along Z read the
    /// east/west channel, matching the world's legacy compass.
    pub fn light_face(&self) -> LightFace {
        match self.axis() {
            Axis::Y => LightFace::Top,
            Axis::X => LightFace::NorthSouth,
            Axis::Z => LightFace::EastWest,
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "down" | "bottom" => Some(Direction::Down),
            "up" | "top" => Some(Direction::Up),
            "north" => Some(Direction::North),
            "south" => Some(Direction::South),
            "west" => Some(Direction::West),
            "east" => Some(Direction::East),
            _ => None,
        }
    }

    /// Rotate around the X axis in 90-degree steps.
    /// Positive rotation goes Up -> North -> Down -> South.
    pub fn rotate_x(self, degrees: i32) -> Direction {
        let steps = ((degrees / 90) % 4 + 4) % 4;
        let mut dir = self;
        for _ in 0..steps {
            dir = match dir {
                Direction::Up => Direction::North,
                Direction::North => Direction::Down,
                Direction::Down => Direction::South,
                Direction::South => Direction::Up,
                other => other,
            };
        }
        dir
    }

    /// Rotate around the Y axis in 90-degree steps.
    /// Positive rotation goes North -> East -> South -> West.
    pub fn rotate_y(self, degrees: i32) -> Direction {
        let steps = ((degrees / 90) % 4 + 4) % 4;
        let mut dir = self;
        for _ in 0..steps {
            dir = match dir {
                Direction::North => Direction::East,
                Direction::East => Direction::South,
                Direction::South => Direction::West,
                Direction::West => Direction::North,
                other => other,
            };
        }
        dir
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::Down => "down",
            Direction::Up => "up",
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        };
        f.write_str(name)
    }
}

/// The three axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Get the unit vector for this axis.
    pub fn unit_vector(&self) -> [f32; 3] {
        match self {
            Axis::X => [1.0, 0.0, 0.0],
            Axis::Y => [0.0, 1.0, 0.0],
            Axis::Z => [0.0, 0.0, 1.0],
        }
    }
}

/// Light channel sampled for a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightFace {
    Top,
    NorthSouth,
    EastWest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let (x, y, z) = dir.offset();
            let (ox, oy, oz) = dir.opposite().offset();
            assert_eq!((x + ox, y + oy, z + oz), (0, 0, 0));
        }
    }

    #[test]
    fn test_light_faces() {
        assert_eq!(Direction::Up.light_face(), LightFace::Top);
        assert_eq!(Direction::Down.light_face(), LightFace::Top);
        assert_eq!(Direction::West.light_face(), LightFace::NorthSouth);
        assert_eq!(Direction::East.light_face(), LightFace::NorthSouth);
        assert_eq!(Direction::North.light_face(), LightFace::EastWest);
        assert_eq!(Direction::South.light_face(), LightFace::EastWest);
    }

    #[test]
    fn test_rotate_y_full_turn() {
        for dir in Direction::ALL {
            assert_eq!(dir.rotate_y(360), dir);
            assert_eq!(dir.rotate_y(-90).rotate_y(90), dir);
        }
        assert_eq!(Direction::North.rotate_y(90), Direction::East);
        assert_eq!(Direction::Up.rotate_x(90), Direction::North);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(Direction::from_str("NORTH"), Some(Direction::North));
        assert_eq!(Direction::from_str("bottom"), Some(Direction::Down));
        assert_eq!(Direction::from_str("sideways"), None);
    }
}
