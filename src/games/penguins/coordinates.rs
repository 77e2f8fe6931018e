//! Hex-grid arithmetic: direction vectors and the two coordinate systems.
//!
//! The board is stored as a dense grid addressed by *array* coordinates.
//! Vector math only works in *double-hex* coordinates, where a step to the
//! left/right neighbor moves x by 2 and a diagonal step moves both axes by 1.
//! Odd rows are shifted half a hex to the right:
//!
//! ```text
//! array (x, y)  ->  double-hex (2x + (y odd), y)
//! ```

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::GameError;

/// The six unit directions in double-hex space.
///
/// Ordered so that `DIRECTIONS[i]` and `DIRECTIONS[(i + 3) % 6]` are opposite.
pub const DIRECTIONS: [Vector; 6] = [
    Vector::new(1, -1),  // up right
    Vector::new(-2, 0),  // left
    Vector::new(1, 1),   // down right
    Vector::new(-1, 1),  // down left
    Vector::new(2, 0),   // right
    Vector::new(-1, -1), // up left
];

/// A displacement in double-hex space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vector {
    pub dx: i32,
    pub dy: i32,
}

impl Vector {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Euclidean length of the raw (dx, dy) pair.
    pub fn length(&self) -> f64 {
        f64::from(self.dx).hypot(f64::from(self.dy))
    }

    pub fn scale(&self, scalar: i32) -> Vector {
        Vector::new(self.dx * scalar, self.dy * scalar)
    }

    pub fn plus(&self, other: Vector) -> Vector {
        Vector::new(self.dx + other.dx, self.dy + other.dy)
    }

    pub fn minus(&self, other: Vector) -> Vector {
        Vector::new(self.dx - other.dx, self.dy - other.dy)
    }

    /// True for a single step along one of the six hex axes, or a pure
    /// horizontal displacement.
    pub fn is_one_hex_move(&self) -> bool {
        self.dx.abs() == self.dy.abs() || (self.dx % 2 == 0 && self.dy == 0)
    }

    /// Reinterpret the vector as a double-hex position.
    pub fn to_coordinates(&self) -> Coordinates {
        Coordinates::double_hex(self.dx, self.dy)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        self.plus(rhs)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        self.minus(rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self.scale(-1)
    }
}

impl Mul<i32> for Vector {
    type Output = Vector;

    fn mul(self, rhs: i32) -> Vector {
        self.scale(rhs)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector({}, {})", self.dx, self.dy)
    }
}

/// A board position tagged with the representation it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
    pub is_double: bool,
}

/// Horizontal shift of odd rows in double-hex space.
#[inline]
fn row_offset(y: i32) -> i32 {
    if y.rem_euclid(2) == 1 {
        1
    } else {
        0
    }
}

impl Coordinates {
    pub const fn new(x: i32, y: i32, is_double: bool) -> Self {
        Self { x, y, is_double }
    }

    /// Dense grid index (column `x`, row `y`).
    pub const fn array(x: i32, y: i32) -> Self {
        Self::new(x, y, false)
    }

    pub const fn double_hex(x: i32, y: i32) -> Self {
        Self::new(x, y, true)
    }

    /// Same hex in double-hex form; no-op if already double-hex.
    pub fn to_double_hex(&self) -> Coordinates {
        if self.is_double {
            *self
        } else {
            Coordinates::double_hex(self.x * 2 + row_offset(self.y), self.y)
        }
    }

    /// Same hex in array form; no-op if already array.
    pub fn to_array(&self) -> Coordinates {
        if self.is_double {
            Coordinates::array((self.x - row_offset(self.y)).div_euclid(2), self.y)
        } else {
            *self
        }
    }

    /// The position as a vector from the double-hex origin.
    pub fn to_vector(&self) -> Vector {
        let d = self.to_double_hex();
        Vector::new(d.x, d.y)
    }

    /// Shift by `vector` in double-hex space, keeping the receiver's representation.
    pub fn add_vector(&self, vector: Vector) -> Coordinates {
        self.keep_representation(self.to_vector().plus(vector).to_coordinates())
    }

    /// Shift by `-vector` in double-hex space, keeping the receiver's representation.
    pub fn minus_vector(&self, vector: Vector) -> Coordinates {
        self.keep_representation(self.to_vector().minus(vector).to_coordinates())
    }

    /// Displacement from `other` to `self`.
    pub fn distance(&self, other: &Coordinates) -> Vector {
        self.to_vector().minus(other.to_vector())
    }

    fn keep_representation(&self, result: Coordinates) -> Coordinates {
        if self.is_double {
            result
        } else {
            result.to_array()
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { x, y, is_double } = self;
        write!(f, "Coordinates[{x}, {y}], Double: {is_double}")
    }
}

/// Parse `"x,y"` as double-hex coordinates.
impl FromStr for Coordinates {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((x, y)) = s.split_once(',') else {
            return Err(GameError::InvalidInput(format!("expected x,y: {s:?}")));
        };
        let parse = |part: &str| match part.trim().parse::<i32>() {
            Ok(n) => Ok(n),
            Err(_) => Err(GameError::InvalidInput(format!("bad coordinate: {part:?}"))),
        };
        Ok(Coordinates::double_hex(parse(x)?, parse(y)?))
    }
}
