//! Integer geometry in table coordinate space.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A location in table coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return this point moved by `offset`.
    pub fn translated(self, offset: Dimension) -> Self {
        Self::new(
            self.x.saturating_add(offset.width),
            self.y.saturating_add(offset.height),
        )
    }
}

impl Add<Dimension> for Point {
    type Output = Point;

    fn add(self, rhs: Dimension) -> Point {
        self.translated(rhs)
    }
}

impl Sub for Point {
    type Output = Dimension;

    /// Offset that moves `rhs` onto `self`.
    fn sub(self, rhs: Point) -> Dimension {
        Dimension::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A size, or an offset between two points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    pub width: i32,
    pub height: i32,
}

impl Dimension {
    pub const ZERO: Dimension = Dimension {
        width: 0,
        height: 0,
    };

    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_parts(location: Point, size: Dimension) -> Self {
        Self::new(location.x, location.y, size.width, size.height)
    }

    pub const fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn size(&self) -> Dimension {
        Dimension::new(self.width, self.height)
    }

    /// Smallest rectangle containing both rectangles.
    ///
    /// A zero-sized rectangle still contributes its origin. Extents that
    /// leave the `i32` range are clamped.
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rectangle::new(
            left,
            top,
            clamp_i32(right - i64::from(left)),
            clamp_i32(bottom - i64::from(top)),
        )
    }

    /// `true` when `point` lies inside; the right and bottom edges are exclusive.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && i64::from(point.x) < self.right()
            && i64::from(point.y) < self.bottom()
    }

    fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    pub fn translated(&self, offset: Dimension) -> Rectangle {
        Rectangle::from_parts(self.location() + offset, self.size())
    }
}

fn clamp_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}
