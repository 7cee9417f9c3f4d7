//! Input sites: integer-coordinate points fed into the engine at
//! construction, plus the typed index used to refer to them.

use crate::geometry::Point;

/// Stable handle to an input site, analogous to the typed arena indices
/// used for beachline nodes (`NodeId`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SiteId(pub usize);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Site {
    pub x: i32,
    pub y: i32,
}

impl Site {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }
}
