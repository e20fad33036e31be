use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, delta: Delta) -> Self {
        Self {
            x: self.x + delta.dx,
            y: self.y + delta.dy,
        }
    }

    /// Delta that moves `origin` onto `self`.
    pub fn delta_from(self, origin: Point) -> Delta {
        Delta {
            dx: self.x - origin.x,
            dy: self.y - origin.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Delta {
    pub dx: f64,
    pub dy: f64,
}

impl Delta {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Bounds `(x, y)` so an item of size `item` stays inside `viewport`.
///
/// The upper bound is `max(viewport - item, 0)`, so a viewport smaller than
/// the item pins it to the origin. NaN coordinates collapse to 0.
pub fn clamp(x: f64, y: f64, viewport: Size, item: Size) -> (f64, f64) {
    (
        clamp_axis(x, viewport.width, item.width),
        clamp_axis(y, viewport.height, item.height),
    )
}

pub fn clamp_point(point: Point, viewport: Size, item: Size) -> Point {
    let (x, y) = clamp(point.x, point.y, viewport, item);
    Point { x, y }
}

fn clamp_axis(value: f64, extent: f64, footprint: f64) -> f64 {
    let upper = (extent - footprint).max(0.0);
    // f64::max ignores NaN, so a NaN value lands on the lower bound.
    value.max(0.0).min(upper)
}
