//! Connector geometry.
//!
//! Pure functions over axis-aligned rectangles. Nothing here reads the
//! store; callers pass in the two rectangles a connector joins.

use serde::{Deserialize, Serialize};

/// Upper bound for how far a curve control point sits from its anchor
pub const MAX_CONTROL_OFFSET: f64 = 100.0;

/// A point in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Rectangle representing position and size on canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    /// Create a new rectangle
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the right edge of the rectangle
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom edge of the rectangle
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if this rectangle contains a point
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// Cubic Bezier connector between two blocks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectorPath {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl ConnectorPath {
    /// SVG path data (`M ... C ...`) for this curve
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y
        )
    }
}

/// Point where the ray from `source`'s center toward `target`'s center
/// leaves `source`.
///
/// The edge is chosen by comparing `|dx| / width` with `|dy| / height`;
/// the crossing coordinate on that edge is interpolated along the ray.
/// Coincident centers yield the source center.
pub fn anchor_point(source: &Rectangle, target: &Rectangle) -> Point {
    let center = source.center();
    let other = target.center();
    let dx = other.x - center.x;
    let dy = other.y - center.y;

    if dx == 0.0 && dy == 0.0 {
        return center;
    }

    if axis_ratio(dx, source.width) > axis_ratio(dy, source.height) {
        // dx != 0 here: a zero delta never wins the comparison
        let edge_x = source.width / 2.0 * dx.signum();
        Point::new(center.x + edge_x, center.y + dy * edge_x / dx)
    } else {
        // dy != 0 here
        let edge_y = source.height / 2.0 * dy.signum();
        Point::new(center.x + dx * edge_y / dy, center.y + edge_y)
    }
}

fn axis_ratio(delta: f64, extent: f64) -> f64 {
    if delta == 0.0 {
        0.0
    } else if extent <= 0.0 {
        f64::INFINITY
    } else {
        delta.abs() / extent
    }
}

/// Control points for a curve from `start` to `end`.
///
/// Each control point is pushed away from its anchor along the dominant
/// axis by `min(distance / 3, MAX_CONTROL_OFFSET)`, so mostly-horizontal
/// connectors bow horizontally and mostly-vertical ones vertically.
pub fn control_points(start: Point, end: Point) -> (Point, Point) {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let offset = (start.distance_to(end) / 3.0).min(MAX_CONTROL_OFFSET);

    if dx.abs() >= dy.abs() {
        let step = offset * dx.signum();
        (
            Point::new(start.x + step, start.y),
            Point::new(end.x - step, end.y),
        )
    } else {
        let step = offset * dy.signum();
        (
            Point::new(start.x, start.y + step),
            Point::new(end.x, end.y - step),
        )
    }
}

/// Full connector from `source` to `target`
pub fn route(source: &Rectangle, target: &Rectangle) -> ConnectorPath {
    let start = anchor_point(source, target);
    let end = anchor_point(target, source);
    let (control1, control2) = control_points(start, end);

    ConnectorPath {
        start,
        control1,
        control2,
        end,
    }
}
