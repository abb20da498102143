// Geometry primitives shared by the mapper, the group extractor and the
// hierarchy store.
//
// Coordinates are diagram units (f64), origin top-left, y grows downwards.
// Everything that sits on the canvas implements `Placed`, so bounding boxes
// and gap normalization work over elements, simplified cells and test
// fixtures alike.

use serde::{Deserialize, Deserializer, Serialize};

mod gap;

pub use gap::normalize_gap;

/// NaN is written as `null` by serde_json, so `null` reads back as NaN.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    #[serde(deserialize_with = "coord_or_nan")]
    pub x: f64,
    #[serde(deserialize_with = "coord_or_nan")]
    pub y: f64,
}

fn coord_or_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `origin` to `self`.
    pub fn offset_from(&self, origin: Point) -> Vector {
        Vector { dx: self.x - origin.x, dy: self.y - origin.y }
    }

    pub fn translate(&self, v: Vector) -> Point {
        Point { x: self.x + v.dx, y: self.y + v.dy }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };

    pub fn from_parts(position: Point, size: Size) -> Self {
        Self { x: position.x, y: position.y, width: size.width, height: size.height }
    }

    pub fn right(&self) -> f64 { self.x + self.width }
    pub fn bottom(&self) -> f64 { self.y + self.height }

    pub fn origin(&self) -> Point {
        Point { x: self.x, y: self.y }
    }

    pub fn size(&self) -> Size {
        Size { width: self.width, height: self.height }
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect { x: x0, y: y0, width: x1 - x0, height: y1 - y0 }
    }

    /// Grow by `padding` on every side.
    pub fn inflate(&self, padding: f64) -> Rect {
        Rect {
            x: self.x - padding,
            y: self.y - padding,
            width: self.width + 2.0 * padding,
            height: self.height + 2.0 * padding,
        }
    }
}

/// Anything with a top-left position and a size on the canvas.
pub trait Placed {
    fn position(&self) -> Point;
    fn size(&self) -> Size;
    fn set_position(&mut self, position: Point);

    fn bounds(&self) -> Rect {
        Rect::from_parts(self.position(), self.size())
    }
}

impl Placed for Rect {
    fn position(&self) -> Point { self.origin() }
    fn size(&self) -> Size { Rect::size(self) }
    fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }
}

impl<T: Placed + ?Sized> Placed for &mut T {
    fn position(&self) -> Point { (**self).position() }
    fn size(&self) -> Size { (**self).size() }
    fn set_position(&mut self, position: Point) { (**self).set_position(position) }
}

/// Axis-aligned box around `items`, grown by `padding`.
///
/// An empty slice yields `Rect::ZERO` (no padding applied): there is nothing
/// to enclose, and callers treat a zero box as "no geometry".
pub fn bounding_box<T: Placed>(items: &[T], padding: f64) -> Rect {
    let mut iter = items.iter().map(Placed::bounds);
    let Some(first) = iter.next() else {
        return Rect::ZERO;
    };
    iter.fold(first, |acc, r| acc.union(&r)).inflate(padding)
}
