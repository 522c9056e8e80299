use crate::foundation::core::{Canvas, Point};

/// Maps math space (origin at the canvas center, y up) to device space (origin top-left, y down).
///
/// Built from the canvas of the frame being drawn, so a resize between frames is picked up on
/// the next frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateSpace {
    canvas: Canvas,
}

impl CoordinateSpace {
    /// Coordinate space for `canvas`.
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas }
    }

    /// Canvas this space maps onto.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Project a math-space point into device pixels: `translate(w/2, h/2) * scale * flip_y`.
    pub fn to_device(&self, p: Point, scale: f64) -> Point {
        Point::new(
            self.canvas.width_f64() / 2.0 + p.x * scale,
            self.canvas.height_f64() / 2.0 - p.y * scale,
        )
    }

    /// Math-space x of the left canvas edge at scale 1.
    pub fn left(&self) -> f64 {
        -self.canvas.width_f64() / 2.0
    }

    /// Math-space x of the right canvas edge at scale 1.
    pub fn right(&self) -> f64 {
        self.canvas.width_f64() / 2.0
    }

    /// Math-space y of the bottom canvas edge at scale 1.
    pub fn bottom(&self) -> f64 {
        -self.canvas.height_f64() / 2.0
    }

    /// Math-space y of the top canvas edge at scale 1.
    pub fn top(&self) -> f64 {
        self.canvas.height_f64() / 2.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/coords.rs"]
mod tests;
