//! Stage clamp: keeps every sprite at least partly on stage.

use crate::types::Position;

/// Assumed sprite footprint in stage units.
pub const SPRITE_EXTENT: f64 = 100.0;
/// Minimum part of the footprint that must remain visible.
pub const VISIBLE_MARGIN: f64 = 20.0;

/// Measured stage size. A zero dimension means "not measured yet".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport { width, height }
    }

    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn clamp(&self, pos: Position) -> Position {
        if !self.is_measured() {
            return pos;
        }
        let min = VISIBLE_MARGIN - SPRITE_EXTENT;
        Position {
            x: clamp_axis(pos.x, min, self.width - VISIBLE_MARGIN),
            y: clamp_axis(pos.y, min, self.height - VISIBLE_MARGIN),
        }
    }
}

// `f64::clamp` panics when `max < min`, which a tiny stage can produce.
fn clamp_axis(v: f64, min: f64, max: f64) -> f64 {
    v.min(max).max(min)
}
