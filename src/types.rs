//! Shared boundary types for the block sandbox.
//!
//! Two contracts live here:
//! - Engine → consumers: `SpriteView` and the session outputs it is built from
//! - Renderer → Player (in-memory): `DrawOp`s rasterized into `Cell`s

use serde::{Deserialize, Serialize};

use crate::program::source::SpriteId;

// ---------------------------------------------------------------------------
// Runtime outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

/// Looks state of a sprite. `size` is a percentage, `color` a hue offset in
/// degrees that is never wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Visual {
    pub visible: bool,
    pub size: f64,
    pub color: f64,
}

impl Default for Visual {
    fn default() -> Self {
        Visual {
            visible: true,
            size: 100.0,
            color: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BubbleKind {
    Say,
    Think,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bubble {
    pub kind: BubbleKind,
    pub message: String,
}

/// Everything a renderer needs to draw one sprite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpriteView {
    pub id: SpriteId,
    pub position: Position,
    pub angle: f64,
    pub visual: Visual,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bubble: Option<Bubble>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapAnnouncement {
    pub left_name: String,
    pub right_name: String,
    /// Engine clock at the moment of the swap.
    pub timestamp_ms: u64,
}

// ---------------------------------------------------------------------------
// Stage drawing primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    White,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub dim: bool,
}

/// Draw instruction in stage cell coordinates. Coordinates may fall outside
/// the canvas; the rasterizer drops those.
#[derive(Debug, Clone)]
pub struct DrawOp {
    pub x: i32,
    pub y: i32,
    pub ch: char,
    pub style: Style,
    pub z_order: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            style: Style::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChange {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}
