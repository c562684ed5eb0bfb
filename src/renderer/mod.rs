//! Renderer: the deterministic stage rasterizer.
//!
//! Turns `SpriteView`s (from the engine) into `DrawOp`s, rasterizes them onto
//! a fixed-size cell grid, and diffs successive grids so the player only
//! repaints what changed.
//!
//! The renderer is pure and stateless. It knows nothing about ticks, timers,
//! or block semantics.

use crate::program::source::{Sprite, SpriteId};
use crate::types::{BubbleKind, Cell, CellChange, Color, DrawOp, NamedColor, SpriteView, Style};

/// Stage units covered by one terminal column.
pub const UNITS_PER_COL: f64 = 10.0;
/// Stage units covered by one terminal row.
pub const UNITS_PER_ROW: f64 = 20.0;

/// Base hue of a sprite before its color effect.
const BASE_HUE: f64 = 30.0;
/// Box size in cells at 100% size.
const BOX_COLS: f64 = 10.0;
const BOX_ROWS: f64 = 5.0;
const MAX_BOX_CELLS: i32 = 200;
const BUBBLE_Z: i32 = 10_000;

const HEADINGS: [char; 8] = ['→', '↘', '↓', '↙', '←', '↖', '↑', '↗'];

pub type Grid = Vec<Vec<Cell>>;

/// What to draw on one stage frame.
pub struct StageScene<'a> {
    pub views: &'a [SpriteView],
    pub sprites: &'a [Sprite],
    pub colliding: Option<(SpriteId, SpriteId)>,
}

pub struct StageRenderer;

impl StageRenderer {
    /// Stage size in units for a canvas of `cols` × `rows` cells.
    pub fn viewport_for(cols: u16, rows: u16) -> (f64, f64) {
        (cols as f64 * UNITS_PER_COL, rows as f64 * UNITS_PER_ROW)
    }

    pub fn compose(scene: &StageScene) -> Vec<DrawOp> {
        let mut ops = Vec::new();
        for (z, view) in scene.views.iter().enumerate() {
            let name = scene
                .sprites
                .iter()
                .find(|s| s.id == view.id)
                .map(|s| s.name.as_str())
                .unwrap_or("");
            let colliding = scene
                .colliding
                .is_some_and(|(a, b)| a == view.id || b == view.id);
            sprite_ops(view, name, colliding, z as i32, &mut ops);
        }
        ops
    }

    /// Rasterize draw ops onto a `width` × `height` grid. Higher z paints
    /// over lower z; ops outside the grid are dropped.
    pub fn rasterize(ops: &[DrawOp], width: u16, height: u16) -> Grid {
        let w = width as usize;
        let h = height as usize;
        let mut grid = vec![vec![Cell::default(); w]; h];

        let mut ops: Vec<_> = ops.iter().collect();
        ops.sort_by_key(|op| op.z_order);

        for op in ops {
            if op.x < 0 || op.y < 0 {
                continue;
            }
            let (x, y) = (op.x as usize, op.y as usize);
            if x < w && y < h {
                grid[y][x] = Cell {
                    ch: op.ch,
                    style: op.style,
                };
            }
        }

        grid
    }

    /// Cell-level diff between two grids of the same size.
    pub fn diff(prev: &[Vec<Cell>], next: &[Vec<Cell>]) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for (y, (prev_row, next_row)) in prev.iter().zip(next.iter()).enumerate() {
            for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
                if prev_cell != next_cell {
                    changes.push(CellChange {
                        x: x as u16,
                        y: y as u16,
                        cell: *next_cell,
                    });
                }
            }
        }
        changes
    }
}

fn sprite_ops(view: &SpriteView, name: &str, colliding: bool, z: i32, ops: &mut Vec<DrawOp>) {
    let x = (view.position.x / UNITS_PER_COL).floor() as i32;
    let y = (view.position.y / UNITS_PER_ROW).floor() as i32;

    if let Some(bubble) = view.bubble.as_ref().filter(|b| !b.message.is_empty()) {
        let (open, close, fg) = match bubble.kind {
            BubbleKind::Say => ('<', '>', NamedColor::Yellow),
            BubbleKind::Think => ('(', ')', NamedColor::White),
        };
        let style = Style {
            fg: Some(Color::Named(fg)),
            ..Default::default()
        };
        let text = std::iter::once(open)
            .chain(bubble.message.chars())
            .chain(std::iter::once(close));
        for (i, ch) in text.enumerate() {
            ops.push(DrawOp { x: x + i as i32, y: y - 1, ch, style, z_order: BUBBLE_Z });
        }
    }

    if !view.visual.visible {
        return;
    }

    let scale = (view.visual.size / 100.0).max(0.0);
    let w = ((BOX_COLS * scale).round() as i32).clamp(1, MAX_BOX_CELLS);
    let h = ((BOX_ROWS * scale).round() as i32).clamp(1, MAX_BOX_CELLS);
    let style = Style {
        fg: Some(if colliding {
            Color::Named(NamedColor::Red)
        } else {
            hue_to_rgb(BASE_HUE + view.visual.color)
        }),
        bold: colliding,
        ..Default::default()
    };
    let heading = heading_char(view.angle);

    if w < 2 || h < 2 {
        ops.push(DrawOp { x, y, ch: heading, style, z_order: z });
        return;
    }

    // Frame
    for i in 0..w {
        let (top, bottom) = match i {
            0 => ('┌', '└'),
            i if i == w - 1 => ('┐', '┘'),
            _ => ('─', '─'),
        };
        ops.push(DrawOp { x: x + i, y, ch: top, style, z_order: z });
        ops.push(DrawOp { x: x + i, y: y + h - 1, ch: bottom, style, z_order: z });
    }
    for j in 1..h - 1 {
        ops.push(DrawOp { x, y: y + j, ch: '│', style, z_order: z });
        ops.push(DrawOp { x: x + w - 1, y: y + j, ch: '│', style, z_order: z });
        for i in 1..w - 1 {
            ops.push(DrawOp { x: x + i, y: y + j, ch: ' ', style, z_order: z });
        }
    }

    // Heading and name on the first inner row
    if h > 2 {
        ops.push(DrawOp { x: x + 1, y: y + 1, ch: heading, style, z_order: z });
        let room = (w - 3).max(0) as usize;
        for (i, ch) in name.chars().take(room).enumerate() {
            ops.push(DrawOp { x: x + 2 + i as i32, y: y + 1, ch, style, z_order: z });
        }
    }
}

/// Arrow for the nearest of eight directions; 0° faces right, positive
/// angles turn clockwise on screen.
pub fn heading_char(angle: f64) -> char {
    let sector = (angle.rem_euclid(360.0) / 45.0).round() as usize % HEADINGS.len();
    HEADINGS[sector]
}

pub fn hue_to_rgb(hue: f64) -> Color {
    let h = hue.rem_euclid(360.0) / 60.0;
    let (s, v) = (0.8, 1.0);
    let c = v * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    let to_u8 = |f: f64| ((f + m) * 255.0).round() as u8;
    Color::Rgb {
        r: to_u8(r),
        g: to_u8(g),
        b: to_u8(b),
    }
}
