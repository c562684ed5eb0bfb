//! Effect resolver: folds a script into state for one execution pass.
//!
//! Each block applies its effect to a running `Pass`, left to right, so later
//! blocks observe what earlier blocks did within the same pass.

use crate::program::source::{Block, BlockKind};
use crate::types::{Position, Visual};

/// Running values of one pass over a script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pass {
    pub position: Position,
    /// Rotation accumulated during this pass only.
    pub angle_delta: f64,
    pub visual: Visual,
}

impl Pass {
    pub fn start(position: Position, visual: Visual) -> Self {
        Pass {
            position,
            angle_delta: 0.0,
            visual,
        }
    }
}

/// Apply a block's playback semantics to a pass.
pub trait Effect {
    fn apply(&self, pass: &mut Pass);
}

impl Effect for BlockKind {
    fn apply(&self, pass: &mut Pass) {
        match self {
            BlockKind::Move { steps } => pass.position.x += steps.unwrap_or(0.0),
            BlockKind::Turn { degrees } => pass.angle_delta += degrees.unwrap_or(0.0),
            BlockKind::Goto { x, y } => {
                if let Some(x) = x {
                    pass.position.x = *x;
                }
                if let Some(y) = y {
                    pass.position.y = *y;
                }
            }
            BlockKind::Show => pass.visual.visible = true,
            BlockKind::Hide => pass.visual.visible = false,
            BlockKind::ChangeColor { amount } => pass.visual.color += amount.unwrap_or(0.0),
            BlockKind::SetColor { value } => pass.visual.color = value.unwrap_or(0.0),
            BlockKind::ClearEffects => {
                pass.visual.color = 0.0;
                pass.visual.size = 100.0;
            }
            BlockKind::ChangeSizeBy { amount } => pass.visual.size += amount.unwrap_or(0.0),
            BlockKind::SetSizeTo { value } => pass.visual.size = value.unwrap_or(100.0),
            // Handled by the run-once gate and the bubble scheduler.
            BlockKind::Repeat | BlockKind::Say { .. } | BlockKind::Think { .. } => {}
        }
    }
}

impl Effect for Block {
    fn apply(&self, pass: &mut Pass) {
        self.kind.apply(pass);
    }
}

/// One full in-order traversal of `blocks`. The result is not clamped.
pub fn resolve_pass(position: Position, visual: Visual, blocks: &[Block]) -> Pass {
    let mut pass = Pass::start(position, visual);
    for block in blocks {
        block.apply(&mut pass);
    }
    pass
}
