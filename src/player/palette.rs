//! Blocks offered by the stage's block palette.

use crate::program::source::{BlockKind, BlockPatch};

pub fn palette() -> Vec<BlockKind> {
    vec![
        BlockKind::Move { steps: Some(10.0) },
        BlockKind::Turn { degrees: Some(15.0) },
        BlockKind::Turn { degrees: Some(-15.0) },
        BlockKind::Goto {
            x: Some(0.0),
            y: Some(0.0),
        },
        BlockKind::Say {
            message: Some("Hello!".into()),
            seconds: Some(2.0),
        },
        BlockKind::Think {
            message: Some("Hmm...".into()),
            seconds: Some(2.0),
        },
        BlockKind::Show,
        BlockKind::Hide,
        BlockKind::ChangeColor { amount: Some(25.0) },
        BlockKind::SetColor { value: Some(0.0) },
        BlockKind::ClearEffects,
        BlockKind::ChangeSizeBy { amount: Some(10.0) },
        BlockKind::SetSizeTo { value: Some(100.0) },
        BlockKind::Repeat,
    ]
}

/// Patch nudging the block's main numeric field one step in `direction`
/// (+1 or -1). `None` for blocks without a numeric field.
pub fn nudge(kind: &BlockKind, direction: f64) -> Option<BlockPatch> {
    let patch = match kind {
        BlockKind::Move { steps } => BlockPatch {
            steps: Some(steps.unwrap_or(0.0) + 10.0 * direction),
            ..Default::default()
        },
        BlockKind::Turn { degrees } => BlockPatch {
            degrees: Some(degrees.unwrap_or(0.0) + 15.0 * direction),
            ..Default::default()
        },
        BlockKind::Goto { x, .. } => BlockPatch {
            x: Some(x.unwrap_or(0.0) + 10.0 * direction),
            ..Default::default()
        },
        BlockKind::Say { seconds, .. } | BlockKind::Think { seconds, .. } => BlockPatch {
            seconds: Some((seconds.unwrap_or(2.0) + direction).max(0.0)),
            ..Default::default()
        },
        BlockKind::ChangeColor { amount } | BlockKind::ChangeSizeBy { amount } => BlockPatch {
            amount: Some(amount.unwrap_or(0.0) + 10.0 * direction),
            ..Default::default()
        },
        BlockKind::SetColor { value } => BlockPatch {
            value: Some(value.unwrap_or(0.0) + 10.0 * direction),
            ..Default::default()
        },
        BlockKind::SetSizeTo { value } => BlockPatch {
            value: Some(value.unwrap_or(100.0) + 10.0 * direction),
            ..Default::default()
        },
        BlockKind::Show | BlockKind::Hide | BlockKind::ClearEffects | BlockKind::Repeat => return None,
    };
    Some(patch)
}
