//! Run-once gate.
//!
//! A script without a `repeat` block runs on the first tick of a session and
//! is skipped afterwards. Motion and looks share the same flag.

use crate::program::source::{Block, BlockKind};

pub fn has_repeat(blocks: &[Block]) -> bool {
    blocks.iter().any(|b| matches!(b.kind, BlockKind::Repeat))
}

pub fn should_run(has_run_once: bool, blocks: &[Block]) -> bool {
    !has_run_once || has_repeat(blocks)
}
