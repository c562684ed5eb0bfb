//! Instant effects: a single clicked block applied immediately.
//!
//! Motion blocks behave exactly as in playback. Looks blocks do too, except
//! that a clicked `changeColor` picks a random hue and a clicked `setColor`
//! always resets the hue to zero.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::program::source::{BlockKind, SpriteId};

use super::clamp::Viewport;
use super::resolver::{Effect, Pass};
use super::runtime::SpriteRuntime;

/// A click on a block. A new `timestamp` marks a new click even when the
/// sprite and block repeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantEffect {
    pub sprite_id: SpriteId,
    pub block: BlockKind,
    pub timestamp: u64,
}

pub fn apply(block: &BlockKind, runtime: &mut SpriteRuntime, viewport: &Viewport, rng: &mut impl Rng) {
    let mut pass = Pass::start(runtime.position, runtime.visual);
    match block {
        BlockKind::ChangeColor { .. } => pass.visual.color = rng.gen_range(0.0..360.0),
        BlockKind::SetColor { .. } => pass.visual.color = 0.0,
        other => other.apply(&mut pass),
    }

    if block.is_motion() {
        runtime.position = viewport.clamp(pass.position);
        runtime.angle += pass.angle_delta;
    }
    runtime.visual = pass.visual;
}
