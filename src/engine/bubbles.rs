//! Bubble scheduler.
//!
//! Each sprite's script is walked once with a time cursor starting at zero.
//! Every say/think block shows at the cursor and hides `seconds` later; the
//! cursor then moves to the hide time. Other blocks take no time.

use std::time::Duration;

use crate::program::source::{BlockKind, Sprite, SpriteId};
use crate::types::{Bubble, BubbleKind};

#[derive(Debug, Clone, PartialEq)]
pub enum BubbleAction {
    Show(Bubble),
    Hide,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BubbleEvent {
    /// Offset from the moment the schedule is installed.
    pub at: Duration,
    pub sprite_id: SpriteId,
    pub action: BubbleAction,
}

/// Events for one sprite in the order they must be installed.
pub fn plan_sprite(sprite: &Sprite, default_seconds: f64) -> Vec<BubbleEvent> {
    let mut events = Vec::new();
    let mut cursor = Duration::ZERO;

    for block in &sprite.animations {
        let (kind, message, seconds) = match &block.kind {
            BlockKind::Say { message, seconds } => (BubbleKind::Say, message, seconds),
            BlockKind::Think { message, seconds } => (BubbleKind::Think, message, seconds),
            _ => continue,
        };
        // Zero and NaN count as unset; negative durations collapse to zero.
        let secs = seconds
            .filter(|s| *s != 0.0 && !s.is_nan())
            .unwrap_or(default_seconds);
        let length = Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX);
        let end = cursor.saturating_add(length);

        events.push(BubbleEvent {
            at: cursor,
            sprite_id: sprite.id,
            action: BubbleAction::Show(Bubble {
                kind,
                message: message.clone().unwrap_or_default(),
            }),
        });
        events.push(BubbleEvent {
            at: end,
            sprite_id: sprite.id,
            action: BubbleAction::Hide,
        });
        cursor = end;
    }

    events
}

pub fn plan(sprites: &[Sprite], default_seconds: f64) -> Vec<BubbleEvent> {
    sprites
        .iter()
        .flat_map(|s| plan_sprite(s, default_seconds))
        .collect()
}
