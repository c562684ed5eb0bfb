//! Runtime store: per-sprite transient state owned by the engine.

use std::collections::BTreeMap;

use crate::program::source::{Sprite, SpriteId};
use crate::types::{Bubble, Position, SpriteView, Visual};

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteRuntime {
    pub position: Position,
    /// Cumulative degrees, never normalized.
    pub angle: f64,
    pub visual: Visual,
    pub has_run_once: bool,
    pub bubble: Option<Bubble>,
}

impl SpriteRuntime {
    pub fn seeded(sprite: &Sprite) -> Self {
        SpriteRuntime {
            position: Position::new(sprite.x, sprite.y),
            angle: 0.0,
            visual: Visual::default(),
            has_run_once: false,
            bubble: None,
        }
    }
}

/// Keyed by sprite id; iteration is in ascending id order.
#[derive(Debug, Clone, Default)]
pub struct RuntimeStore {
    entries: BTreeMap<SpriteId, SpriteRuntime>,
}

impl RuntimeStore {
    /// Bring the store in line with `sprites`: seed newcomers, drop the
    /// departed, leave survivors untouched. Returns the removed ids.
    pub fn reconcile(&mut self, sprites: &[Sprite]) -> Vec<SpriteId> {
        let mut removed = Vec::new();
        self.entries.retain(|id, _| {
            let keep = sprites.iter().any(|s| s.id == *id);
            if !keep {
                removed.push(*id);
            }
            keep
        });
        for sprite in sprites {
            self.entries
                .entry(sprite.id)
                .or_insert_with(|| SpriteRuntime::seeded(sprite));
        }
        removed
    }

    pub fn get(&self, id: SpriteId) -> Option<&SpriteRuntime> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: SpriteId) -> Option<&mut SpriteRuntime> {
        self.entries.get_mut(&id)
    }

    pub fn position(&self, id: SpriteId) -> Option<Position> {
        self.get(id).map(|r| r.position)
    }

    /// Known positions, ascending by id.
    pub fn positions(&self) -> Vec<(SpriteId, Position)> {
        self.entries.iter().map(|(id, r)| (*id, r.position)).collect()
    }

    pub fn set_bubble(&mut self, id: SpriteId, bubble: Option<Bubble>) {
        if let Some(r) = self.entries.get_mut(&id) {
            r.bubble = bubble;
        }
    }

    pub fn clear_bubbles(&mut self) {
        for r in self.entries.values_mut() {
            r.bubble = None;
        }
    }

    pub fn reset_run_flags(&mut self) {
        for r in self.entries.values_mut() {
            r.has_run_once = false;
        }
    }

    pub fn view(&self, id: SpriteId) -> Option<SpriteView> {
        self.get(id).map(|r| SpriteView {
            id,
            position: r.position,
            angle: r.angle,
            visual: r.visual,
            bubble: r.bubble.clone(),
        })
    }
}
