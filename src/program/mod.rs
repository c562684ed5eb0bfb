//! Program: the canonical store of sprites and their scripts.
//!
//! All authoring edits go through here. The engine only ever reads this
//! store, except for the one swap request it issues through `SpriteHost`.

pub mod error;
pub mod source;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::engine::SpriteHost;
use source::{Block, BlockId, BlockKind, BlockPatch, ProgramSource, Sprite, SpriteId};

/// Home position of a newly added sprite is offset from the previous one.
const NEW_SPRITE_ORIGIN: (f64, f64) = (50.0, 50.0);
const NEW_SPRITE_STEP: f64 = 40.0;

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub source: ProgramSource,
}

impl Program {
    pub fn new(source: ProgramSource) -> Self {
        Program { source }
    }

    /// Load a program, or start from the default two-sprite program when
    /// `path` does not exist yet.
    pub fn open(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Ok(Program::default());
        }
        let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
        let source: ProgramSource =
            serde_json::from_str(&json).with_context(|| format!("Failed to parse {path}"))?;
        source
            .validate()
            .with_context(|| format!("Invalid program {path}"))?;
        Ok(Program::new(source))
    }

    pub fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.source.sprites.iter().find(|s| s.id == id)
    }

    fn sprite_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.source.sprites.iter_mut().find(|s| s.id == id)
    }

    pub fn add_sprite(&mut self, name: impl Into<String>) -> SpriteId {
        let next = self
            .source
            .sprites
            .iter()
            .map(|s| s.id.0)
            .max()
            .unwrap_or(0)
            + 1;
        let offset = NEW_SPRITE_STEP * self.source.sprites.len() as f64;
        let sprite = Sprite::new(
            next,
            name,
            NEW_SPRITE_ORIGIN.0 + offset,
            NEW_SPRITE_ORIGIN.1 + offset,
        );
        let id = sprite.id;
        self.source.sprites.push(sprite);
        id
    }

    /// Append a block to the end of a sprite's script. Returns the new id,
    /// or `None` when the sprite is gone.
    pub fn add_block(&mut self, sprite_id: SpriteId, kind: BlockKind) -> Option<BlockId> {
        let sprite = self.sprite_mut(sprite_id)?;
        let mut rng = rand::thread_rng();
        let mut id = BlockId::generate(&mut rng);
        while sprite.has_block(id) {
            id = BlockId::generate(&mut rng);
        }
        sprite.animations.push(Block { id, kind });
        debug!(sprite = %sprite_id, block = %id, "block added");
        Some(id)
    }

    /// Patch a block in place. Order within the script is unchanged.
    pub fn update_block(&mut self, sprite_id: SpriteId, block_id: BlockId, patch: &BlockPatch) -> bool {
        let Some(block) = self
            .sprite_mut(sprite_id)
            .and_then(|s| s.animations.iter_mut().find(|b| b.id == block_id))
        else {
            return false;
        };
        block.kind.apply_patch(patch);
        true
    }

    /// Remove a block; the remaining blocks keep their relative order.
    pub fn remove_block(&mut self, sprite_id: SpriteId, block_id: BlockId) -> bool {
        let Some(sprite) = self.sprite_mut(sprite_id) else {
            return false;
        };
        let before = sprite.animations.len();
        sprite.animations.retain(|b| b.id != block_id);
        sprite.animations.len() != before
    }
}

impl SpriteHost for Program {
    fn sprites(&self) -> &[Sprite] {
        &self.source.sprites
    }

    /// Exchange the two scripts. Each side receives its own copy so later
    /// edits to one never reach the other.
    fn swap_animations(&mut self, a: SpriteId, b: SpriteId) {
        if a == b {
            return;
        }
        let (Some(left), Some(right)) = (
            self.sprite(a).map(|s| s.animations.clone()),
            self.sprite(b).map(|s| s.animations.clone()),
        ) else {
            return;
        };
        if let Some(s) = self.sprite_mut(a) {
            s.animations = right;
        }
        if let Some(s) = self.sprite_mut(b) {
            s.animations = left;
        }
    }
}
