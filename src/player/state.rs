use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::SandboxConfig;
use crate::engine::instant::InstantEffect;
use crate::engine::{Engine, SpriteHost};
use crate::program::Program;
use crate::program::source::{Block, BlockKind, Sprite};

use super::palette;

/// Everything the interactive stage edits, independent of the terminal.
pub struct StageState {
    pub program: Program,
    pub engine: Engine,
    pub config: SandboxConfig,
    pub selected_sprite: usize,
    pub selected_block: usize,
    pub palette_index: usize,
    pub palette: Vec<BlockKind>,
    last_click: u64,
}

impl StageState {
    pub fn new(program: Program, config: SandboxConfig, engine: Engine) -> Self {
        let mut state = StageState {
            program,
            engine,
            config,
            selected_sprite: 0,
            selected_block: 0,
            palette_index: 0,
            palette: palette::palette(),
            last_click: 0,
        };
        state.engine.sync(state.program.sprites());
        state
    }

    pub fn selected_sprite(&self) -> Option<&Sprite> {
        self.program.sprites().get(self.selected_sprite)
    }

    pub fn selected_block(&self) -> Option<&Block> {
        self.selected_sprite()
            .and_then(|s| s.animations.get(self.selected_block))
    }

    pub fn palette_item(&self) -> Option<&BlockKind> {
        self.palette.get(self.palette_index)
    }

    pub fn toggle_play(&mut self) {
        let play = !self.engine.is_running();
        self.engine.set_play(play, &mut self.program);
    }

    pub fn next_sprite(&mut self) {
        let count = self.program.sprites().len();
        if count > 0 {
            self.selected_sprite = (self.selected_sprite + 1) % count;
            self.selected_block = 0;
        }
    }

    pub fn move_block_cursor(&mut self, delta: isize) {
        let len = self.selected_sprite().map_or(0, |s| s.animations.len());
        if len == 0 {
            self.selected_block = 0;
            return;
        }
        let next = self.selected_block as isize + delta;
        self.selected_block = next.clamp(0, len as isize - 1) as usize;
    }

    pub fn cycle_palette(&mut self, delta: isize) {
        let len = self.palette.len() as isize;
        if len > 0 {
            self.palette_index = (self.palette_index as isize + delta).rem_euclid(len) as usize;
        }
    }

    pub fn add_sprite(&mut self) {
        let name = format!("Cat {}", self.program.sprites().len() + 1);
        self.program.add_sprite(name);
        self.selected_sprite = self.program.sprites().len() - 1;
        self.selected_block = 0;
        self.engine.sync(self.program.sprites());
    }

    pub fn add_palette_block(&mut self) {
        let (Some(sprite), Some(kind)) = (self.selected_sprite(), self.palette_item().cloned()) else {
            return;
        };
        let id = sprite.id;
        if self.program.add_block(id, kind).is_some() {
            let len = self.selected_sprite().map_or(0, |s| s.animations.len());
            self.selected_block = len.saturating_sub(1);
        }
        self.engine.sync(self.program.sprites());
    }

    pub fn remove_selected_block(&mut self) {
        let (Some(sprite), Some(block)) = (self.selected_sprite(), self.selected_block()) else {
            return;
        };
        let (sprite_id, block_id) = (sprite.id, block.id);
        self.program.remove_block(sprite_id, block_id);
        self.move_block_cursor(0);
        self.engine.sync(self.program.sprites());
    }

    pub fn nudge_selected_block(&mut self, direction: f64) {
        let (Some(sprite), Some(block)) = (self.selected_sprite(), self.selected_block()) else {
            return;
        };
        let Some(patch) = palette::nudge(&block.kind, direction) else {
            return;
        };
        let (sprite_id, block_id) = (sprite.id, block.id);
        self.program.update_block(sprite_id, block_id, &patch);
        self.engine.sync(self.program.sprites());
    }

    /// Treat the selected block as clicked: apply it to its sprite now.
    pub fn click_selected_block(&mut self) {
        let (Some(sprite), Some(block)) = (self.selected_sprite(), self.selected_block()) else {
            return;
        };
        let (sprite_id, block) = (sprite.id, block.kind.clone());
        let effect = InstantEffect {
            sprite_id,
            block,
            timestamp: self.next_click_timestamp(),
        };
        self.engine.sync(self.program.sprites());
        self.engine.instant_effect(&effect);
    }

    /// Wall-clock millis, bumped so two clicks never share a timestamp.
    fn next_click_timestamp(&mut self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        self.last_click = now.max(self.last_click + 1);
        self.last_click
    }
}
