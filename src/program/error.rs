use thiserror::Error;

use super::source::{BlockId, SpriteId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    #[error("sprite id {0} is used more than once")]
    DuplicateSprite(SpriteId),
    #[error("block id {block} is used more than once in sprite {sprite}")]
    DuplicateBlock { sprite: SpriteId, block: BlockId },
}
