//! Program source types: the authored block scripts.
//!
//! These types say *what* each sprite is told to do. The engine reads them
//! and resolves them into runtime state; it never writes them.

use std::collections::HashSet;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::ProgramError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpriteId(pub u32);

impl fmt::Display for SpriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u64);

/// Random tiebreak range folded into the low bits of a generated id.
const BLOCK_ID_SALT: u64 = 1024;

impl BlockId {
    /// Creation-time timestamp with a random tiebreak in the low bits.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        BlockId(millis * BLOCK_ID_SALT + rng.gen_range(0..BLOCK_ID_SALT))
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(flatten)]
    pub kind: BlockKind,
}

/// One instruction. Numeric fields are optional; the resolver supplies the
/// defaults when they are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockKind {
    Move {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        steps: Option<f64>,
    },
    Turn {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        degrees: Option<f64>,
    },
    Goto {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<f64>,
    },
    Say {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seconds: Option<f64>,
    },
    Think {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seconds: Option<f64>,
    },
    Show,
    Hide,
    ChangeColor {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<f64>,
    },
    SetColor {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
    },
    ClearEffects,
    ChangeSizeBy {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<f64>,
    },
    SetSizeTo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
    },
    /// Marker only. Its presence makes the whole script run on every tick.
    Repeat,
}

impl BlockKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            BlockKind::Move { .. } => "move",
            BlockKind::Turn { .. } => "turn",
            BlockKind::Goto { .. } => "goto",
            BlockKind::Say { .. } => "say",
            BlockKind::Think { .. } => "think",
            BlockKind::Show => "show",
            BlockKind::Hide => "hide",
            BlockKind::ChangeColor { .. } => "changeColor",
            BlockKind::SetColor { .. } => "setColor",
            BlockKind::ClearEffects => "clearEffects",
            BlockKind::ChangeSizeBy { .. } => "changeSizeBy",
            BlockKind::SetSizeTo { .. } => "setSizeTo",
            BlockKind::Repeat => "repeat",
        }
    }

    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            BlockKind::Move { .. } | BlockKind::Turn { .. } | BlockKind::Goto { .. }
        )
    }

    /// Overwrite the fields this variant carries with the ones present in
    /// `patch`. The variant itself never changes.
    pub fn apply_patch(&mut self, patch: &BlockPatch) {
        fn set<T: Clone>(slot: &mut Option<T>, from: &Option<T>) {
            if let Some(v) = from {
                *slot = Some(v.clone());
            }
        }

        match self {
            BlockKind::Move { steps } => set(steps, &patch.steps),
            BlockKind::Turn { degrees } => set(degrees, &patch.degrees),
            BlockKind::Goto { x, y } => {
                set(x, &patch.x);
                set(y, &patch.y);
            }
            BlockKind::Say { message, seconds } | BlockKind::Think { message, seconds } => {
                set(message, &patch.message);
                set(seconds, &patch.seconds);
            }
            BlockKind::ChangeColor { amount } | BlockKind::ChangeSizeBy { amount } => {
                set(amount, &patch.amount)
            }
            BlockKind::SetColor { value } | BlockKind::SetSizeTo { value } => {
                set(value, &patch.value)
            }
            BlockKind::Show | BlockKind::Hide | BlockKind::ClearEffects | BlockKind::Repeat => {}
        }
    }

    /// Short label used by the script panel.
    pub fn summary(&self) -> String {
        fn num(v: &Option<f64>, default: f64) -> f64 {
            v.unwrap_or(default)
        }

        match self {
            BlockKind::Move { steps } => format!("move {} steps", num(steps, 0.0)),
            BlockKind::Turn { degrees } => format!("turn {} deg", num(degrees, 0.0)),
            BlockKind::Goto { x, y } => match (x, y) {
                (Some(x), Some(y)) => format!("go to x:{x} y:{y}"),
                (Some(x), None) => format!("go to x:{x}"),
                (None, Some(y)) => format!("go to y:{y}"),
                (None, None) => "go to".into(),
            },
            BlockKind::Say { message, seconds } => format!(
                "say \"{}\" {}s",
                message.as_deref().unwrap_or(""),
                num(seconds, 2.0)
            ),
            BlockKind::Think { message, seconds } => format!(
                "think \"{}\" {}s",
                message.as_deref().unwrap_or(""),
                num(seconds, 2.0)
            ),
            BlockKind::Show => "show".into(),
            BlockKind::Hide => "hide".into(),
            BlockKind::ChangeColor { amount } => format!("change color by {}", num(amount, 0.0)),
            BlockKind::SetColor { value } => format!("set color to {}", num(value, 0.0)),
            BlockKind::ClearEffects => "clear graphic effects".into(),
            BlockKind::ChangeSizeBy { amount } => format!("change size by {}", num(amount, 0.0)),
            BlockKind::SetSizeTo { value } => format!("set size to {}%", num(value, 100.0)),
            BlockKind::Repeat => "repeat animation".into(),
        }
    }
}

/// Partial field update for one block. Fields the target variant does not
/// carry are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degrees: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

// ---------------------------------------------------------------------------
// Sprites and the program document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub id: SpriteId,
    pub name: String,
    /// Home position, used as the runtime seed.
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub animations: Vec<Block>,
}

impl Sprite {
    pub fn new(id: u32, name: impl Into<String>, x: f64, y: f64) -> Self {
        Sprite {
            id: SpriteId(id),
            name: name.into(),
            x,
            y,
            animations: Vec::new(),
        }
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.animations.iter().find(|b| b.id == id)
    }

    pub fn has_block(&self, id: BlockId) -> bool {
        self.block(id).is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageSize {
    pub width: f64,
    pub height: f64,
}

impl Default for StageSize {
    fn default() -> Self {
        StageSize {
            width: 600.0,
            height: 400.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSource {
    #[serde(default)]
    pub stage: StageSize,
    pub sprites: Vec<Sprite>,
}

impl Default for ProgramSource {
    fn default() -> Self {
        ProgramSource {
            stage: StageSize::default(),
            sprites: vec![
                Sprite::new(1, "Cat 1", 50.0, 50.0),
                Sprite::new(2, "Cat 2", 220.0, 80.0),
            ],
        }
    }
}

impl ProgramSource {
    /// Reject documents whose ids could not be addressed unambiguously.
    pub fn validate(&self) -> Result<(), ProgramError> {
        let mut sprite_ids = HashSet::new();
        for sprite in &self.sprites {
            if !sprite_ids.insert(sprite.id) {
                return Err(ProgramError::DuplicateSprite(sprite.id));
            }
            let mut block_ids = HashSet::new();
            for block in &sprite.animations {
                if !block_ids.insert(block.id) {
                    return Err(ProgramError::DuplicateBlock {
                        sprite: sprite.id,
                        block: block.id,
                    });
                }
            }
        }
        Ok(())
    }
}
