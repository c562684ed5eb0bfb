//! Collision detection for the script-swap mechanic.

use crate::program::source::SpriteId;
use crate::types::Position;

/// Axis-aligned proximity test, strict on both axes.
pub fn is_close(a: Position, b: Position, distance: f64) -> bool {
    (a.x - b.x).abs() < distance && (a.y - b.y).abs() < distance
}

/// First colliding pair, scanning ids in ascending order with the outer loop
/// on the lower id. The returned pair is ordered `(lower, higher)`.
pub fn first_colliding_pair(
    positions: &[(SpriteId, Position)],
    distance: f64,
) -> Option<(SpriteId, SpriteId)> {
    let mut sorted = positions.to_vec();
    sorted.sort_by_key(|(id, _)| *id);

    for (i, (a, pa)) in sorted.iter().enumerate() {
        for (b, pb) in &sorted[i + 1..] {
            if is_close(*pa, *pb, distance) {
                return Some((*a, *b));
            }
        }
    }
    None
}
