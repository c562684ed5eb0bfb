use std::time::Duration;

use block_sandbox::engine::Engine;
use block_sandbox::engine::SpriteHost;
use block_sandbox::engine::config::EngineConfig;
use block_sandbox::engine::instant::InstantEffect;
use block_sandbox::program::Program;
use block_sandbox::program::source::{BlockKind, SpriteId};
use block_sandbox::types::Position;

fn click(sprite: u32, block: BlockKind, timestamp: u64) -> InstantEffect {
    InstantEffect {
        sprite_id: SpriteId(sprite),
        block,
        timestamp,
    }
}

fn setup() -> (Program, Engine) {
    let program = Program::default();
    let mut engine = Engine::with_seed(EngineConfig::default(), 9);
    engine.sync(program.sprites());
    (program, engine)
}

#[test]
fn change_color_click_diverges_from_playback() {
    let (mut p, mut e) = setup();
    for t in 1..=20 {
        e.instant_effect(&click(1, BlockKind::ChangeColor { amount: Some(25.0) }, t));
        let hue = e.view(SpriteId(1)).unwrap().visual.color;
        assert!((0.0..360.0).contains(&hue), "hue {hue} out of range");
    }

    // The same block in a playback pass adds exactly its amount.
    let hue_before = e.view(SpriteId(1)).unwrap().visual.color;
    p.add_block(SpriteId(1), BlockKind::ChangeColor { amount: Some(25.0) }).unwrap();
    e.play(&mut p);
    e.advance(Duration::from_millis(500), &mut p);
    assert_eq!(e.view(SpriteId(1)).unwrap().visual.color, hue_before + 25.0);
}

#[test]
fn set_color_click_always_resets_hue() {
    let (_, mut e) = setup();
    e.instant_effect(&click(1, BlockKind::ChangeColor { amount: None }, 1));
    e.instant_effect(&click(1, BlockKind::SetColor { value: Some(120.0) }, 2));
    assert_eq!(e.view(SpriteId(1)).unwrap().visual.color, 0.0);
}

#[test]
fn motion_clicks_commit_and_clamp() {
    let (_, mut e) = setup();
    e.set_viewport(300.0, 200.0);
    e.instant_effect(&click(1, BlockKind::Move { steps: Some(10.0) }, 1));
    e.instant_effect(&click(1, BlockKind::Turn { degrees: Some(-45.0) }, 2));
    let v = e.view(SpriteId(1)).unwrap();
    assert_eq!(v.position, Position::new(60.0, 50.0));
    assert_eq!(v.angle, -45.0);

    e.instant_effect(&click(1, BlockKind::Goto { x: Some(-500.0), y: None }, 3));
    assert_eq!(e.view(SpriteId(1)).unwrap().position, Position::new(-80.0, 50.0));
}

#[test]
fn redelivered_click_is_ignored() {
    let (_, mut e) = setup();
    let event = click(2, BlockKind::Move { steps: Some(10.0) }, 77);
    e.instant_effect(&event);
    e.instant_effect(&event);
    assert_eq!(e.view(SpriteId(2)).unwrap().position.x, 230.0);

    // Same sprite and block, new timestamp: a fresh click.
    e.instant_effect(&click(2, BlockKind::Move { steps: Some(10.0) }, 78));
    assert_eq!(e.view(SpriteId(2)).unwrap().position.x, 240.0);
}

#[test]
fn click_on_missing_sprite_is_a_no_op() {
    let (_, mut e) = setup();
    let before = e.views();
    e.instant_effect(&click(99, BlockKind::Move { steps: Some(10.0) }, 1));
    assert_eq!(e.views(), before);
}

#[test]
fn looks_clicks_follow_playback_semantics() {
    let (_, mut e) = setup();
    e.instant_effect(&click(1, BlockKind::ChangeSizeBy { amount: Some(-30.0) }, 1));
    e.instant_effect(&click(1, BlockKind::Hide, 2));
    let v = e.view(SpriteId(1)).unwrap().visual;
    assert_eq!(v.size, 70.0);
    assert!(!v.visible);

    e.instant_effect(&click(1, BlockKind::ClearEffects, 3));
    e.instant_effect(&click(1, BlockKind::Show, 4));
    let v = e.view(SpriteId(1)).unwrap().visual;
    assert_eq!((v.size, v.color, v.visible), (100.0, 0.0, true));
}

#[test]
fn clicks_work_while_playing_without_touching_the_gate() {
    let (mut p, mut e) = setup();
    p.add_block(SpriteId(1), BlockKind::Move { steps: Some(10.0) }).unwrap();
    e.play(&mut p);
    e.instant_effect(&click(1, BlockKind::Move { steps: Some(5.0) }, 1));
    assert_eq!(e.view(SpriteId(1)).unwrap().position.x, 55.0);

    // The script still gets its first run on the first tick.
    e.advance(Duration::from_millis(500), &mut p);
    assert_eq!(e.view(SpriteId(1)).unwrap().position.x, 65.0);
}
