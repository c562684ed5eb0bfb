use std::time::Duration;

use block_sandbox::engine::config::EngineConfig;
use block_sandbox::engine::{Engine, PlayState, SpriteHost};
use block_sandbox::program::Program;
use block_sandbox::program::source::{BlockKind, ProgramSource, Sprite, SpriteId, StageSize};
use block_sandbox::types::{Bubble, BubbleKind, Position};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn program(sprites: Vec<(Sprite, Vec<BlockKind>)>) -> Program {
    let mut program = Program::new(ProgramSource {
        stage: StageSize::default(),
        sprites: sprites.iter().map(|(s, _)| s.clone()).collect(),
    });
    for (sprite, blocks) in sprites {
        for kind in blocks {
            program.add_block(sprite.id, kind).unwrap();
        }
    }
    program
}

fn engine() -> Engine {
    Engine::with_seed(EngineConfig::default(), 42)
}

fn goto(x: f64, y: f64) -> BlockKind {
    BlockKind::Goto {
        x: Some(x),
        y: Some(y),
    }
}

#[test]
fn script_without_repeat_runs_exactly_once() {
    let mut p = program(vec![(
        Sprite::new(1, "Cat", 50.0, 50.0),
        vec![
            BlockKind::Move { steps: Some(10.0) },
            BlockKind::Turn { degrees: Some(15.0) },
            BlockKind::ChangeSizeBy { amount: Some(10.0) },
            BlockKind::ChangeColor { amount: Some(25.0) },
        ],
    )]);
    let mut e = engine();
    e.play(&mut p);

    e.advance(ms(499), &mut p);
    assert_eq!(e.ticks(), 0);
    assert_eq!(e.view(SpriteId(1)).unwrap().position, Position::new(50.0, 50.0));

    e.advance(ms(1), &mut p);
    let after_one = e.view(SpriteId(1)).unwrap();
    assert_eq!(after_one.position, Position::new(60.0, 50.0));
    assert_eq!(after_one.angle, 15.0);
    assert_eq!(after_one.visual.size, 110.0);
    assert_eq!(after_one.visual.color, 25.0);

    e.advance(ms(5000), &mut p);
    assert_eq!(e.ticks(), 11);
    assert_eq!(e.view(SpriteId(1)).unwrap(), after_one);
}

#[test]
fn repeat_accumulates_every_tick() {
    let mut p = program(vec![(
        Sprite::new(1, "Cat", 50.0, 50.0),
        vec![BlockKind::Repeat, BlockKind::Move { steps: Some(10.0) }],
    )]);
    let mut e = engine();
    e.play(&mut p);

    for n in 1..=7u64 {
        e.advance(ms(500), &mut p);
        assert_eq!(e.view(SpriteId(1)).unwrap().position.x, 50.0 + 10.0 * n as f64);
    }
}

#[test]
fn angle_is_never_normalized() {
    let mut p = program(vec![(
        Sprite::new(1, "Cat", 0.0, 0.0),
        vec![BlockKind::Turn { degrees: Some(100.0) }, BlockKind::Repeat],
    )]);
    let mut e = engine();
    e.play(&mut p);
    e.advance(ms(2000), &mut p);
    assert_eq!(e.view(SpriteId(1)).unwrap().angle, 400.0);
}

#[test]
fn playback_positions_are_clamped() {
    let mut p = program(vec![(
        Sprite::new(1, "Cat", 50.0, 50.0),
        vec![BlockKind::Repeat, BlockKind::Move { steps: Some(400.0) }],
    )]);
    let mut e = engine();
    e.set_viewport(600.0, 400.0);
    e.play(&mut p);
    e.advance(ms(1500), &mut p);
    assert_eq!(e.view(SpriteId(1)).unwrap().position, Position::new(580.0, 50.0));
}

#[test]
fn restarting_playback_runs_once_scripts_again() {
    let mut p = program(vec![(
        Sprite::new(1, "Cat", 0.0, 0.0),
        vec![BlockKind::Move { steps: Some(10.0) }],
    )]);
    let mut e = engine();
    e.play(&mut p);
    e.advance(ms(1000), &mut p);
    e.stop();
    e.play(&mut p);
    e.advance(ms(1000), &mut p);
    assert_eq!(e.view(SpriteId(1)).unwrap().position.x, 20.0);
}

#[test]
fn stop_cancels_ticks_and_bubbles() {
    let mut p = program(vec![(
        Sprite::new(1, "Cat", 0.0, 0.0),
        vec![
            BlockKind::Repeat,
            BlockKind::Move { steps: Some(10.0) },
            BlockKind::Say {
                message: Some("Hi".into()),
                seconds: Some(5.0),
            },
        ],
    )]);
    let mut e = engine();
    e.play(&mut p);
    e.advance(ms(600), &mut p);
    assert!(e.view(SpriteId(1)).unwrap().bubble.is_some());

    e.stop();
    assert_eq!(e.state(), PlayState::Stopped);
    assert!(e.view(SpriteId(1)).unwrap().bubble.is_none());
    assert_eq!(e.next_deadline(), None);

    e.advance(ms(10_000), &mut p);
    assert_eq!(e.ticks(), 1);
    assert_eq!(e.view(SpriteId(1)).unwrap().position.x, 10.0);
    assert!(e.view(SpriteId(1)).unwrap().bubble.is_none());
}

#[test]
fn bubbles_follow_the_time_cursor() {
    let mut p = program(vec![(
        Sprite::new(1, "Cat", 0.0, 0.0),
        vec![
            BlockKind::Say {
                message: Some("Hi".into()),
                seconds: Some(1.0),
            },
            BlockKind::Think {
                message: Some("Hmm".into()),
                seconds: Some(2.0),
            },
        ],
    )]);
    let bubble = |e: &Engine| e.view(SpriteId(1)).unwrap().bubble;
    let mut e = engine();
    e.play(&mut p);

    e.advance(Duration::ZERO, &mut p);
    let hi = Bubble {
        kind: BubbleKind::Say,
        message: "Hi".into(),
    };
    assert_eq!(bubble(&e), Some(hi.clone()));

    e.advance(ms(999), &mut p);
    assert_eq!(bubble(&e), Some(hi));

    e.advance(ms(1), &mut p);
    assert_eq!(
        bubble(&e),
        Some(Bubble {
            kind: BubbleKind::Think,
            message: "Hmm".into(),
        })
    );

    e.advance(ms(1999), &mut p);
    assert!(bubble(&e).is_some());
    e.advance(ms(1), &mut p);
    assert_eq!(bubble(&e), None);

    // Scheduled once per session, even though ticks keep firing.
    e.advance(ms(10_000), &mut p);
    assert_eq!(bubble(&e), None);
}

#[test]
fn zero_second_bubble_lasts_the_default_duration() {
    let mut p = program(vec![(
        Sprite::new(1, "Cat", 0.0, 0.0),
        vec![BlockKind::Say {
            message: Some("Hi".into()),
            seconds: Some(0.0),
        }],
    )]);
    let mut e = engine();
    e.play(&mut p);

    e.advance(ms(1000), &mut p);
    assert_eq!(
        e.view(SpriteId(1)).unwrap().bubble,
        Some(Bubble {
            kind: BubbleKind::Say,
            message: "Hi".into(),
        })
    );
    e.advance(ms(1000), &mut p);
    assert_eq!(e.view(SpriteId(1)).unwrap().bubble, None);
}

#[test]
fn enormous_bubble_durations_do_not_stop_playback() {
    let long_say = BlockKind::Say {
        message: Some("zz".into()),
        seconds: Some(1e19),
    };
    let mut p = program(vec![(
        Sprite::new(1, "Cat", 0.0, 0.0),
        vec![long_say.clone(), long_say, BlockKind::Move { steps: Some(10.0) }, BlockKind::Repeat],
    )]);
    let mut e = engine();
    e.play(&mut p);
    e.advance(ms(10), &mut p);
    e.advance(ms(1000), &mut p);

    let view = e.view(SpriteId(1)).unwrap();
    assert_eq!(view.position.x, 20.0);
    assert_eq!(view.bubble.map(|b| b.message), Some("zz".to_string()));
}

#[test]
fn editing_while_playing_restarts_the_bubble_schedule() {
    let mut p = program(vec![(
        Sprite::new(1, "Cat", 0.0, 0.0),
        vec![BlockKind::Say {
            message: Some("Hi".into()),
            seconds: Some(1.0),
        }],
    )]);
    let mut e = engine();
    e.play(&mut p);
    e.advance(ms(800), &mut p);

    p.add_block(SpriteId(1), BlockKind::Show).unwrap();
    e.advance(ms(300), &mut p);
    // The old hide at 1000ms was cancelled; the new one lands at 1800ms.
    assert!(e.view(SpriteId(1)).unwrap().bubble.is_some());
    e.advance(ms(700), &mut p);
    assert!(e.view(SpriteId(1)).unwrap().bubble.is_none());
}

fn colliding_pair() -> Program {
    program(vec![
        (Sprite::new(1, "Cat 1", 0.0, 0.0), vec![goto(50.0, 50.0)]),
        (
            Sprite::new(2, "Cat 2", 300.0, 300.0),
            vec![goto(60.0, 60.0), BlockKind::Repeat],
        ),
    ])
}

fn script_of(p: &Program, id: u32) -> Vec<BlockKind> {
    p.sprite(SpriteId(id))
        .unwrap()
        .animations
        .iter()
        .map(|b| b.kind.clone())
        .collect()
}

#[test]
fn only_one_swap_per_session() {
    let mut p = colliding_pair();
    let (first, second) = (script_of(&p, 1), script_of(&p, 2));
    let mut e = engine();
    e.play(&mut p);

    e.advance(ms(500), &mut p);
    assert!(e.swap_locked());
    assert_eq!(script_of(&p, 1), second);
    assert_eq!(script_of(&p, 2), first);
    assert_eq!(e.colliding_pair(), Some((SpriteId(1), SpriteId(2))));
    let swap = e.last_swap().unwrap();
    assert_eq!((swap.left_name.as_str(), swap.right_name.as_str()), ("Cat 1", "Cat 2"));
    assert_eq!(swap.timestamp_ms, 500);

    // Still overlapping on later ticks, but the lock holds.
    e.advance(ms(2000), &mut p);
    assert_eq!(e.view(SpriteId(1)).unwrap().position, Position::new(60.0, 60.0));
    assert_eq!(e.view(SpriteId(2)).unwrap().position, Position::new(60.0, 60.0));
    assert_eq!(script_of(&p, 1), second);
}

#[test]
fn restart_allows_one_more_swap() {
    let mut p = colliding_pair();
    let original = script_of(&p, 1);
    let mut e = engine();
    e.play(&mut p);
    e.advance(ms(1000), &mut p);
    assert_ne!(script_of(&p, 1), original);

    e.stop();
    e.play(&mut p);
    assert!(!e.swap_locked());
    e.advance(ms(500), &mut p);
    assert!(e.swap_locked());
    assert_eq!(script_of(&p, 1), original);

    e.advance(ms(3000), &mut p);
    assert_eq!(script_of(&p, 1), original);
}

#[test]
fn collision_highlight_clears_after_600ms() {
    let mut p = colliding_pair();
    let mut e = engine();
    e.play(&mut p);
    e.advance(ms(1099), &mut p);
    assert!(e.colliding_pair().is_some());
    e.advance(ms(1), &mut p);
    assert!(e.colliding_pair().is_none());
    // The announcement outlives the highlight.
    assert!(e.last_swap().is_some());
}

#[test]
fn ticks_after_a_swap_see_the_new_scripts() {
    let mut p = program(vec![
        (
            Sprite::new(1, "Cat 1", 0.0, 0.0),
            vec![BlockKind::Repeat, BlockKind::Move { steps: Some(5.0) }],
        ),
        (
            Sprite::new(2, "Cat 2", 10.0, 0.0),
            vec![BlockKind::Repeat, BlockKind::Turn { degrees: Some(3.0) }],
        ),
    ]);
    let mut e = engine();
    e.play(&mut p);
    // One advance, three ticks: tick 1 swaps, ticks 2 and 3 run swapped scripts.
    e.advance(ms(1500), &mut p);
    let one = e.view(SpriteId(1)).unwrap();
    let two = e.view(SpriteId(2)).unwrap();
    assert_eq!(one.position.x, 5.0);
    assert_eq!(one.angle, 6.0);
    assert_eq!(two.position.x, 20.0);
    assert_eq!(two.angle, 3.0);
}

#[test]
fn single_sprite_never_swaps() {
    let mut p = program(vec![(
        Sprite::new(1, "Cat", 0.0, 0.0),
        vec![BlockKind::Repeat],
    )]);
    let mut e = engine();
    e.play(&mut p);
    e.advance(ms(2000), &mut p);
    assert!(!e.swap_locked());
}

#[test]
fn removed_sprites_leave_no_runtime_state() {
    let mut p = colliding_pair();
    let mut e = engine();
    e.play(&mut p);
    e.advance(ms(500), &mut p);
    assert!(e.colliding_pair().is_some());

    p.source.sprites.retain(|s| s.id != SpriteId(2));
    e.advance(ms(100), &mut p);
    assert!(e.view(SpriteId(2)).is_none());
    assert_eq!(e.runtime().positions().len(), p.sprites().len());
    assert!(e.colliding_pair().is_none());
}

#[test]
fn sprites_added_mid_session_start_from_home() {
    let mut p = program(vec![(
        Sprite::new(1, "Cat", 0.0, 0.0),
        vec![BlockKind::Repeat],
    )]);
    let mut e = engine();
    e.play(&mut p);
    e.advance(ms(1000), &mut p);

    let id = p.add_sprite("Newcomer");
    p.add_block(id, BlockKind::Move { steps: Some(7.0) }).unwrap();
    let home = p.sprite(id).unwrap().x;
    e.advance(ms(500), &mut p);
    assert_eq!(e.view(id).unwrap().position.x, home + 7.0);
}
