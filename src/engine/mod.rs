//! Engine: the sprite animation interpreter.
//!
//! Turns each sprite's block script into runtime state on a fixed tick,
//! swaps the scripts of the first pair of sprites that collide, runs the
//! say/think bubble schedule, and applies single clicked blocks on demand.
//!
//! The engine is driven by `advance`; it never reads a wall clock. It does
//! not own the sprite list either: every call reads it from a `SpriteHost`.

pub mod bubbles;
pub mod clamp;
pub mod collision;
pub mod config;
pub mod gate;
pub mod instant;
pub mod resolver;
pub mod runtime;
pub mod timers;

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace};

use crate::program::source::{Sprite, SpriteId};
use crate::types::{SpriteView, SwapAnnouncement};
use bubbles::BubbleAction;
use clamp::Viewport;
use config::EngineConfig;
use instant::InstantEffect;
use runtime::RuntimeStore;
use timers::{Fired, SessionToken, TimerEvent, TimerQueue, TokenSource};

/// The store that owns the canonical sprite list.
pub trait SpriteHost {
    fn sprites(&self) -> &[Sprite];
    /// Exchange the two sprites' block scripts.
    fn swap_animations(&mut self, a: SpriteId, b: SpriteId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Running,
}

pub struct Engine {
    config: EngineConfig,
    state: PlayState,
    now: Duration,
    viewport: Viewport,
    runtime: RuntimeStore,
    timers: TimerQueue,
    tokens: TokenSource,
    session: Option<SessionToken>,
    bubble_schedule: Option<SessionToken>,
    /// Sprite list as of the last reconciliation.
    snapshot: Vec<Sprite>,
    swap_lock: bool,
    colliding_pair: Option<(SpriteId, SpriteId)>,
    last_swap: Option<SwapAnnouncement>,
    last_instant: Option<u64>,
    ticks: u64,
    rng: StdRng,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic instant `changeColor` hues.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EngineConfig, rng: StdRng) -> Self {
        Engine {
            config,
            state: PlayState::Stopped,
            now: Duration::ZERO,
            viewport: Viewport::default(),
            runtime: RuntimeStore::default(),
            timers: TimerQueue::default(),
            tokens: TokenSource::default(),
            session: None,
            bubble_schedule: None,
            snapshot: Vec::new(),
            swap_lock: false,
            colliding_pair: None,
            last_swap: None,
            last_instant: None,
            ticks: 0,
            rng,
        }
    }

    // -----------------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------------

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Viewport::new(width, height);
    }

    /// Reconcile runtime state with `sprites`. While running, any change to
    /// the sprite list rebuilds the bubble schedule.
    pub fn sync(&mut self, sprites: &[Sprite]) {
        if self.snapshot == sprites {
            return;
        }
        let removed = self.runtime.reconcile(sprites);
        if let Some((a, b)) = self.colliding_pair {
            if removed.contains(&a) || removed.contains(&b) {
                self.colliding_pair = None;
            }
        }
        self.snapshot = sprites.to_vec();

        if self.state == PlayState::Running {
            debug!(sprites = sprites.len(), "sprite set changed, rescheduling bubbles");
            self.schedule_bubbles();
        }
    }

    pub fn set_play(&mut self, play: bool, host: &mut impl SpriteHost) {
        if play { self.play(host) } else { self.stop() }
    }

    pub fn play(&mut self, host: &mut impl SpriteHost) {
        if self.state == PlayState::Running {
            return;
        }
        self.sync(host.sprites());

        let token = self.tokens.issue();
        self.session = Some(token);
        self.state = PlayState::Running;
        self.swap_lock = false;
        self.runtime.reset_run_flags();

        let every = self.config.tick_interval();
        self.timers
            .schedule_repeating(self.now.saturating_add(every), every, token, TimerEvent::Tick);
        self.schedule_bubbles();
        debug!(at_ms = self.now.as_millis() as u64, "playback started");
    }

    pub fn stop(&mut self) {
        if self.state == PlayState::Stopped {
            return;
        }
        let mut cancelled = 0;
        for token in [self.session.take(), self.bubble_schedule.take()].into_iter().flatten() {
            cancelled += self.timers.cancel(token);
        }
        self.state = PlayState::Stopped;
        self.runtime.clear_bubbles();
        self.colliding_pair = None;
        debug!(cancelled, "playback stopped");
    }

    /// Move the engine clock forward by `dt`, firing every timer that comes
    /// due on the way, in order.
    pub fn advance(&mut self, dt: Duration, host: &mut impl SpriteHost) {
        self.sync(host.sprites());
        let target = self.now.saturating_add(dt);

        while let Some(fired) = self.timers.pop_due(target) {
            self.now = fired.at;
            self.dispatch(fired, host);
        }
        self.now = target;
    }

    /// Apply one clicked block, whether or not playback is running.
    pub fn instant_effect(&mut self, effect: &InstantEffect) {
        if self.last_instant == Some(effect.timestamp) {
            return;
        }
        self.last_instant = Some(effect.timestamp);

        let Some(rt) = self.runtime.get_mut(effect.sprite_id) else {
            return;
        };
        instant::apply(&effect.block, rt, &self.viewport, &mut self.rng);
        trace!(sprite = %effect.sprite_id, block = effect.block.type_name(), "instant effect");
    }

    // -----------------------------------------------------------------------
    // Timer dispatch
    // -----------------------------------------------------------------------

    fn dispatch(&mut self, fired: Fired, host: &mut impl SpriteHost) {
        match fired.event {
            TimerEvent::Tick if self.session == Some(fired.token) => self.tick(host),
            TimerEvent::ClearHighlight if self.session == Some(fired.token) => {
                self.colliding_pair = None;
            }
            TimerEvent::ShowBubble { sprite_id, bubble } if self.bubble_schedule == Some(fired.token) => {
                self.runtime.set_bubble(sprite_id, Some(bubble));
            }
            TimerEvent::HideBubble { sprite_id } if self.bubble_schedule == Some(fired.token) => {
                self.runtime.set_bubble(sprite_id, None);
            }
            // Owned by a cancelled session or an outdated schedule.
            _ => {}
        }
    }

    fn tick(&mut self, host: &mut impl SpriteHost) {
        self.ticks += 1;
        let mut ran = 0usize;

        for sprite in host.sprites() {
            let Some(rt) = self.runtime.get_mut(sprite.id) else {
                continue;
            };
            if !gate::should_run(rt.has_run_once, &sprite.animations) {
                continue;
            }
            let pass = resolver::resolve_pass(rt.position, rt.visual, &sprite.animations);
            rt.position = self.viewport.clamp(pass.position);
            rt.angle += pass.angle_delta;
            rt.visual = pass.visual;
            rt.has_run_once = true;
            ran += 1;
        }
        trace!(tick = self.ticks, ran, "tick");

        self.resolve_collision(host);
    }

    fn resolve_collision(&mut self, host: &mut impl SpriteHost) {
        if self.swap_lock {
            return;
        }
        let positions = self.runtime.positions();
        if positions.len() < 2 {
            return;
        }
        let Some((a, b)) = collision::first_colliding_pair(&positions, self.config.collision_distance) else {
            return;
        };

        let name = |id: SpriteId| {
            host.sprites()
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.name.clone())
                .unwrap_or_default()
        };
        let announcement = SwapAnnouncement {
            left_name: name(a),
            right_name: name(b),
            timestamp_ms: self.now.as_millis() as u64,
        };

        host.swap_animations(a, b);
        self.swap_lock = true;
        self.colliding_pair = Some((a, b));
        info!(left = %announcement.left_name, right = %announcement.right_name, "scripts swapped");
        self.last_swap = Some(announcement);

        if let Some(token) = self.session {
            let due = self.now.saturating_add(self.config.highlight_duration());
            self.timers.schedule(due, token, TimerEvent::ClearHighlight);
        }
        self.sync(host.sprites());
    }

    /// Replace any pending bubble schedule with one built from the current
    /// snapshot, starting now.
    fn schedule_bubbles(&mut self) {
        if let Some(old) = self.bubble_schedule.take() {
            self.timers.cancel(old);
        }
        self.runtime.clear_bubbles();

        let token = self.tokens.issue();
        self.bubble_schedule = Some(token);
        for event in bubbles::plan(&self.snapshot, self.config.default_bubble_seconds) {
            let due = self.now.saturating_add(event.at);
            let timer = match event.action {
                BubbleAction::Show(bubble) => TimerEvent::ShowBubble {
                    sprite_id: event.sprite_id,
                    bubble,
                },
                BubbleAction::Hide => TimerEvent::HideBubble {
                    sprite_id: event.sprite_id,
                },
            };
            self.timers.schedule(due, token, timer);
        }
    }

    // -----------------------------------------------------------------------
    // Outputs
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PlayState::Running
    }

    pub fn runtime(&self) -> &RuntimeStore {
        &self.runtime
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn view(&self, id: SpriteId) -> Option<SpriteView> {
        self.runtime.view(id)
    }

    /// Views in the host's display order.
    pub fn views(&self) -> Vec<SpriteView> {
        self.snapshot
            .iter()
            .filter_map(|s| self.runtime.view(s.id))
            .collect()
    }

    pub fn colliding_pair(&self) -> Option<(SpriteId, SpriteId)> {
        self.colliding_pair
    }

    pub fn last_swap(&self) -> Option<&SwapAnnouncement> {
        self.last_swap.as_ref()
    }

    pub fn swap_locked(&self) -> bool {
        self.swap_lock
    }

    /// Engine clock.
    pub fn elapsed(&self) -> Duration {
        self.now
    }

    /// Ticks fired since the engine was created.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Time until the next pending timer, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_due().map(|due| due.saturating_sub(self.now))
    }
}
