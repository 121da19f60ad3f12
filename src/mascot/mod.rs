//! Mascot behaviour controller.
//!
//! One [`MascotController`] owns the runtime state, the config and a single
//! [`Scheduler`]. The host calls [`MascotController::tick`] once per animation
//! frame with the current epoch time; every timed behaviour (reveal delay,
//! planner cadence, peek/run/dodge holds, proximity sampling, catch expiry) is
//! a deadline popped from the scheduler in order. Behaviours are split by
//! concern:
//!
//! - [`lifecycle`]: mount / unmount, persisted flags, reveal, config pushes
//! - [`planner`]: periodic peek / run / hop
//! - [`evasion`]: pointer proximity dodges
//! - [`interaction`]: catch / miss resolution

mod evasion;
mod interaction;
mod lifecycle;
mod planner;

pub use interaction::{InteractionOutcome, classify};
pub use planner::{Action, choose_action};

use crate::capabilities::{KeyValueStore, RandomSource, ToneEmitter};
use crate::config::MascotConfig;
use crate::feed::ConfigFeed;
use crate::preset::{Corner, Preset, Run, Viewport};
use crate::render::{self, RenderDirectives};
use crate::scheduler::{Scheduler, TimerKind};

pub const REVEAL_DELAY_MS: f64 = 3_000.0;
pub const PEEK_HOLD_MS: f64 = 2_000.0;
pub const RUN_LAUNCH_MS: f64 = 50.0;
pub const RUN_HOLD_MS: f64 = 1_500.0;
pub const DODGE_HOLD_MS: f64 = 800.0;
pub const SAMPLE_INTERVAL_MS: f64 = 100.0;

/// Guards a single tick against runaway re-arming.
const MAX_FIRES_PER_TICK: usize = 256;

/// Mutually exclusive motion states. `Idle` is the resting state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Motion {
    #[default]
    Idle,
    Peeking,
    Running,
    Dodging,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Per-session runtime state.
#[derive(Clone, Debug, PartialEq)]
pub struct MascotState {
    pub visible: bool,
    pub caught: bool,
    /// When `caught` clears; `None` while caught means until reset.
    pub caught_until: Option<f64>,
    pub position: Preset,
    pub motion: Motion,
    pub pointer: Option<Point>,
}

impl Default for MascotState {
    fn default() -> Self {
        Self {
            visible: false,
            caught: false,
            caught_until: None,
            position: Preset::DEFAULT,
            motion: Motion::Idle,
            pointer: None,
        }
    }
}

pub struct MascotController<S, T, R> {
    config: MascotConfig,
    state: MascotState,
    timers: Scheduler,
    viewport: Viewport,
    /// Latest pointer sample not yet committed; committed once per tick.
    pending_pointer: Option<Point>,
    /// Run waiting for its launch tick.
    pending_run: Option<Run>,
    /// Where the host last saw the element's center, mid-transition included.
    rendered_center: Option<Point>,
    feed: Option<ConfigFeed>,
    started: bool,
    store: S,
    tones: T,
    rng: R,
}

impl<S, T, R> MascotController<S, T, R>
where
    S: KeyValueStore,
    T: ToneEmitter,
    R: RandomSource,
{
    pub fn new(config: MascotConfig, store: S, tones: T, rng: R) -> Self {
        Self {
            config,
            state: MascotState::default(),
            timers: Scheduler::default(),
            viewport: Viewport::default(),
            pending_pointer: None,
            pending_run: None,
            rendered_center: None,
            feed: None,
            started: false,
            store,
            tones,
            rng,
        }
    }

    pub fn attach_feed(&mut self, feed: ConfigFeed) {
        self.feed = Some(feed);
    }

    pub fn state(&self) -> &MascotState {
        &self.state
    }

    pub fn config(&self) -> &MascotConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tones(&self) -> &T {
        &self.tones
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn has_feed(&self) -> bool {
        self.feed.is_some()
    }

    /// Pending deadline for `kind`, if armed.
    pub fn deadline(&self, kind: TimerKind) -> Option<f64> {
        self.timers.deadline(kind)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.viewport = Viewport { width, height };
        }
    }

    /// Record a pointer position. Only the latest sample per frame is kept.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.pending_pointer = Some(Point { x, y });
    }

    /// Pointer left the page; nothing to evade until it comes back.
    pub fn pointer_left(&mut self) {
        self.pending_pointer = None;
        self.state.pointer = None;
    }

    /// Pointer known to the controller, committed or still pending.
    pub fn has_pointer(&self) -> bool {
        self.pending_pointer.is_some() || self.state.pointer.is_some()
    }

    /// Center of the mascot at its current preset, ignoring transitions.
    pub fn center(&self) -> (f64, f64) {
        self.state.position.center(self.config.settings.size, self.viewport)
    }

    /// Report the element's on-screen center (from its bounding box). Used for
    /// proximity checks while a CSS transition is still moving the box.
    pub fn set_rendered_center(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.rendered_center = Some(Point { x, y });
        }
    }

    /// Center used for evasion: the reported one, else the preset center.
    fn evasion_center(&self) -> (f64, f64) {
        self.rendered_center.map_or_else(|| self.center(), |p| (p.x, p.y))
    }

    /// Advance the clock to `now`: apply pushed config, commit the pointer,
    /// then fire every due timer in deadline order.
    pub fn tick(&mut self, now: f64) {
        if !self.started {
            return;
        }
        self.drain_feed(now);
        if let Some(p) = self.pending_pointer.take() {
            self.state.pointer = Some(p);
        }
        for _ in 0..MAX_FIRES_PER_TICK {
            let Some((kind, at)) = self.timers.pop_due(now) else {
                return;
            };
            self.fire(kind, at, now);
        }
        log::warn!("mascot tick hit the per-frame timer limit");
    }

    fn fire(&mut self, kind: TimerKind, at: f64, now: f64) {
        match kind {
            TimerKind::CaughtExpiry => self.on_caught_expired(at),
            TimerKind::Reveal => self.on_reveal(at),
            TimerKind::MotionEnd => self.on_motion_end(),
            TimerKind::RunLaunch => self.on_run_launch(),
            TimerKind::Sample => {
                self.timers
                    .arm(TimerKind::Sample, next_cadence(at, SAMPLE_INTERVAL_MS, now));
                self.on_sample(at);
            }
            TimerKind::Action => {
                let interval = self.config.settings.action_interval_ms;
                self.timers.arm(TimerKind::Action, next_cadence(at, interval, now));
                self.on_action(at);
            }
        }
    }

    pub fn render(&self) -> RenderDirectives {
        let launching = self.pending_run.is_some();
        render::directives(&self.state, &self.config.settings, launching)
    }

    // --- shared helpers ---------------------------------------------------------

    /// Planner and evasion only run while shown and not caught.
    fn loops_active(&self) -> bool {
        self.started && self.state.visible && !self.state.caught
    }

    fn arm_loops(&mut self, at: f64) {
        if !self.loops_active() {
            return;
        }
        if !self.timers.is_armed(TimerKind::Action) {
            let interval = self.config.settings.action_interval_ms;
            self.timers.arm(TimerKind::Action, at + interval);
        }
        if !self.timers.is_armed(TimerKind::Sample) {
            self.timers.arm(TimerKind::Sample, at + SAMPLE_INTERVAL_MS);
        }
    }

    /// Stop planner / evasion timers and settle to `Idle`.
    fn suspend_loops(&mut self) {
        for kind in [
            TimerKind::Action,
            TimerKind::Sample,
            TimerKind::RunLaunch,
            TimerKind::MotionEnd,
        ] {
            self.timers.cancel(kind);
        }
        self.pending_run = None;
        self.state.motion = Motion::Idle;
    }

    fn random_corner(&mut self) -> Preset {
        Preset::Corner(Corner::ALL[self.rng.pick_index(Corner::ALL.len())])
    }
}

/// Next slot of a repeating timer; skips missed slots instead of replaying them.
fn next_cadence(at: f64, interval: f64, now: f64) -> f64 {
    let next = at + interval;
    if next <= now { now + interval } else { next }
}
