//! Motion planner: on every action tick, peek (30%), run (30%) or hop (40%).

use super::{MascotController, Motion, PEEK_HOLD_MS, RUN_HOLD_MS, RUN_LAUNCH_MS};
use crate::capabilities::{KeyValueStore, RandomSource, ToneEmitter};
use crate::preset::{Band, Direction, Preset, Run, Side};
use crate::scheduler::TimerKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Peek,
    Run,
    Hop,
}

/// Map a uniform draw in `[0, 1)` onto the weighted action table.
pub fn choose_action(roll: f64) -> Action {
    if roll < 0.3 {
        Action::Peek
    } else if roll < 0.6 {
        Action::Run
    } else {
        Action::Hop
    }
}

impl<S, T, R> MascotController<S, T, R>
where
    S: KeyValueStore,
    T: ToneEmitter,
    R: RandomSource,
{
    pub(super) fn on_action(&mut self, at: f64) {
        if !self.loops_active() {
            return;
        }
        // A peek / run / dodge already owns the motion slot; skip this tick.
        if self.state.motion != Motion::Idle {
            log::debug!("planner tick skipped while {:?}", self.state.motion);
            return;
        }
        let action = choose_action(self.rng.next_f64());
        log::debug!("planner action {action:?}");
        match action {
            Action::Peek => {
                let side = Side::ALL[self.rng.pick_index(Side::ALL.len())];
                self.state.motion = Motion::Peeking;
                self.state.position = Preset::Peek(side);
                self.timers.arm(TimerKind::MotionEnd, at + PEEK_HOLD_MS);
            }
            Action::Run => {
                let direction = if self.rng.pick_index(2) == 0 {
                    Direction::LeftToRight
                } else {
                    Direction::RightToLeft
                };
                let band = if self.rng.pick_index(2) == 0 { Band::Upper } else { Band::Lower };
                let run = Run { direction, band };
                self.state.motion = Motion::Running;
                self.state.position = Preset::RunStart(run);
                self.pending_run = Some(run);
                self.timers.arm(TimerKind::RunLaunch, at + RUN_LAUNCH_MS);
                self.timers.arm(TimerKind::MotionEnd, at + RUN_HOLD_MS);
            }
            Action::Hop => {
                self.state.position = self.random_corner();
            }
        }
    }

    pub(super) fn on_run_launch(&mut self) {
        let Some(run) = self.pending_run.take() else {
            return;
        };
        if self.state.motion == Motion::Running {
            self.state.position = Preset::RunEnd(run);
        }
    }

    /// End of a peek / run / dodge hold. Peeks and runs settle on a random
    /// corner; a dodge stays where it landed.
    pub(super) fn on_motion_end(&mut self) {
        self.pending_run = None;
        match self.state.motion {
            Motion::Peeking | Motion::Running => {
                self.state.motion = Motion::Idle;
                self.state.position = self.random_corner();
            }
            Motion::Dodging => self.state.motion = Motion::Idle,
            Motion::Idle => {}
        }
    }
}
