//! Proximity evasion: every sample, a pointer inside `dodgeDistance` gets an
//! independent `evasiveness` chance of sending the mascot to another corner.

use super::{DODGE_HOLD_MS, MascotController, Motion, Point};
use crate::capabilities::{KeyValueStore, RandomSource, ToneEmitter};
use crate::scheduler::TimerKind;

impl<S, T, R> MascotController<S, T, R>
where
    S: KeyValueStore,
    T: ToneEmitter,
    R: RandomSource,
{
    pub(super) fn on_sample(&mut self, at: f64) {
        if !self.loops_active() || self.state.motion == Motion::Dodging {
            return;
        }
        let Some(pointer) = self.state.pointer else {
            return;
        };
        let settings = &self.config.settings;
        if distance(pointer, self.evasion_center()) >= settings.dodge_distance {
            return;
        }
        let evasiveness = settings.evasiveness;
        // draws are in [0, 1): 0 never dodges, 1 always does
        if self.rng.next_f64() >= evasiveness {
            return;
        }
        self.dodge(at);
    }

    fn dodge(&mut self, at: f64) {
        // a dodge preempts an in-flight peek or run
        self.pending_run = None;
        self.timers.cancel(TimerKind::RunLaunch);
        self.state.motion = Motion::Dodging;
        self.state.position = self.random_corner();
        self.timers.arm(TimerKind::MotionEnd, at + DODGE_HOLD_MS);
        log::debug!("mascot dodged to {:?}", self.state.position);
    }
}

fn distance(a: Point, (bx, by): (f64, f64)) -> f64 {
    (a.x - bx).hypot(a.y - by)
}
