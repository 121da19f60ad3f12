//! Click / tap / keyboard activation.

use super::{MascotController, Motion};
use crate::capabilities::{CAUGHT_KEY, HIDDEN_UNTIL_KEY, KeyValueStore, RandomSource, Tone, ToneEmitter};
use crate::preset::Preset;
use crate::scheduler::TimerKind;

use super::lifecycle::format_ms;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Already caught (or not on screen): nothing happens.
    Ignored,
    Miss,
    Catch,
}

/// Moving targets (running, dodging) can't be caught; resting or peeking ones can.
pub fn classify(motion: Motion, caught: bool) -> InteractionOutcome {
    if caught {
        return InteractionOutcome::Ignored;
    }
    match motion {
        Motion::Running | Motion::Dodging => InteractionOutcome::Miss,
        Motion::Idle | Motion::Peeking => InteractionOutcome::Catch,
    }
}

impl<S, T, R> MascotController<S, T, R>
where
    S: KeyValueStore,
    T: ToneEmitter,
    R: RandomSource,
{
    /// Resolve a click or tap at `now`.
    pub fn activate(&mut self, now: f64) -> InteractionOutcome {
        if !self.started || !self.state.visible {
            return InteractionOutcome::Ignored;
        }
        let outcome = classify(self.state.motion, self.state.caught);
        match outcome {
            InteractionOutcome::Ignored => {}
            InteractionOutcome::Miss => {
                log::debug!("mascot slipped away ({:?})", self.state.motion);
                self.play(Tone::Miss);
            }
            InteractionOutcome::Catch => {
                self.play(Tone::Pop);
                self.catch(now);
            }
        }
        outcome
    }

    /// Keyboard activation: Enter and Space behave like a click.
    pub fn key_activated(&mut self, key: &str, now: f64) -> Option<InteractionOutcome> {
        match key {
            "Enter" | " " | "Spacebar" => Some(self.activate(now)),
            _ => None,
        }
    }

    fn catch(&mut self, now: f64) {
        self.suspend_loops();
        self.state.caught = true;
        self.state.position = Preset::DEFAULT;
        self.store.set(CAUGHT_KEY, "true");
        let hide_ms = self.config.settings.hide_time_ms;
        if hide_ms > 0.0 {
            let until = now + hide_ms;
            self.state.caught_until = Some(until);
            self.store.set(HIDDEN_UNTIL_KEY, &format_ms(until));
            self.timers.arm(TimerKind::CaughtExpiry, until);
        } else {
            self.state.caught_until = None;
            self.store.remove(HIDDEN_UNTIL_KEY);
            self.timers.cancel(TimerKind::CaughtExpiry);
        }
        log::info!("mascot caught (until {:?})", self.state.caught_until);
    }

    fn play(&mut self, tone: Tone) {
        if self.config.settings.sound_enabled {
            self.tones.play(tone);
        }
    }
}
