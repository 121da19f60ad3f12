//! Mount / unmount, persisted flags, reveal scheduling and config pushes.

use super::{MascotController, Motion, REVEAL_DELAY_MS};
use crate::capabilities::{CAUGHT_KEY, HIDDEN_UNTIL_KEY, KeyValueStore, RandomSource, ToneEmitter};
use crate::config::ConfigPatch;
use crate::preset::Preset;
use crate::scheduler::TimerKind;

impl<S, T, R> MascotController<S, T, R>
where
    S: KeyValueStore,
    T: ToneEmitter,
    R: RandomSource,
{
    /// Mount: restore persisted flags, then reveal (immediately if caught,
    /// otherwise after the reveal delay or the stored hidden-until time).
    pub fn start(&mut self, now: f64) {
        if self.started {
            return;
        }
        self.started = true;
        self.restore_persisted(now);
        if self.config.enabled {
            self.show_or_schedule(now);
        } else {
            log::info!("mascot disabled by config");
        }
    }

    /// Unmount: cancel every timer and drop the config feed.
    pub fn stop(&mut self) {
        if !self.started {
            return;
        }
        self.timers.cancel_all();
        self.pending_run = None;
        self.pending_pointer = None;
        self.rendered_center = None;
        self.feed = None;
        self.state.motion = Motion::Idle;
        self.state.visible = false;
        self.started = false;
        log::debug!("mascot stopped");
    }

    /// Merge a pushed config patch; toggling `enabled` hides or shows the mascot,
    /// and a new planner interval restarts the pending action from `now`.
    pub fn apply_config(&mut self, patch: &ConfigPatch, now: f64) {
        let was_enabled = self.config.enabled;
        let old_interval = self.config.settings.action_interval_ms;
        self.config.apply(patch);
        log::debug!("mascot config updated: {:?}", self.config);
        if !self.started {
            return;
        }
        let interval = self.config.settings.action_interval_ms;
        if interval != old_interval && self.timers.is_armed(TimerKind::Action) {
            self.timers.arm(TimerKind::Action, now + interval);
        }
        match (was_enabled, self.config.enabled) {
            (true, false) => self.hide(),
            (false, true) => self.show_or_schedule(now),
            _ => {}
        }
    }

    /// Clear a catch regardless of its expiry.
    pub fn reset_caught(&mut self, now: f64) {
        if !self.state.caught {
            return;
        }
        self.timers.cancel(TimerKind::CaughtExpiry);
        self.clear_caught();
        if self.started && self.config.enabled {
            self.state.visible = true;
            self.arm_loops(now);
        }
    }

    /// Hide for `duration_ms`, persisting the hidden-until marker so a reload
    /// stays hidden too. Ignored while caught: the marker then holds the catch expiry.
    pub fn hide_for(&mut self, duration_ms: f64, now: f64) -> bool {
        if !self.started || self.state.caught || duration_ms.is_nan() || duration_ms <= 0.0 {
            return false;
        }
        let until = now + duration_ms;
        self.store.set(HIDDEN_UNTIL_KEY, &format_ms(until));
        self.state.visible = false;
        self.suspend_loops();
        if self.config.enabled {
            self.timers.arm(TimerKind::Reveal, until);
        }
        log::info!("mascot hidden until {until}");
        true
    }

    pub(super) fn drain_feed(&mut self, now: f64) {
        let Some(feed) = &self.feed else {
            return;
        };
        let poll = feed.poll();
        for payload in &poll.payloads {
            match ConfigPatch::from_json(payload) {
                Ok(patch) => self.apply_config(&patch, now),
                Err(err) => log::warn!("ignoring mascot config push: {err}"),
            }
        }
        if poll.closed {
            log::warn!("mascot config subscription closed; keeping last known config");
            self.feed = None;
        }
    }

    pub(super) fn on_reveal(&mut self, at: f64) {
        if !self.config.enabled || self.state.caught {
            return;
        }
        if self.store.get(HIDDEN_UNTIL_KEY).is_some() {
            self.store.remove(HIDDEN_UNTIL_KEY);
        }
        self.state.visible = true;
        self.state.position = Preset::DEFAULT;
        self.state.motion = Motion::Idle;
        log::info!("mascot revealed");
        self.arm_loops(at);
    }

    pub(super) fn on_caught_expired(&mut self, at: f64) {
        if !self.state.caught {
            return;
        }
        self.clear_caught();
        log::info!("mascot catch expired");
        self.arm_loops(at);
    }

    fn restore_persisted(&mut self, now: f64) {
        let caught = self.store.get(CAUGHT_KEY).as_deref() == Some("true");
        let until = self.store.get(HIDDEN_UNTIL_KEY).and_then(|v| parse_ms(&v));
        if !caught {
            return;
        }
        match until {
            Some(t) if t <= now => {
                log::debug!("persisted catch expired at {t}");
                self.store.remove(CAUGHT_KEY);
                self.store.remove(HIDDEN_UNTIL_KEY);
            }
            _ => {
                self.state.caught = true;
                self.state.caught_until = until;
                self.state.position = Preset::DEFAULT;
                self.state.motion = Motion::Idle;
                if let Some(t) = until {
                    self.timers.arm(TimerKind::CaughtExpiry, t);
                }
                log::info!("restored caught mascot (until {until:?})");
            }
        }
    }

    /// Caught mascots show at once; otherwise honour the hidden-until marker
    /// or wait out the reveal delay.
    fn show_or_schedule(&mut self, now: f64) {
        if self.state.caught {
            self.state.visible = true;
            return;
        }
        let marker = self.store.get(HIDDEN_UNTIL_KEY);
        let reveal_at = match marker.as_deref().and_then(parse_ms) {
            Some(t) if t > now => t,
            _ => {
                if marker.is_some() {
                    self.store.remove(HIDDEN_UNTIL_KEY);
                }
                now + REVEAL_DELAY_MS
            }
        };
        self.timers.arm(TimerKind::Reveal, reveal_at);
    }

    fn hide(&mut self) {
        self.state.visible = false;
        self.timers.cancel(TimerKind::Reveal);
        self.suspend_loops();
        log::info!("mascot hidden by config");
    }

    fn clear_caught(&mut self) {
        self.state.caught = false;
        self.state.caught_until = None;
        self.store.remove(CAUGHT_KEY);
        self.store.remove(HIDDEN_UNTIL_KEY);
    }
}

pub(super) fn format_ms(ms: f64) -> String {
    format!("{}", ms.round() as i64)
}

fn parse_ms(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Scripted;
    use super::*;
    use crate::capabilities::{MemoryStore, SilentTones};
    use crate::config::MascotConfig;

    type Ctl = MascotController<MemoryStore, SilentTones, Scripted>;

    fn with_store(store: MemoryStore, config: MascotConfig) -> Ctl {
        MascotController::new(config, store, SilentTones, Scripted::new(&[]))
    }

    #[test]
    fn reveals_after_delay() {
        let mut c = with_store(MemoryStore::new(), MascotConfig::default());
        c.start(1_000.0);
        c.tick(3_999.0);
        assert!(!c.state().visible);
        c.tick(4_000.0);
        assert!(c.state().visible);
        assert_eq!(c.state().position, Preset::DEFAULT);
        assert_eq!(c.deadline(TimerKind::Sample), Some(4_100.0));
        assert_eq!(c.deadline(TimerKind::Action), Some(9_000.0));
    }

    #[test]
    fn disabled_config_never_reveals() {
        let config = MascotConfig { enabled: false, ..MascotConfig::default() };
        let mut c = with_store(MemoryStore::new(), config);
        c.start(0.0);
        c.tick(60_000.0);
        assert!(!c.state().visible);
        assert!(c.deadline(TimerKind::Reveal).is_none());
    }

    #[test]
    fn hidden_until_marker_defers_reveal() {
        let mut store = MemoryStore::new();
        store.set(HIDDEN_UNTIL_KEY, "20000");
        let mut c = with_store(store, MascotConfig::default());
        c.start(1_000.0);
        assert_eq!(c.deadline(TimerKind::Reveal), Some(20_000.0));
        c.tick(19_999.0);
        assert!(!c.state().visible);
        c.tick(20_000.0);
        assert!(c.state().visible);
        assert!(c.store().get(HIDDEN_UNTIL_KEY).is_none());
    }

    #[test]
    fn stale_marker_is_cleared() {
        let mut store = MemoryStore::new();
        store.set(HIDDEN_UNTIL_KEY, "500");
        let mut c = with_store(store, MascotConfig::default());
        c.start(1_000.0);
        assert!(c.store().get(HIDDEN_UNTIL_KEY).is_none());
        assert_eq!(c.deadline(TimerKind::Reveal), Some(4_000.0));
    }

    #[test]
    fn expired_catch_is_cleared_on_mount() {
        let mut store = MemoryStore::new();
        store.set(CAUGHT_KEY, "true");
        store.set(HIDDEN_UNTIL_KEY, "900");
        let mut c = with_store(store, MascotConfig::default());
        c.start(1_000.0);
        assert!(!c.state().caught);
        assert!(c.store().is_empty());
        assert_eq!(c.deadline(TimerKind::Reveal), Some(4_000.0));
    }

    #[test]
    fn catch_without_expiry_stays_forever() {
        let mut store = MemoryStore::new();
        store.set(CAUGHT_KEY, "true");
        let mut c = with_store(store, MascotConfig::default());
        c.start(1_000.0);
        assert!(c.state().caught && c.state().visible);
        assert_eq!(c.state().caught_until, None);
        c.tick(1_000_000.0);
        assert!(c.state().caught);
    }

    #[test]
    fn disable_push_hides_and_enable_push_reschedules() {
        let mut c = with_store(MemoryStore::new(), MascotConfig::default());
        c.start(0.0);
        c.tick(3_000.0);
        assert!(c.state().visible);

        c.apply_config(&ConfigPatch::from_json(r#"{"enabled":false}"#).unwrap(), 3_500.0);
        assert!(!c.state().visible);
        assert!(c.deadline(TimerKind::Action).is_none());
        assert!(c.deadline(TimerKind::Sample).is_none());

        c.apply_config(&ConfigPatch::from_json(r#"{"enabled":true}"#).unwrap(), 4_000.0);
        assert_eq!(c.deadline(TimerKind::Reveal), Some(7_000.0));
    }

    #[test]
    fn interval_push_restarts_pending_action() {
        let config = MascotConfig::from_remote(Some(r#"{"settings":{"actionIntervalMs":60000}}"#));
        let mut c = MascotController::new(config, MemoryStore::new(), SilentTones, Scripted::new(&[0.8, 0.5]));
        c.start(0.0);
        c.tick(3_000.0);
        assert_eq!(c.deadline(TimerKind::Action), Some(63_000.0));

        c.apply_config(&ConfigPatch::from_json(r#"{"settings":{"actionIntervalMs":2000}}"#).unwrap(), 3_100.0);
        assert_eq!(c.deadline(TimerKind::Action), Some(5_100.0));
        // hop to corner index 3 on the new cadence
        c.tick(5_100.0);
        assert_eq!(c.state().position, Preset::Corner(crate::preset::Corner::BottomLeft));
        assert_eq!(c.deadline(TimerKind::Action), Some(7_100.0));

        // unrelated pushes leave the cadence alone
        c.apply_config(&ConfigPatch::from_json(r#"{"settings":{"size":80}}"#).unwrap(), 6_000.0);
        assert_eq!(c.deadline(TimerKind::Action), Some(7_100.0));
    }

    #[test]
    fn interval_push_while_hidden_arms_nothing() {
        let mut c = with_store(MemoryStore::new(), MascotConfig::default());
        c.start(0.0);
        c.apply_config(&ConfigPatch::from_json(r#"{"settings":{"actionIntervalMs":1000}}"#).unwrap(), 100.0);
        assert!(c.deadline(TimerKind::Action).is_none());
        c.tick(3_000.0);
        assert_eq!(c.deadline(TimerKind::Action), Some(4_000.0));
    }

    #[test]
    fn hide_for_persists_marker_and_reveals_later() {
        let mut c = with_store(MemoryStore::new(), MascotConfig::default());
        c.start(0.0);
        c.tick(3_000.0);
        assert!(c.hide_for(10_000.0, 3_000.0));
        assert!(!c.state().visible);
        assert_eq!(c.store().get(HIDDEN_UNTIL_KEY).as_deref(), Some("13000"));
        c.tick(12_999.0);
        assert!(!c.state().visible);
        c.tick(13_000.0);
        assert!(c.state().visible);
        assert!(c.store().get(HIDDEN_UNTIL_KEY).is_none());
    }

    #[test]
    fn stop_cancels_everything() {
        let mut c = with_store(MemoryStore::new(), MascotConfig::default());
        c.start(0.0);
        c.tick(3_000.0);
        c.stop();
        assert!(c.timers.is_idle());
        assert!(!c.state().visible);
        c.tick(100_000.0);
        assert!(!c.state().visible);
    }

    #[test]
    fn parses_stored_timestamps() {
        assert_eq!(parse_ms(" 1700000000000 "), Some(1_700_000_000_000.0));
        assert_eq!(parse_ms("soon"), None);
        assert_eq!(parse_ms("NaN"), None);
        assert_eq!(format_ms(13_000.4), "13000");
    }
}
