// Integration tests (native) for the mascot controller.
// These drive the public API with scripted randomness, in-memory storage and a
// recording tone emitter, so they run under plain `cargo test`.

mod common;

use common::{REVEAL_AT, Scripted, revealed};
use cupid_mascot::capabilities::{CAUGHT_KEY, HIDDEN_UNTIL_KEY, ToneLog};
use cupid_mascot::preset::{Direction, Run};
use cupid_mascot::scheduler::TimerKind;
use cupid_mascot::{
    InteractionOutcome, KeyValueStore, MascotController, MemoryStore, Motion, Preset, SeededRandom,
    Tone,
};

fn is_corner(p: Preset) -> bool {
    matches!(p, Preset::Corner(_))
}

// Pointer 100px from center, evasiveness 1, radius 150: the next sample dodges,
// and the dodge settles back to Idle after 800ms.
#[test]
fn close_pointer_triggers_dodge_then_idle() {
    // roll 0.99 still dodges at evasiveness 1; corner index 3 (BottomLeft)
    let mut c = revealed(
        r#"{"enabled":true,"settings":{"evasiveness":1,"dodgeDistance":150}}"#,
        MemoryStore::new(),
        Scripted::new(&[0.99, 0.5]),
    );
    let (cx, cy) = c.center();
    c.pointer_moved(cx - 60.0, cy + 80.0);
    let sample_at = c.deadline(TimerKind::Sample).unwrap();
    c.tick(sample_at);
    assert_eq!(c.state().motion, Motion::Dodging);
    assert!(is_corner(c.state().position));
    assert_ne!(c.state().position, Preset::DEFAULT);

    // leave the radius so the settle isn't followed by a fresh dodge
    c.pointer_moved(cx, cy);
    c.tick(sample_at + 799.0);
    assert_eq!(c.state().motion, Motion::Dodging);
    c.tick(sample_at + 800.0);
    assert_eq!(c.state().motion, Motion::Idle);
    assert!(is_corner(c.state().position));
}

// hideTimeMs = 8000: caught for [t, t + 8000), cleared from t + 8000.
#[test]
fn catch_expires_after_hide_window() {
    let mut c = revealed(r#"{"settings":{"hideTimeMs":8000}}"#, MemoryStore::new(), Scripted::new(&[]));
    let t = REVEAL_AT + 10.0;
    c.tick(t);
    assert_eq!(c.activate(t), InteractionOutcome::Catch);
    for dt in [0.0, 1.0, 4_000.0, 7_999.0] {
        c.tick(t + dt);
        assert!(c.state().caught, "still caught at +{dt}");
        assert_eq!(c.state().motion, Motion::Idle);
    }
    c.tick(t + 8_000.0);
    assert!(!c.state().caught);
    assert!(c.store().get(CAUGHT_KEY).is_none());
    assert!(c.store().get(HIDDEN_UNTIL_KEY).is_none());
    // loops resume
    assert!(c.deadline(TimerKind::Action).is_some());
    assert!(c.deadline(TimerKind::Sample).is_some());
}

// Forced run: off-screen on the far side within 1500ms, then Idle on a corner.
#[test]
fn forced_run_crosses_the_screen() {
    // action 0.45 -> run, 0.1 -> left-to-right, 0.9 -> lower band, 0.6 -> corner 3
    let mut c = revealed(
        r#"{"settings":{"actionIntervalMs":5000}}"#,
        MemoryStore::new(),
        Scripted::new(&[0.45, 0.1, 0.9, 0.6]),
    );
    let size = c.config().settings.size;
    let viewport = c.viewport();
    let t = REVEAL_AT + 5_000.0;
    c.tick(t);
    assert_eq!(c.state().motion, Motion::Running);
    let start = c.state().position;
    assert!(matches!(start, Preset::RunStart(Run { direction: Direction::LeftToRight, .. })));
    assert!(start.is_offscreen_x(size, viewport));
    assert!(start.center(size, viewport).0 < 0.0);

    c.tick(t + 50.0);
    let end = c.state().position;
    assert!(matches!(end, Preset::RunEnd(_)));
    assert!(end.is_offscreen_x(size, viewport));
    assert!(end.center(size, viewport).0 > viewport.width);

    c.tick(t + 1_499.0);
    assert_eq!(c.state().motion, Motion::Running);
    c.tick(t + 1_500.0);
    assert_eq!(c.state().motion, Motion::Idle);
    assert!(is_corner(c.state().position));
}

// Catch, drop the controller, remount on the same storage inside the window.
#[test]
fn caught_state_survives_remount() {
    let mut first = revealed("{}", MemoryStore::new(), Scripted::new(&[]));
    assert_eq!(first.activate(5_000.0), InteractionOutcome::Catch);
    first.stop();
    let store = first.into_store();

    let mut second = MascotController::new(
        common::config("{}"),
        store,
        ToneLog::default(),
        Scripted::new(&[]),
    );
    second.start(6_000.0);
    assert!(second.state().caught);
    assert!(second.state().visible, "no reveal delay for a caught mascot");
    assert_eq!(second.state().position, Preset::DEFAULT);
    assert!(second.deadline(TimerKind::Reveal).is_none());
    assert_eq!(second.deadline(TimerKind::CaughtExpiry), Some(13_000.0));

    second.tick(12_999.0);
    assert!(second.state().caught);
    second.tick(13_000.0);
    assert!(!second.state().caught);
    assert!(second.state().visible);
}

#[test]
fn running_is_always_a_miss_and_idle_always_a_catch() {
    let mut c = revealed("{}", MemoryStore::new(), Scripted::new(&[0.45, 0.0, 0.0]));
    c.tick(REVEAL_AT + 5_000.0);
    assert_eq!(c.state().motion, Motion::Running);
    for i in 0..5 {
        assert_eq!(c.activate(REVEAL_AT + 5_001.0 + i as f64), InteractionOutcome::Miss);
    }
    assert!(!c.state().caught);
    assert_eq!(c.tones().played, vec![Tone::Miss; 5]);

    c.tick(REVEAL_AT + 6_500.0);
    assert_eq!(c.state().motion, Motion::Idle);
    assert_eq!(c.activate(REVEAL_AT + 6_500.0), InteractionOutcome::Catch);
    assert_eq!(c.tones().played.last(), Some(&Tone::Pop));
}

#[test]
fn peeking_mascot_can_be_caught() {
    let mut c = revealed("{}", MemoryStore::new(), Scripted::new(&[0.1, 0.0]));
    c.tick(REVEAL_AT + 5_000.0);
    assert_eq!(c.state().motion, Motion::Peeking);
    assert_eq!(c.activate(REVEAL_AT + 5_500.0), InteractionOutcome::Catch);
    assert_eq!(c.state().motion, Motion::Idle);
    assert_eq!(c.state().position, Preset::DEFAULT);
    // the peek hold was cancelled with the catch
    assert!(c.deadline(TimerKind::MotionEnd).is_none());
}

#[test]
fn manual_reset_clears_forever_catch() {
    let mut c = revealed(r#"{"settings":{"hideTimeMs":0}}"#, MemoryStore::new(), Scripted::new(&[]));
    c.activate(4_000.0);
    c.tick(1_000_000.0);
    assert!(c.state().caught);
    c.reset_caught(1_000_000.0);
    assert!(!c.state().caught);
    assert!(c.store().is_empty());
    assert_eq!(c.deadline(TimerKind::Sample), Some(1_000_100.0));
}

#[test]
fn pushed_config_is_merged_and_close_keeps_last_values() {
    let (publisher, feed) = cupid_mascot::config_channel();
    let mut c = MascotController::new(
        common::config(r#"{"settings":{"size":96}}"#),
        MemoryStore::new(),
        ToneLog::default(),
        Scripted::new(&[]),
    );
    c.attach_feed(feed);
    c.start(0.0);

    publisher.publish(r#"{"settings":{"evasiveness":0.25}}"#);
    publisher.publish("garbage");
    c.tick(10.0);
    assert_eq!(c.config().settings.evasiveness, 0.25);
    assert_eq!(c.config().settings.size, 96.0);
    assert!(c.has_feed());

    drop(publisher);
    c.tick(20.0);
    assert!(!c.has_feed());
    assert_eq!(c.config().settings.evasiveness, 0.25);
    c.tick(REVEAL_AT);
    assert!(c.state().visible);
}

#[test]
fn disabled_push_hides_mid_motion() {
    let (publisher, feed) = cupid_mascot::config_channel();
    let mut c = revealed("{}", MemoryStore::new(), Scripted::new(&[0.1, 0.0]));
    c.attach_feed(feed);
    c.tick(REVEAL_AT + 5_000.0);
    assert_eq!(c.state().motion, Motion::Peeking);
    publisher.publish(r#"{"enabled":false}"#);
    c.tick(REVEAL_AT + 5_100.0);
    assert!(!c.state().visible);
    assert_eq!(c.state().motion, Motion::Idle);
    assert!(!c.render().visible);
    c.tick(REVEAL_AT + 60_000.0);
    assert!(!c.state().visible);
}

// Long randomized run: motion and placement stay consistent, and a caught
// mascot never moves.
#[test]
fn randomized_session_keeps_invariants() {
    let mut c = revealed(
        r#"{"settings":{"evasiveness":0.5,"actionIntervalMs":700,"hideTimeMs":2000}}"#,
        MemoryStore::new(),
        SeededRandom::seeded(42),
    );
    let mut rng = SeededRandom::seeded(7);
    let mut seen = [false; 4];
    let mut t = REVEAL_AT;
    use cupid_mascot::RandomSource;
    for frame in 0..20_000 {
        t += 16.0;
        let (cx, cy) = c.center();
        c.pointer_moved(cx + (rng.next_f64() - 0.5) * 400.0, cy + (rng.next_f64() - 0.5) * 400.0);
        if frame % 500 == 499 {
            c.activate(t);
        }
        c.tick(t);

        let s = c.state();
        seen[s.motion as usize] = true;
        match s.motion {
            Motion::Idle | Motion::Dodging => assert!(is_corner(s.position), "{s:?}"),
            Motion::Peeking => assert!(matches!(s.position, Preset::Peek(_)), "{s:?}"),
            Motion::Running => {
                assert!(matches!(s.position, Preset::RunStart(_) | Preset::RunEnd(_)), "{s:?}")
            }
        }
        if s.caught {
            assert_eq!(s.motion, Motion::Idle);
            assert_eq!(s.position, Preset::DEFAULT);
            assert!(c.deadline(TimerKind::Action).is_none());
            assert!(c.deadline(TimerKind::Sample).is_none());
        }
    }
    assert!(seen.iter().all(|s| *s), "every motion state should occur: {seen:?}");
}
