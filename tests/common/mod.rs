// Shared helpers for the native integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;

use cupid_mascot::capabilities::ToneLog;
use cupid_mascot::{ConfigPatch, MascotConfig, MascotController, MemoryStore, RandomSource};

pub const REVEAL_AT: f64 = 3_000.0;

/// Scripted draws, then a constant fallback.
pub struct Scripted {
    draws: VecDeque<f64>,
    fallback: f64,
}

impl Scripted {
    pub fn new(draws: &[f64]) -> Self {
        Self { draws: draws.iter().copied().collect(), fallback: 0.0 }
    }
}

impl RandomSource for Scripted {
    fn next_f64(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}

pub type TestController<R = Scripted> = MascotController<MemoryStore, ToneLog, R>;

pub fn config(patch: &str) -> MascotConfig {
    let mut cfg = MascotConfig::default();
    cfg.apply(&ConfigPatch::from_json(patch).expect("valid test patch"));
    cfg
}

/// Mounted at t=0 on a 1000x800 viewport and ticked through the reveal.
pub fn revealed<R: RandomSource>(patch: &str, store: MemoryStore, rng: R) -> TestController<R> {
    let mut c = MascotController::new(config(patch), store, ToneLog::default(), rng);
    c.set_viewport(1000.0, 800.0);
    c.start(0.0);
    c.tick(REVEAL_AT);
    assert!(c.state().visible, "mascot should be visible after the reveal delay");
    c
}
