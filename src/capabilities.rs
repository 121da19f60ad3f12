//! Host capabilities the controller consumes: key/value storage, tone output and
//! randomness. Every implementation is infallible from the caller's side; the
//! browser adapters in [`crate::web`] swallow and log their own failures.

use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

// --- Storage -----------------------------------------------------------------

/// Persisted "caught" flag (`"true"` when set).
pub const CAUGHT_KEY: &str = "cupid_caught";
/// Epoch-millisecond timestamp until which the mascot stays hidden / caught.
pub const HIDDEN_UNTIL_KEY: &str = "cupid_hidden_until";

/// Plain string key/value store (`localStorage` in the browser).
/// Reads return `None` when the backing store is unavailable; writes are best-effort.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store, used as the fallback when no browser storage exists and in tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

// --- Tones -------------------------------------------------------------------

/// One oscillator sweep, frequencies in Hz and times in ms relative to the tone start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sweep {
    pub start_hz: f64,
    pub end_hz: f64,
    pub delay_ms: f64,
    pub duration_ms: f64,
}

/// Feedback sounds emitted by the interaction resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    /// Two-stage descending pop, played on a catch.
    Pop,
    /// Single short low sweep, played on a miss.
    Miss,
}

const POP_SWEEPS: [Sweep; 2] = [
    Sweep { start_hz: 880.0, end_hz: 440.0, delay_ms: 0.0, duration_ms: 100.0 },
    Sweep { start_hz: 660.0, end_hz: 220.0, delay_ms: 110.0, duration_ms: 150.0 },
];

const MISS_SWEEPS: [Sweep; 1] = [
    Sweep { start_hz: 220.0, end_hz: 110.0, delay_ms: 0.0, duration_ms: 150.0 },
];

impl Tone {
    pub fn sweeps(self) -> &'static [Sweep] {
        match self {
            Tone::Pop => &POP_SWEEPS,
            Tone::Miss => &MISS_SWEEPS,
        }
    }
}

pub trait ToneEmitter {
    /// Play `tone`. Must never panic; unavailable audio is a silent no-op.
    fn play(&mut self, tone: Tone);
}

/// No-op emitter for hosts without audio.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentTones;

impl ToneEmitter for SilentTones {
    fn play(&mut self, _tone: Tone) {}
}

/// Records every tone requested. Handy for asserting resolver feedback.
#[derive(Clone, Debug, Default)]
pub struct ToneLog {
    pub played: Vec<Tone>,
}

impl ToneEmitter for ToneLog {
    fn play(&mut self, tone: Tone) {
        self.played.push(tone);
    }
}

// --- Randomness ----------------------------------------------------------------

/// Uniform random draws for action and preset selection.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..len`; `0` when `len == 0`.
    fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }
}

/// Seedable small PRNG. Browser builds seed it from `crypto.getRandomValues`.
#[derive(Clone, Debug)]
pub struct SeededRandom(SmallRng);

impl SeededRandom {
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(SmallRng::from_entropy())
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }
}
