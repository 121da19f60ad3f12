//! Deadline table driven by a single clock.
//!
//! Each timer kind has at most one pending deadline (epoch ms). The controller
//! pops due timers in deadline order on every tick; equal deadlines fire in the
//! declaration order of [`TimerKind`].

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Clears the caught state once the hide window has elapsed.
    CaughtExpiry,
    /// Makes the mascot visible (initial delay or end of a temporary hide).
    Reveal,
    /// Ends the current peek / run / dodge hold.
    MotionEnd,
    /// Sends a running mascot toward the far side.
    RunLaunch,
    /// Proximity sampling cadence.
    Sample,
    /// Motion planner cadence.
    Action,
}

impl TimerKind {
    pub const ALL: [TimerKind; 6] = [
        TimerKind::CaughtExpiry,
        TimerKind::Reveal,
        TimerKind::MotionEnd,
        TimerKind::RunLaunch,
        TimerKind::Sample,
        TimerKind::Action,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    deadlines: [Option<f64>; 6],
}

impl Scheduler {
    pub fn arm(&mut self, kind: TimerKind, at: f64) {
        self.deadlines[kind.slot()] = Some(at);
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.deadlines[kind.slot()] = None;
    }

    pub fn cancel_all(&mut self) {
        self.deadlines = [None; 6];
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<f64> {
        self.deadlines[kind.slot()]
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.deadline(kind).is_some()
    }

    pub fn is_idle(&self) -> bool {
        self.deadlines.iter().all(Option::is_none)
    }

    /// Remove and return the earliest timer due at `now`, with its deadline.
    pub fn pop_due(&mut self, now: f64) -> Option<(TimerKind, f64)> {
        let mut best: Option<(TimerKind, f64)> = None;
        for kind in TimerKind::ALL {
            if let Some(at) = self.deadline(kind) {
                if at > now {
                    continue;
                }
                // strict < keeps the first declared kind on ties
                if best.is_none_or(|(_, b)| at < b) {
                    best = Some((kind, at));
                }
            }
        }
        if let Some((kind, _)) = best {
            self.cancel(kind);
        }
        best
    }
}
