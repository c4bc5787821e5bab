//! Platform abstraction layer
//!
//! The game reads wall-clock time and pointer input through these seams so
//! the host (browser, native window, test harness) decides where they come
//! from.

use glam::Vec2;

use crate::sim::{InputKind, PointerSample};

/// Monotonic wall-clock time in milliseconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Latest pointer reading. Hosts overwrite it from event handlers; the game
/// samples it once per tick, so the last write before a tick wins.
pub trait InputSource {
    fn last_pointer_position(&self) -> Option<Vec2>;
    fn last_input_kind(&self) -> InputKind;

    fn sample(&self) -> Option<PointerSample> {
        self.last_pointer_position().map(|position| PointerSample {
            position,
            kind: self.last_input_kind(),
        })
    }
}

/// Real time since construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: std::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock that only moves when told to (scripted runs, tests)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualClock {
    now: f64,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self { now: start }
    }

    pub fn advance(&mut self, ms: f64) {
        self.now += ms.max(0.0);
    }

    pub fn set(&mut self, now: f64) {
        self.now = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now
    }
}

/// Plain last-write-wins pointer state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    position: Option<Vec2>,
    kind: InputKind,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, position: Vec2, kind: InputKind) {
        self.position = Some(position);
        self.kind = kind;
    }

    /// Pointer left the surface
    pub fn clear(&mut self) {
        self.position = None;
    }
}

impl InputSource for PointerState {
    fn last_pointer_position(&self) -> Option<Vec2> {
        self.position
    }

    fn last_input_kind(&self) -> InputKind {
        self.kind
    }
}
