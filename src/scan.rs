//! Implements key matrix scanning: finding which key went down, debouncing its release, and
//! enforcing the refractory period between emissions. Uses the layout from [crate::catalog]; the
//! firmware turns each emitted [Key] into a mouse report and a feedback pulse.
//!
//! Pin access goes through [MatrixPins] so the scanning logic can be driven by a fake matrix in
//! unit tests.

use crate::catalog::{Key, COLUMNS, LAYOUT, ROWS};
use crate::Millis;
use log::{debug, trace};

/// Minimum time between any two emissions, across all keys.
pub const DEFAULT_REFRACTORY_MS: Millis = 300;
/// Consecutive inactive scans before a key counts as released.
pub const DEFAULT_RELEASE_DEBOUNCE_SCANS: u8 = 3;

#[derive(Clone, Copy, Debug)]
pub struct ScanConfig {
    pub refractory_ms: Millis,
    pub release_debounce_scans: u8,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            refractory_ms: DEFAULT_REFRACTORY_MS,
            release_debounce_scans: DEFAULT_RELEASE_DEBOUNCE_SCANS,
        }
    }
}

/// Row strobing and column sensing for the keypad.
pub trait MatrixPins {
    /// Drive a row active. Implementations should wait for the lines to settle before returning.
    fn select_row(&mut self, row: usize);
    fn release_row(&mut self, row: usize);
    /// Whether a column reads active while its row is selected.
    fn column_active(&mut self, column: usize) -> bool;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Idle,
    /// Down, but held off by the refractory period
    Pressed,
    /// Down and already emitted
    Held,
}

#[derive(Clone, Copy, Default)]
struct KeyHold {
    phase: Phase,
    debounce_count: u8,
}

pub struct Matrix<P> {
    pins: P,
    holds: [[KeyHold; COLUMNS]; ROWS],
    last_emission: Option<Millis>,
    config: ScanConfig,
}

impl<P: MatrixPins> Matrix<P> {
    pub fn new(pins: P, config: ScanConfig) -> Self {
        Matrix {
            pins,
            holds: Default::default(),
            last_emission: None,
            config,
        }
    }

    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    /// Forget all held keys and the refractory timer, e.g. after the host goes away.
    pub fn reset(&mut self) {
        self.holds = Default::default();
        self.last_emission = None;
    }

    fn refractory_elapsed(&self, now: Millis) -> bool {
        match self.last_emission {
            None => true,
            Some(at) => now.saturating_sub(at) >= self.config.refractory_ms,
        }
    }

    /// Runs one pass over the whole matrix, returning the key to emit if one fired.
    ///
    /// At most one key fires per pass, and a key fires at most once per press: it must be released
    /// (for [ScanConfig::release_debounce_scans] passes) before it can fire again.
    pub fn scan(&mut self, now: Millis) -> Option<Key> {
        let mut fired = None;
        let mut may_fire = self.refractory_elapsed(now);

        for row_idx in 0..ROWS {
            self.pins.select_row(row_idx);
            for column_idx in 0..COLUMNS {
                let active = self.pins.column_active(column_idx);
                let hold = &mut self.holds[row_idx][column_idx];
                if active {
                    hold.debounce_count = self.config.release_debounce_scans;
                    match hold.phase {
                        Phase::Held => {}
                        Phase::Idle | Phase::Pressed if may_fire => {
                            let key = LAYOUT[row_idx][column_idx];
                            debug!("key {:?} fired at {}ms", key, now);
                            hold.phase = Phase::Held;
                            fired = Some(key);
                            may_fire = false;
                        }
                        Phase::Idle | Phase::Pressed => {
                            hold.phase = Phase::Pressed;
                        }
                    }
                } else if hold.phase != Phase::Idle {
                    hold.debounce_count = hold.debounce_count.saturating_sub(1);
                    if hold.debounce_count == 0 {
                        trace!("key {:?} released", LAYOUT[row_idx][column_idx]);
                        hold.phase = Phase::Idle;
                    }
                }
            }
            self.pins.release_row(row_idx);
        }

        if fired.is_some() {
            self.last_emission = Some(now);
        }
        fired
    }
}

/// Haptic (or audible) acknowledgement of a key press. Fire-and-forget.
pub trait Feedback {
    /// `strength` is a PWM duty out of [u16::MAX].
    fn pulse(&mut self, strength: u16, duration_ms: Millis);
}

/// Flips keypad mode on each press of a momentary button.
#[derive(Default)]
pub struct ModeSwitch {
    was_pressed: bool,
    armed: bool,
}

impl ModeSwitch {
    pub const fn new(armed: bool) -> Self {
        ModeSwitch { was_pressed: false, armed }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Feed the current button level. Returns the new mode when it changed.
    pub fn update(&mut self, pressed: bool) -> Option<bool> {
        let edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        if edge {
            self.armed = !self.armed;
            Some(self.armed)
        } else {
            None
        }
    }
}
