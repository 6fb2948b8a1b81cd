//! Turns a stream of pointer positions back into keypad presses.
//!
//! The device sends each key as one relative mouse report (see [crate::catalog]). The host only
//! sees where the pointer ends up, so the decoder watches consecutive positions and treats a jump
//! past the noise floor as a candidate gesture.

use crate::catalog::{self, Key, Vector};
use crate::Millis;
use log::{debug, trace};

pub const DEFAULT_NOISE_FLOOR: u16 = 5;
pub const DEFAULT_COOLDOWN_MS: Millis = 200;

#[derive(Clone, Copy, Debug)]
pub struct DecoderConfig {
    /// Displacements must exceed this on at least one axis to be considered.
    pub noise_floor: u16,
    /// Minimum time after a recognised gesture before another is accepted.
    pub cooldown_ms: Millis,
    /// 0 means exact matching against the catalog. Anything else allows the nearest key within
    /// that many units, which will also accept some motion that exact matching would reject.
    pub tolerance: u16,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            noise_floor: DEFAULT_NOISE_FLOOR,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            tolerance: 0,
        }
    }
}

/// A pointer position in screen units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub at: Millis,
}

pub struct Decoder {
    config: DecoderConfig,
    last_position: Option<Position>,
    last_trigger: Millis,
}

impl Decoder {
    /// `now` counts as the last trigger, so nothing is recognised within the first cooldown.
    pub fn new(config: DecoderConfig, now: Millis) -> Self {
        Decoder {
            config,
            last_position: None,
            last_trigger: now,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Feed one polled position. Displacement is always measured from the previous sample,
    /// recognised or not.
    pub fn sample(&mut self, position: Position, now: Millis) -> Option<KeyEvent> {
        let previous = self.last_position.replace(position)?;
        let dx = position.x.saturating_sub(previous.x);
        let dy = position.y.saturating_sub(previous.y);

        let floor = u32::from(self.config.noise_floor);
        if dx.unsigned_abs() <= floor && dy.unsigned_abs() <= floor {
            return None;
        }
        if now.saturating_sub(self.last_trigger) <= self.config.cooldown_ms {
            trace!("motion ({}, {}) inside cooldown", dx, dy);
            return None;
        }

        match self.classify(dx, dy) {
            Some(key) => {
                debug!("gesture ({}, {}) -> {:?}", dx, dy, key);
                self.last_trigger = now;
                Some(KeyEvent { key, at: now })
            }
            None => {
                debug!("motion ({}, {}) matches no key", dx, dy);
                None
            }
        }
    }

    fn classify(&self, dx: i32, dy: i32) -> Option<Key> {
        if self.config.tolerance > 0 {
            return catalog::key_for_within(dx, dy, self.config.tolerance);
        }
        let vector = Vector {
            dx: i8::try_from(dx).ok()?,
            dy: i8::try_from(dy).ok()?,
        };
        catalog::key_for(vector)
    }
}
