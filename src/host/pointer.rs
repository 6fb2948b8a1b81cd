//! Tracks where the OS thinks the pointer is, using an [rdev] listener on its own thread.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Result};
use rdev::{listen, Event, EventType, ListenError};
use t9_glove_lib::decode::Position;

pub struct PointerTracker {
    position: Arc<Mutex<Option<Position>>>,
    listener: Option<JoinHandle<Result<(), ListenError>>>,
}

impl PointerTracker {
    pub fn spawn() -> Result<Self> {
        let position = Arc::new(Mutex::new(None));
        let shared = Arc::clone(&position);
        let listener = thread::Builder::new()
            .name("pointer".into())
            .spawn(move || {
                listen(move |event: Event| {
                    if let EventType::MouseMove { x, y } = event.event_type {
                        if let Ok(mut latest) = shared.lock() {
                            *latest = Some(to_position(x, y));
                        }
                    }
                })
            })
            .context("spawning pointer listener thread")?;
        Ok(PointerTracker { position, listener: Some(listener) })
    }

    /// Latest reported position, or None until the pointer has moved at least once.
    pub fn position(&self) -> Option<Position> {
        self.position.lock().ok().and_then(|latest| *latest)
    }

    /// Errors once the listener thread has stopped; there are no more positions coming.
    pub fn ensure_running(&mut self) -> Result<()> {
        let Some(listener) = self.listener.take_if(|l| l.is_finished()) else {
            return Ok(());
        };
        match listener.join() {
            Ok(Ok(())) => Err(anyhow!("pointer listener exited")),
            Ok(Err(e)) => Err(anyhow!("pointer listener failed: {:?}", e)),
            Err(_) => Err(anyhow!("pointer listener panicked")),
        }
    }
}

/// OS coordinates come in as floats; the decoder works in whole units.
fn to_position(x: f64, y: f64) -> Position {
    Position::new(x.round() as i32, y.round() as i32)
}
