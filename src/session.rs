//! One connected typing session on the host: the [Decoder] and [Composer] driven together from a
//! single polling loop.

use crate::compose::{Composer, ComposerConfig, TextSink};
use crate::decode::{Decoder, DecoderConfig, KeyEvent, Position};
use crate::Millis;

pub struct Session {
    decoder: Decoder,
    composer: Composer,
}

impl Session {
    pub fn new(decoder: DecoderConfig, composer: ComposerConfig, now: Millis) -> Self {
        Session {
            decoder: Decoder::new(decoder, now),
            composer: Composer::new(composer),
        }
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// One tick of the loop: decode the latest pointer position (if the pointer has reported one
    /// yet), hand any recognised key to the composer, then flush an idle multi-tap group.
    pub fn poll(
        &mut self,
        position: Option<Position>,
        now: Millis,
        sink: &mut impl TextSink,
    ) -> Option<KeyEvent> {
        let event = position.and_then(|p| self.decoder.sample(p, now));
        if let Some(event) = event {
            self.composer.handle(event, sink);
        }
        self.composer.poll_idle(now, sink);
        event
    }

    /// The link went away. Anything half-typed is dropped and modes go back to defaults.
    pub fn disconnect(&mut self) {
        self.composer.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Key;
    use crate::compose::Output;

    fn session() -> Session {
        Session::new(DecoderConfig::default(), ComposerConfig::default(), 0)
    }

    #[test]
    fn no_position_still_flushes_idle_letters() {
        let mut s = session();
        let mut out = Vec::new();
        let mut sink = |o: Output| out.push(o);
        assert_eq!(s.poll(Some(Position::new(0, 0)), 0, &mut sink), None);
        let v = Key::K6.vector();
        let p = Position::new(v.dx.into(), v.dy.into());
        assert_eq!(s.poll(Some(p), 300, &mut sink), Some(KeyEvent { key: Key::K6, at: 300 }));
        assert_eq!(s.poll(None, 700, &mut sink), None);
        assert_eq!(s.poll(None, 801, &mut sink), None);
        assert_eq!(out, vec![Output::Char('m')]);
    }

    #[test]
    fn disconnect_drops_pending_letter() {
        let mut s = session();
        let mut out = Vec::new();
        let mut sink = |o: Output| out.push(o);
        s.poll(Some(Position::new(0, 0)), 0, &mut sink);
        let v = Key::K6.vector();
        s.poll(Some(Position::new(v.dx.into(), v.dy.into())), 300, &mut sink);
        s.disconnect();
        assert_eq!(s.composer().pending_key(), None);
        s.poll(None, 2000, &mut sink);
        assert!(out.is_empty());
    }
}
