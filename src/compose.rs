//! Multi-tap text entry: repeated presses of a letter key cycle through its group, and the chosen
//! character is committed once another key arrives or the key goes idle.
//!
//! Everything the composer produces goes to a [TextSink] straight away; nothing is buffered
//! beyond the one pending multi-tap group.

use crate::catalog::{Key, Role};
use crate::decode::KeyEvent;
use crate::Millis;
use log::{info, trace};

pub const DEFAULT_FLUSH_TIMEOUT_MS: Millis = 500;

#[derive(Clone, Copy, Debug)]
pub struct ComposerConfig {
    pub flush_timeout_ms: Millis,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        ComposerConfig { flush_timeout_ms: DEFAULT_FLUSH_TIMEOUT_MS }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    Char(char),
    Space,
    Enter,
    Backspace,
    /// Case after the toggle; true is upper case
    CaseToggled(bool),
    /// Number mode after the toggle
    NumberModeToggled(bool),
}

/// Receives everything the composer commits.
pub trait TextSink {
    fn commit(&mut self, output: Output);
}

impl<F: FnMut(Output)> TextSink for F {
    fn commit(&mut self, output: Output) {
        self(output)
    }
}

/// Pending multi-tap group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pending {
    key: Key,
    press_count: usize,
    last_press: Millis,
}

pub struct Composer {
    config: ComposerConfig,
    pending: Option<Pending>,
    upper_case: bool,
    number_mode: bool,
}

impl Composer {
    pub fn new(config: ComposerConfig) -> Self {
        Composer {
            config,
            pending: None,
            upper_case: false,
            number_mode: false,
        }
    }

    pub fn is_upper_case(&self) -> bool {
        self.upper_case
    }

    pub fn is_number_mode(&self) -> bool {
        self.number_mode
    }

    /// The key currently being cycled, if any.
    pub fn pending_key(&self) -> Option<Key> {
        self.pending.map(|p| p.key)
    }

    /// Back to a fresh session. Whatever was pending is dropped, not committed.
    pub fn reset(&mut self) {
        *self = Composer::new(self.config);
    }

    pub fn handle(&mut self, event: KeyEvent, sink: &mut impl TextSink) {
        let KeyEvent { key, at } = event;
        if self.number_mode {
            if let Some(digit) = key.digit() {
                self.flush(sink);
                self.emit(sink, Output::Char(digit));
                return;
            }
        }

        let role = key.role();
        if let Role::Letters(_) = role {
            self.update_key(key, at, sink);
            return;
        }

        self.flush(sink);
        match role {
            Role::Space => self.emit(sink, Output::Space),
            Role::Enter => self.emit(sink, Output::Enter),
            Role::Backspace => self.emit(sink, Output::Backspace),
            Role::CaseToggle => {
                self.upper_case = !self.upper_case;
                info!("upper case {}", if self.upper_case { "on" } else { "off" });
                self.emit(sink, Output::CaseToggled(self.upper_case));
            }
            Role::NumberToggle => {
                self.number_mode = !self.number_mode;
                info!("number mode {}", if self.number_mode { "on" } else { "off" });
                self.emit(sink, Output::NumberModeToggled(self.number_mode));
            }
            Role::Inactive | Role::Letters(_) => {}
        }
    }

    /// Another press of the same key within the timeout advances the cycle, anything else
    /// commits the pending group and starts a new one.
    pub fn update_key(&mut self, key: Key, now: Millis, sink: &mut impl TextSink) {
        if let Some(p) = self.pending.as_mut() {
            if p.key == key && now.saturating_sub(p.last_press) < self.config.flush_timeout_ms {
                p.press_count += 1;
                p.last_press = now;
                return;
            }
        }
        self.flush(sink);
        self.pending = Some(Pending { key, press_count: 0, last_press: now });
    }

    /// Commit the pending character, if there is one.
    pub fn flush(&mut self, sink: &mut impl TextSink) {
        let Some(pending) = self.pending.take() else { return };
        let Role::Letters(chars) = pending.key.role() else { return };
        let count = chars.chars().count();
        if let Some(c) = chars.chars().nth(pending.press_count % count) {
            let c = if self.upper_case { c.to_ascii_uppercase() } else { c };
            self.emit(sink, Output::Char(c));
        }
    }

    /// Flush once the pending key has been idle past the timeout. Call this from the same loop
    /// that feeds events, so the last letter of a word comes out without another press.
    pub fn poll_idle(&mut self, now: Millis, sink: &mut impl TextSink) {
        if let Some(p) = self.pending {
            if now.saturating_sub(p.last_press) > self.config.flush_timeout_ms {
                self.flush(sink);
            }
        }
    }

    fn emit(&self, sink: &mut impl TextSink, output: Output) {
        trace!("commit {:?}", output);
        sink.commit(output);
    }
}

impl Default for Composer {
    fn default() -> Self {
        Composer::new(ComposerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<Output>);

    impl TextSink for Recorder {
        fn commit(&mut self, output: Output) {
            self.0.push(output);
        }
    }

    fn press(c: &mut Composer, out: &mut Recorder, key: Key, at: Millis) {
        c.handle(KeyEvent { key, at }, out);
    }

    fn chars(out: &Recorder) -> String {
        out.0.iter().filter_map(|o| match o {
            Output::Char(c) => Some(*c),
            Output::Space => Some(' '),
            _ => None,
        }).collect()
    }

    #[test]
    fn three_taps_then_idle_gives_third_letter() {
        let mut c = Composer::default();
        let mut out = Recorder::default();
        press(&mut c, &mut out, Key::K2, 0);
        press(&mut c, &mut out, Key::K2, 300);
        press(&mut c, &mut out, Key::K2, 600);
        assert!(out.0.is_empty());
        c.poll_idle(1100, &mut out);
        assert!(out.0.is_empty());
        c.poll_idle(1101, &mut out);
        assert_eq!(out.0, vec![Output::Char('c')]);
        c.poll_idle(5000, &mut out);
        assert_eq!(out.0.len(), 1);
    }

    #[test]
    fn different_key_commits_previous() {
        let mut c = Composer::default();
        let mut out = Recorder::default();
        press(&mut c, &mut out, Key::K2, 0);
        press(&mut c, &mut out, Key::K3, 100);
        assert_eq!(out.0, vec![Output::Char('a')]);
        c.poll_idle(700, &mut out);
        assert_eq!(out.0, vec![Output::Char('a'), Output::Char('d')]);
    }

    #[test]
    fn slow_repeat_starts_a_new_letter() {
        let mut c = Composer::default();
        let mut out = Recorder::default();
        press(&mut c, &mut out, Key::K5, 0);
        press(&mut c, &mut out, Key::K5, 500);
        assert_eq!(out.0, vec![Output::Char('j')]);
        assert_eq!(c.pending_key(), Some(Key::K5));
    }

    #[test]
    fn cycling_wraps_around_the_group() {
        let mut c = Composer::default();
        let mut out = Recorder::default();
        for i in 0..5 {
            press(&mut c, &mut out, Key::K7, i * 100);
        }
        c.flush(&mut out);
        assert_eq!(out.0, vec![Output::Char('p')]);
    }

    #[test]
    fn punctuation_key_cycles_too() {
        let mut c = Composer::default();
        let mut out = Recorder::default();
        for i in 0..4 {
            press(&mut c, &mut out, Key::K1, i * 100);
        }
        c.flush(&mut out);
        assert_eq!(out.0, vec![Output::Char('?')]);
    }

    #[test]
    fn flush_on_empty_is_a_no_op() {
        let mut c = Composer::default();
        let mut out = Recorder::default();
        c.flush(&mut out);
        c.flush(&mut out);
        c.poll_idle(10_000, &mut out);
        assert!(out.0.is_empty());
        assert_eq!(c.pending_key(), None);
    }

    #[test]
    fn number_mode_types_digits_directly() {
        let mut c = Composer::default();
        let mut out = Recorder::default();
        press(&mut c, &mut out, Key::B, 0);
        press(&mut c, &mut out, Key::K2, 10);
        assert_eq!(out.0, vec![Output::NumberModeToggled(true), Output::Char('2')]);
        assert_eq!(c.pending_key(), None);
        press(&mut c, &mut out, Key::K0, 20);
        press(&mut c, &mut out, Key::K1, 30);
        assert_eq!(chars(&out), "201");
    }

    #[test]
    fn number_mode_leaves_control_keys_alone() {
        let mut c = Composer::default();
        let mut out = Recorder::default();
        press(&mut c, &mut out, Key::B, 0);
        press(&mut c, &mut out, Key::D, 10);
        press(&mut c, &mut out, Key::A, 20);
        press(&mut c, &mut out, Key::B, 30);
        assert_eq!(
            out.0,
            vec![
                Output::NumberModeToggled(true),
                Output::Enter,
                Output::Backspace,
                Output::NumberModeToggled(false),
            ]
        );
    }

    #[test]
    fn entering_number_mode_commits_pending_letter() {
        let mut c = Composer::default();
        let mut out = Recorder::default();
        press(&mut c, &mut out, Key::K6, 0);
        press(&mut c, &mut out, Key::K6, 100);
        press(&mut c, &mut out, Key::B, 200);
        press(&mut c, &mut out, Key::K6, 300);
        assert_eq!(
            out.0,
            vec![Output::Char('n'), Output::NumberModeToggled(true), Output::Char('6')]
        );
    }

    #[test]
    fn case_toggle_applies_to_later_letters() {
        let mut c = Composer::default();
        let mut out = Recorder::default();
        press(&mut c, &mut out, Key::Star, 0);
        press(&mut c, &mut out, Key::K2, 100);
        press(&mut c, &mut out, Key::K2, 200);
        press(&mut c, &mut out, Key::K2, 300);
        c.poll_idle(900, &mut out);
        assert_eq!(out.0, vec![Output::CaseToggled(true), Output::Char('C')]);
        assert!(c.is_upper_case());
    }

    #[test]
    fn case_toggle_flushes_pending_in_old_case() {
        let mut c = Composer::default();
        let mut out = Recorder::default();
        press(&mut c, &mut out, Key::K4, 0);
        press(&mut c, &mut out, Key::Star, 100);
        assert_eq!(out.0, vec![Output::Char('g'), Output::CaseToggled(true)]);
    }

    #[test]
    fn control_keys_flush_then_act() {
        let mut c = Composer::default();
        let mut out = Recorder::default();
        press(&mut c, &mut out, Key::K4, 0);
        press(&mut c, &mut out, Key::K4, 100);
        press(&mut c, &mut out, Key::K0, 200);
        press(&mut c, &mut out, Key::K8, 300);
        press(&mut c, &mut out, Key::D, 400);
        press(&mut c, &mut out, Key::A, 500);
        assert_eq!(
            out.0,
            vec![
                Output::Char('h'),
                Output::Space,
                Output::Char('t'),
                Output::Enter,
                Output::Backspace,
            ]
        );
    }

    #[test]
    fn inactive_keys_only_flush() {
        let mut c = Composer::default();
        let mut out = Recorder::default();
        press(&mut c, &mut out, Key::K9, 0);
        press(&mut c, &mut out, Key::C, 100);
        press(&mut c, &mut out, Key::Hash, 200);
        assert_eq!(out.0, vec![Output::Char('w')]);
    }

    #[test]
    fn reset_drops_pending_and_modes() {
        let mut c = Composer::default();
        let mut out = Recorder::default();
        press(&mut c, &mut out, Key::Star, 0);
        press(&mut c, &mut out, Key::B, 10);
        press(&mut c, &mut out, Key::K3, 20);
        press(&mut c, &mut out, Key::B, 30);
        press(&mut c, &mut out, Key::K3, 40);
        c.reset();
        assert_eq!(c.pending_key(), None);
        assert!(!c.is_upper_case());
        assert!(!c.is_number_mode());
        c.poll_idle(10_000, &mut out);
        assert_eq!(out.0.last(), Some(&Output::NumberModeToggled(false)));
    }

    #[test]
    fn closures_work_as_sinks() {
        let mut c = Composer::default();
        let mut typed = String::new();
        let mut sink = |o: Output| if let Output::Char(ch) = o { typed.push(ch) };
        c.handle(KeyEvent { key: Key::K8, at: 0 }, &mut sink);
        c.handle(KeyEvent { key: Key::K8, at: 100 }, &mut sink);
        c.poll_idle(700, &mut sink);
        assert_eq!(typed, "u");
    }
}
