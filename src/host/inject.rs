//! Types composed output into whatever window has focus, by simulating key events with [rdev].

use std::thread;
use std::time::Duration;

use log::{info, warn};
use rdev::{simulate, EventType, Key};
use t9_glove_lib::compose::{Output, TextSink};

/// Some platforms drop simulated events that arrive back to back.
const EVENT_GAP: Duration = Duration::from_millis(10);

pub struct Injector {
    dry_run: bool,
}

impl Injector {
    /// With `dry_run` set, output is printed instead of typed.
    pub fn new(dry_run: bool) -> Self {
        Injector { dry_run }
    }

    fn tap(&self, key: Key, shift: bool) {
        if shift {
            send(EventType::KeyPress(Key::ShiftLeft));
        }
        send(EventType::KeyPress(key));
        send(EventType::KeyRelease(key));
        if shift {
            send(EventType::KeyRelease(Key::ShiftLeft));
        }
    }
}

fn send(event: EventType) {
    if let Err(e) = simulate(&event) {
        warn!("could not simulate {:?}: {:?}", event, e);
    }
    thread::sleep(EVENT_GAP);
}

impl TextSink for Injector {
    fn commit(&mut self, output: Output) {
        if self.dry_run {
            println!("{:?}", output);
            return;
        }
        match output {
            Output::Char(c) => match key_for_char(c) {
                Some((key, shift)) => self.tap(key, shift),
                None => warn!("no key for {:?}", c),
            },
            Output::Space => self.tap(Key::Space, false),
            Output::Enter => self.tap(Key::Return, false),
            Output::Backspace => self.tap(Key::Backspace, false),
            Output::CaseToggled(upper) => info!("{}", if upper { "UPPER" } else { "lower" }),
            Output::NumberModeToggled(on) => info!("number mode {}", if on { "ON" } else { "OFF" }),
        }
    }
}

/// Physical key (on a US layout) and whether shift is needed, for every character the keypad
/// can produce.
fn key_for_char(c: char) -> Option<(Key, bool)> {
    let shift = c.is_ascii_uppercase();
    let key = match c.to_ascii_lowercase() {
        'a' => Key::KeyA,
        'b' => Key::KeyB,
        'c' => Key::KeyC,
        'd' => Key::KeyD,
        'e' => Key::KeyE,
        'f' => Key::KeyF,
        'g' => Key::KeyG,
        'h' => Key::KeyH,
        'i' => Key::KeyI,
        'j' => Key::KeyJ,
        'k' => Key::KeyK,
        'l' => Key::KeyL,
        'm' => Key::KeyM,
        'n' => Key::KeyN,
        'o' => Key::KeyO,
        'p' => Key::KeyP,
        'q' => Key::KeyQ,
        'r' => Key::KeyR,
        's' => Key::KeyS,
        't' => Key::KeyT,
        'u' => Key::KeyU,
        'v' => Key::KeyV,
        'w' => Key::KeyW,
        'x' => Key::KeyX,
        'y' => Key::KeyY,
        'z' => Key::KeyZ,
        '0' => Key::Num0,
        '1' => Key::Num1,
        '2' => Key::Num2,
        '3' => Key::Num3,
        '4' => Key::Num4,
        '5' => Key::Num5,
        '6' => Key::Num6,
        '7' => Key::Num7,
        '8' => Key::Num8,
        '9' => Key::Num9,
        '.' => Key::Dot,
        ',' => Key::Comma,
        '!' => return Some((Key::Num1, true)),
        '?' => return Some((Key::Slash, true)),
        ' ' => Key::Space,
        _ => return None,
    };
    Some((key, shift))
}
