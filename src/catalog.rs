//! Defines the 16 keypad [Key]s, the relative-motion [Vector] that stands in for each of them on
//! the wire, and the [Role] each key plays when composing text.
//!
//! The [Vector] table is shared by both ends of the link: [crate::scan] emits a key's vector as a
//! mouse report, and [crate::decode] turns observed pointer displacements back into keys.

/// One of the symbols on the 4×4 keypad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    K0, K1, K2, K3, K4, K5, K6, K7, K8, K9,
    A, B, C, D,
    Star,
    Hash,
}

/// A relative pointer displacement, as carried by a HID mouse report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Vector {
    pub dx: i8,
    pub dy: i8,
}

const fn v(dx: i8, dy: i8) -> Vector {
    Vector { dx, dy }
}

/// What a key does once it reaches the text composer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Multi-tap group, cycled through on repeated presses
    Letters(&'static str),
    Space,
    Enter,
    Backspace,
    CaseToggle,
    NumberToggle,
    Inactive,
}

/// How many physical rows there are
pub const ROWS: usize = 4;
/// How many physical columns there are
pub const COLUMNS: usize = 4;

/// Physical arrangement of the keypad, as wired to the row and column pins.
pub const LAYOUT: [[Key; COLUMNS]; ROWS] = {
    use Key::*;
    [
        [D, C, B, A],
        [Hash, K9, K6, K3],
        [K0, K8, K5, K2],
        [Star, K7, K4, K1],
    ]
};

/// Vector for each key, indexed by [Key::index]. Every entry is distinct.
const VECTORS: [Vector; 16] = [
    v(-50, 50),    // 0
    v(10, -10),    // 1
    v(-20, 20),    // 2
    v(15, -30),    // 3
    v(-25, -25),   // 4
    v(30, -15),    // 5
    v(-15, 30),    // 6
    v(40, -40),    // 7
    v(-35, 10),    // 8
    v(25, -5),     // 9
    v(60, -60),    // A
    v(-70, 70),    // B
    v(80, -10),    // C
    v(-90, 90),    // D
    v(100, -100),  // *
    v(-110, 110),  // #
];

impl Key {
    pub const ALL: [Key; 16] = {
        use Key::*;
        [K0, K1, K2, K3, K4, K5, K6, K7, K8, K9, A, B, C, D, Star, Hash]
    };

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The motion vector this key is sent as.
    pub const fn vector(self) -> Vector {
        VECTORS[self.index()]
    }

    /// The digit typed by this key in number mode, if it has one.
    pub const fn digit(self) -> Option<char> {
        match self {
            Key::K0 => Some('0'),
            Key::K1 => Some('1'),
            Key::K2 => Some('2'),
            Key::K3 => Some('3'),
            Key::K4 => Some('4'),
            Key::K5 => Some('5'),
            Key::K6 => Some('6'),
            Key::K7 => Some('7'),
            Key::K8 => Some('8'),
            Key::K9 => Some('9'),
            _ => None,
        }
    }

    pub const fn role(self) -> Role {
        match self {
            Key::K1 => Role::Letters(".,!?"),
            Key::K2 => Role::Letters("abc"),
            Key::K3 => Role::Letters("def"),
            Key::K4 => Role::Letters("ghi"),
            Key::K5 => Role::Letters("jkl"),
            Key::K6 => Role::Letters("mno"),
            Key::K7 => Role::Letters("pqrs"),
            Key::K8 => Role::Letters("tuv"),
            Key::K9 => Role::Letters("wxyz"),
            Key::K0 => Role::Space,
            Key::A => Role::Backspace,
            Key::D => Role::Enter,
            Key::Star => Role::CaseToggle,
            Key::B => Role::NumberToggle,
            Key::C | Key::Hash => Role::Inactive,
        }
    }
}

pub const fn vector_for(key: Key) -> Vector {
    key.vector()
}

/// Exact-match lookup. Anything not literally in the table is not a gesture.
pub fn key_for(vector: Vector) -> Option<Key> {
    Key::ALL.into_iter().find(|key| key.vector() == vector)
}

/// Nearest-match lookup, accepting the closest key within `tolerance` units on both axes.
///
/// Displacements are taken as `i32` since an observed pointer delta isn't bounded to a report's
/// range. Two keys equally close is treated as no match. A `tolerance` of 0 is [key_for].
pub fn key_for_within(dx: i32, dy: i32, tolerance: u16) -> Option<Key> {
    let tolerance = u32::from(tolerance);
    let mut best: Option<(Key, u32)> = None;
    let mut tied = false;
    for key in Key::ALL {
        let Vector { dx: kx, dy: ky } = key.vector();
        let distance = dx.abs_diff(i32::from(kx)).max(dy.abs_diff(i32::from(ky)));
        if distance > tolerance {
            continue;
        }
        match best {
            Some((_, d)) if d < distance => {}
            Some((_, d)) if d == distance => tied = true,
            _ => {
                best = Some((key, distance));
                tied = false;
            }
        }
    }
    if tied { None } else { best.map(|(key, _)| key) }
}
