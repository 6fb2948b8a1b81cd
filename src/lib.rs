//! Core of the T9 glove: the keypad catalog, matrix scanning, gesture decoding and multi-tap
//! composition. Kept free of hardware and OS dependencies so the firmware (`src/main.rs`) and the host
//! listener (`src/host`) can share it, and so unit tests run on the local arch.
//!
//! Run tests with `cargo test --lib`; default features are empty so nothing embedded gets built.

#![cfg_attr(not(test), no_std)]

pub mod catalog;
pub mod compose;
pub mod decode;
pub mod scan;
pub mod session;

/// Timestamps and durations in milliseconds, from whatever clock drives the caller's loop.
pub type Millis = u64;
