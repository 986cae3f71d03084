#![no_std]

// Shared logic for the kitchen timer.
//
// Everything here is hardware-free so the same state machine runs on the
// STM32 firmware, inside the host emulator, and under `cargo test`. Hardware
// is reached only through the collaborator traits in `alarm`, `display`,
// `input`, and `device`.

pub mod alarm;
pub mod clock;
pub mod countdown;
pub mod device;
pub mod display;
pub mod events;
pub mod input;
pub mod machine;
