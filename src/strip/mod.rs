//! Strip module for APA102 LED chain control.
//!
//! This module drives a chain of APA102 LEDs by bit-banging the clock and
//! data lines on the Raspberry Pi GPIO header.

pub mod apa102;
pub mod frame;
pub mod gpio;

// Re-export main types
pub use apa102::{Apa102, StripError};
pub use frame::{Channel, LedOutput, ValidationError};
pub use gpio::{GpioError, LinePair, RppalLines};
