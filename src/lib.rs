//! Bit-banged APA102 LED strip driver for Raspberry Pi GPIO lines.
//!
//! - Keeps a framebuffer of per-LED brightness and color
//! - Encodes it into the APA102 wire format
//! - Clocks it out over two GPIO lines, only when something changed

pub mod config;
pub mod strip;

pub use config::StripConfig;
pub use strip::{Apa102, LedOutput, LinePair, StripError};
