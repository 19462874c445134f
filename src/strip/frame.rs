//! APA102 frame encoding.
//!
//! Each LED is driven by one 4-byte word on the wire:
//! `[0b111 | brightness(5), blue, green, red]`
//!
//! A full transmission is a 4-byte zero start frame, one word per LED,
//! then enough zero bytes to clock the data through to the last LED.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Start frame sent ahead of the LED words
pub const START_FRAME: [u8; 4] = [0x00; 4];

/// Size of one encoded LED word in bytes
pub const WORD_SIZE: usize = 4;

/// Marker bits the protocol reserves at the top of every LED word
const WORD_MARKER: u8 = 0xE0;

/// Largest accepted brightness setting (5 bits)
pub const MAX_BRIGHTNESS: u8 = 0x1F;

/// Clock edges produced by clocking out one byte
const EDGES_PER_BYTE: usize = 16;

/// One component of an LED output setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Brightness,
    Red,
    Green,
    Blue,
}

impl Channel {
    /// Largest value accepted for this channel
    pub fn max(self) -> i64 {
        match self {
            Channel::Brightness => i64::from(MAX_BRIGHTNESS),
            _ => i64::from(u8::MAX),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Brightness => "brightness",
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        };
        f.write_str(name)
    }
}

/// Rejected LED output setting
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{channel} setting invalid: got {value}, expected integer within [0, {}]", .channel.max())]
pub struct ValidationError {
    pub channel: Channel,
    pub value: String,
}

impl ValidationError {
    fn new(channel: Channel, value: impl ToString) -> Self {
        Self {
            channel,
            value: value.to_string(),
        }
    }
}

/// Desired output of a single LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedOutput {
    pub brightness: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl LedOutput {
    /// All channels off
    pub const OFF: LedOutput = LedOutput::new(0, 0, 0, 0);

    pub const fn new(brightness: u8, red: u8, green: u8, blue: u8) -> Self {
        Self {
            brightness,
            red,
            green,
            blue,
        }
    }

    /// Check every channel against its accepted range
    ///
    /// Color channels cannot exceed their range as `u8`, so only the
    /// 5-bit brightness can fail here.
    pub fn check_range(&self) -> Result<(), ValidationError> {
        if self.brightness > MAX_BRIGHTNESS {
            return Err(ValidationError::new(Channel::Brightness, self.brightness));
        }
        Ok(())
    }

    /// Build an output from unconstrained integers, naming the first bad channel
    pub fn try_from_raw(
        brightness: i64,
        red: i64,
        green: i64,
        blue: i64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            brightness: narrow(Channel::Brightness, brightness)?,
            red: narrow(Channel::Red, red)?,
            green: narrow(Channel::Green, green)?,
            blue: narrow(Channel::Blue, blue)?,
        })
    }

    /// Encode into the on-wire LED word
    pub fn pack(&self) -> [u8; WORD_SIZE] {
        [
            (self.brightness & MAX_BRIGHTNESS) | WORD_MARKER,
            self.blue,
            self.green,
            self.red,
        ]
    }

    /// Decode an on-wire LED word
    pub fn unpack(word: &[u8]) -> Self {
        Self {
            brightness: word[0] & MAX_BRIGHTNESS,
            red: word[3],
            green: word[2],
            blue: word[1],
        }
    }
}

fn narrow(channel: Channel, value: i64) -> Result<u8, ValidationError> {
    if (0..=channel.max()).contains(&value) {
        // max() never exceeds u8::MAX
        Ok(value as u8)
    } else {
        Err(ValidationError::new(channel, value))
    }
}

/// Parses `"brightness,red,green,blue"`, e.g. `31,255,128,0`
impl FromStr for LedOutput {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let channels = [Channel::Brightness, Channel::Red, Channel::Green, Channel::Blue];
        let mut parts = s.split(',').map(str::trim);
        let mut values = [0i64; 4];

        for (slot, channel) in values.iter_mut().zip(channels) {
            let part = parts.next().unwrap_or("");
            *slot = part
                .parse()
                .map_err(|_| ValidationError::new(channel, format!("{:?}", part)))?;
        }

        if let Some(extra) = parts.next() {
            return Err(ValidationError::new(
                Channel::Blue,
                format!("trailing value {:?}", extra),
            ));
        }

        Self::try_from_raw(values[0], values[1], values[2], values[3])
    }
}

/// Number of zero bytes needed after the LED words for `leds` LEDs
///
/// Every LED after the first needs one extra clock edge to latch its
/// data, and each clocked byte yields 16 edges.
pub fn end_frame_len(leds: usize) -> usize {
    leds.saturating_sub(1).div_ceil(EDGES_PER_BYTE)
}

/// Zero-byte end frame for `leds` LEDs
pub fn end_frame(leds: usize) -> Vec<u8> {
    vec![0x00; end_frame_len(leds)]
}
