//! APA102 LED strip controller.
//!
//! Keeps the complete transmission (start frame, LED words, end frame) in
//! one buffer and bit-bangs it out over a [`LinePair`] on commit.

use super::frame::{self, LedOutput, ValidationError, START_FRAME, WORD_SIZE};
use super::gpio::{GpioError, LinePair, RppalLines};
use crate::config::StripConfig;
use thiserror::Error;

/// Strip controller errors
#[derive(Error, Debug)]
pub enum StripError {
    #[error("GPIO error: {0}")]
    Gpio(#[from] GpioError),

    #[error("Invalid LED output: {0}")]
    Validation(#[from] ValidationError),

    #[error("out-of-range LED index {index} (strip has {len} LEDs)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// APA102 strip driven over a pair of GPIO lines
pub struct Apa102<L: LinePair> {
    lines: L,
    leds: usize,
    frame: Vec<u8>,
    dirty: bool,
}

impl Apa102<RppalLines> {
    /// Acquire the configured lines and set up the strip
    pub fn open(config: &StripConfig) -> Result<Self, StripError> {
        let lines = RppalLines::acquire(&config.chip, config.clock_line, config.data_line)?;
        Self::new(lines, config.led_count, config.reset_on_init)
    }
}

impl<L: LinePair> Apa102<L> {
    /// Create a controller for `leds` LEDs, all off
    ///
    /// With `reset` the zeroed frame is committed right away so the
    /// physical LEDs match it. The lines are released if that fails.
    pub fn new(lines: L, leds: usize, reset: bool) -> Result<Self, StripError> {
        let capacity = START_FRAME.len() + leds * WORD_SIZE + frame::end_frame_len(leds);
        let mut frame = Vec::with_capacity(capacity);
        frame.extend_from_slice(&START_FRAME);
        for _ in 0..leds {
            frame.extend_from_slice(&LedOutput::OFF.pack());
        }
        frame.extend(frame::end_frame(leds));

        let mut strip = Self {
            lines,
            leds,
            frame,
            dirty: true,
        };

        tracing::debug!("APA102 strip initialized: {} LEDs, {} byte frame", leds, strip.frame.len());

        if reset {
            if let Err(e) = strip.commit() {
                let _ = strip.close();
                return Err(e);
            }
        }

        Ok(strip)
    }

    /// Output setting of the LED at `index`
    pub fn get(&self, index: usize) -> Result<LedOutput, StripError> {
        self.check_index(index)?;
        Ok(LedOutput::unpack(self.word(index)))
    }

    /// Set the output of the LED at `index`
    pub fn set(&mut self, index: usize, output: LedOutput) -> Result<(), StripError> {
        output.check_range()?;
        self.check_index(index)?;
        self.set_unchecked(index, output);
        Ok(())
    }

    /// Set the output of the LED at `index` without validation
    ///
    /// Caller guarantees `index < self.len()` and a brightness within
    /// five bits. Only a changed word marks the strip dirty.
    ///
    /// # Panics
    /// If `index` is out of range.
    pub fn set_unchecked(&mut self, index: usize, output: LedOutput) {
        let packed = output.pack();
        let offset = word_offset(index);
        let word = &mut self.frame[offset..offset + WORD_SIZE];
        if word[..] != packed[..] {
            word.copy_from_slice(&packed);
            self.dirty = true;
        }
    }

    /// Number of LEDs on the strip
    #[inline]
    pub fn len(&self) -> usize {
        self.leds
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.leds == 0
    }

    /// Whether any LED currently has exactly this output
    pub fn contains(&self, output: &LedOutput) -> bool {
        let packed = output.pack();
        self.words().any(|word| word == packed.as_slice())
    }

    /// Output settings of all LEDs, nearest LED first
    pub fn iter(&self) -> impl Iterator<Item = LedOutput> + '_ {
        self.words().map(LedOutput::unpack)
    }

    /// Full frame as it goes on the wire
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Whether the frame changed since the last successful commit
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Send the frame to the LEDs if anything changed
    ///
    /// A failed write leaves the strip dirty, so the next commit
    /// retransmits the whole frame.
    pub fn commit(&mut self) -> Result<(), StripError> {
        if !self.dirty {
            tracing::trace!("Frame unchanged, skipping commit");
            return Ok(());
        }

        tracing::debug!("Committing frame ({} bytes)", self.frame.len());
        write_bytes(&mut self.lines, &self.frame)?;
        self.dirty = false;

        Ok(())
    }

    /// Release the GPIO lines
    pub fn close(self) -> Result<(), StripError> {
        tracing::debug!("Closing APA102 strip");
        self.lines.release()?;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), StripError> {
        if index >= self.leds {
            return Err(StripError::IndexOutOfRange {
                index,
                len: self.leds,
            });
        }
        Ok(())
    }

    fn word(&self, index: usize) -> &[u8] {
        let offset = word_offset(index);
        &self.frame[offset..offset + WORD_SIZE]
    }

    fn words(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let end = word_offset(self.leds);
        self.frame[START_FRAME.len()..end].chunks_exact(WORD_SIZE)
    }
}

#[inline]
fn word_offset(index: usize) -> usize {
    START_FRAME.len() + index * WORD_SIZE
}

/// Clock out one byte, most significant bit first
///
/// Each bit takes two writes: data with the clock low, then the clock
/// raised with data held, so data is stable before the rising edge.
fn write_byte<L: LinePair>(lines: &mut L, byte: u8) -> Result<(), GpioError> {
    for shift in (0..8).rev() {
        let bit = (byte >> shift) & 0x01 == 1;
        lines.set_values(false, bit)?;
        lines.set_values(true, bit)?;
    }
    Ok(())
}

fn write_bytes<L: LinePair>(lines: &mut L, bytes: &[u8]) -> Result<(), GpioError> {
    for &byte in bytes {
        write_byte(lines, byte)?;
    }
    Ok(())
}
