//! GPIO lines driving the LED chain.
//!
//! The strip needs exactly two output lines:
//! - CLK (Clock): GPIO 11 by default (SPI0 SCLK header pin)
//! - DATA (Data): GPIO 10 by default (SPI0 MOSI header pin)
//!
//! Both are bit-banged as plain outputs; the SPI peripheral stays untouched.

use rppal::gpio::{Gpio, Level, OutputPin};
use std::path::Path;
use thiserror::Error;

/// Default line assignments (BCM numbering)
pub mod pins {
    pub const CLK: u8 = 11;   // Clock line
    pub const DATA: u8 = 10;  // Data line
}

/// GPIO chip backing the Raspberry Pi header pins
pub const DEFAULT_CHIP: &str = "/dev/gpiochip0";

/// GPIO-related errors
#[derive(Error, Debug)]
pub enum GpioError {
    #[error("GPIO initialization failed: {0}")]
    Init(#[from] rppal::gpio::Error),

    #[error("Unsupported GPIO chip '{0}': only the header bank (/dev/gpiochip0) can be driven")]
    UnsupportedChip(String),

    #[error("GPIO write failed: {0}")]
    Write(String),
}

/// An acquired pair of output lines (clock, data)
pub trait LinePair {
    /// Drive both lines at once
    fn set_values(&mut self, clock: bool, data: bool) -> Result<(), GpioError>;

    /// Give the lines back
    fn release(self) -> Result<(), GpioError>
    where
        Self: Sized;
}

/// Clock and data lines on the Raspberry Pi header, driven through rppal
pub struct RppalLines {
    clk: OutputPin,
    data: OutputPin,
}

impl RppalLines {
    /// Request the clock and data lines as outputs, both driven low
    pub fn acquire(chip: &str, clk: u8, data: u8) -> Result<Self, GpioError> {
        if !is_header_chip(chip) {
            return Err(GpioError::UnsupportedChip(chip.to_string()));
        }

        let gpio = Gpio::new()?;

        let mut clk_pin = gpio.get(clk)?.into_output_low();
        let mut data_pin = gpio.get(data)?.into_output_low();

        // Return lines to inputs once released
        clk_pin.set_reset_on_drop(true);
        data_pin.set_reset_on_drop(true);

        tracing::debug!("GPIO lines acquired on {}: CLK={}, DATA={}", chip, clk, data);

        Ok(Self {
            clk: clk_pin,
            data: data_pin,
        })
    }
}

impl LinePair for RppalLines {
    #[inline]
    fn set_values(&mut self, clock: bool, data: bool) -> Result<(), GpioError> {
        self.data.write(level(data));
        self.clk.write(level(clock));
        Ok(())
    }

    fn release(mut self) -> Result<(), GpioError> {
        self.clk.set_low();
        self.data.set_low();
        tracing::debug!(
            "GPIO lines released: CLK={}, DATA={}",
            self.clk.pin(),
            self.data.pin()
        );
        Ok(())
    }
}

#[inline]
fn level(bit: bool) -> Level {
    if bit { Level::High } else { Level::Low }
}

/// Accepts either a device path or a bare chip name for the header bank
fn is_header_chip(chip: &str) -> bool {
    let default_name = Path::new(DEFAULT_CHIP).file_name();
    chip == DEFAULT_CHIP || Path::new(chip).file_name() == default_name
}
