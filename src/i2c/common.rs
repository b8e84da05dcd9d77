// Licensed under the Apache-2.0 license

//! Common types and constants for the OpenCores I2C master driver.
//!
//! Register offsets and bit values are the core's wire-level contract and must
//! not change.

/// Input clock of the I2C core when the board does not say otherwise.
pub const DEFAULT_CLOCK_HZ: u32 = 50_000_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum I2cSpeed {
    Standard = 100_000,
    Fast = 400_000,
    FastPlus = 1_000_000,
}

impl I2cSpeed {
    #[must_use]
    pub const fn hz(self) -> u32 {
        self as u32
    }
}

/// Control register (CTR) bits.
pub mod ctr {
    /// Core enable.
    pub const EN: u8 = 0x80;
    /// Interrupt enable.
    pub const IEN: u8 = 0x40;
}

/// Command register (CR) bits, write side of offset 4.
pub mod cmd {
    /// Generate (repeated) start condition.
    pub const STA: u8 = 0x80;
    /// Generate stop condition.
    pub const STO: u8 = 0x40;
    /// Read from slave.
    pub const RD: u8 = 0x20;
    /// Write to slave.
    pub const WR: u8 = 0x10;
    /// Send NACK after the byte being read.
    pub const ACK: u8 = 0x08;
    /// Clear a pending interrupt.
    pub const IACK: u8 = 0x01;
}

/// Status register (SR) bits, read side of offset 4.
pub mod status {
    /// Slave did not acknowledge the last byte.
    pub const RXACK: u8 = 0x80;
    pub const BUSY: u8 = 0x40;
    /// Arbitration lost.
    pub const AL: u8 = 0x20;
    /// Transfer in progress.
    pub const TIP: u8 = 0x02;
    /// Interrupt flag.
    pub const IF: u8 = 0x01;
}

/// Direction bit appended to the 7-bit address.
pub const ADDR_WRITE: u8 = 0;
pub const ADDR_READ: u8 = 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct I2cConfig {
    pub speed: I2cSpeed,
    pub clock_hz: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        I2cConfigBuilder::new().build()
    }
}

impl I2cConfig {
    /// Value for PRER: `clock / (5 * SCL) - 1`, floored at 0 when the clock is
    /// slower than `5 * SCL`.
    #[must_use]
    pub fn prescale(&self) -> u16 {
        let divider = self.clock_hz / (5 * self.speed.hz());
        u16::try_from(divider.saturating_sub(1)).unwrap_or(u16::MAX)
    }
}

pub struct I2cConfigBuilder {
    speed: I2cSpeed,
    clock_hz: u32,
}

impl Default for I2cConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl I2cConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            speed: I2cSpeed::Fast,
            clock_hz: DEFAULT_CLOCK_HZ,
        }
    }
    #[must_use]
    pub fn speed(mut self, speed: I2cSpeed) -> Self {
        self.speed = speed;
        self
    }
    #[must_use]
    pub fn clock_hz(mut self, hz: u32) -> Self {
        self.clock_hz = hz;
        self
    }
    #[must_use]
    pub fn build(self) -> I2cConfig {
        I2cConfig {
            speed: self.speed,
            clock_hz: self.clock_hz,
        }
    }
}
