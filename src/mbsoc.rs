// Licensed under the Apache-2.0 license

//! Memory map and register-level peripherals of the soft SoC.
//!
//! The fabric places every IO block in a 4 KiB window above [`IO_BASE`] with
//! 32-bit registers. The OpenCores I2C core has byte registers on a 4-byte
//! stride.

use core::convert::Infallible;
use core::ptr::{read_volatile, write_volatile};

use crate::gcnt::CounterRegisters;
use crate::i2c::traits::{Register, RegisterAccess};

/// CPU and peripheral clock.
pub const CPU_CLOCK_HZ: u32 = 50_000_000;

pub const IO_BASE: usize = 0x4000_0000;
/// Global counter: low word at +0, high word at +4.
pub const GCNT_BASE: usize = IO_BASE;
pub const I2C_BASE: usize = IO_BASE + 0x3000;
pub const UART_BASE: usize = IO_BASE + 0x4000;
/// General purpose outputs; LEDs on the low byte.
pub const GPO_BASE: usize = IO_BASE + 0x5000;

/// External interrupt line of the I2C core.
pub const I2C_IRQ: i16 = 0;

/// Block of 32-bit registers at a fixed address.
#[derive(Clone, Copy, Debug)]
struct Mmio {
    base: *mut u32,
}

// SAFETY: the registers are device memory shared by every context; each
// access is a single volatile word.
unsafe impl Send for Mmio {}
unsafe impl Sync for Mmio {}

impl Mmio {
    const fn new(base: usize) -> Self {
        Self {
            base: base as *mut u32,
        }
    }

    fn read(&self, word: usize) -> u32 {
        // SAFETY: `word` is a register index inside the block the owner was
        // constructed for.
        unsafe { read_volatile(self.base.add(word)) }
    }

    fn write(&self, word: usize, value: u32) {
        // SAFETY: see `read`.
        unsafe { write_volatile(self.base.add(word), value) }
    }
}

/// OpenCores I2C master registers.
pub struct I2cMmio(Mmio);

impl I2cMmio {
    /// # Safety
    ///
    /// `base` must be the address of an OpenCores I2C core (or of at least
    /// five writable words) for the whole life of the value.
    pub const unsafe fn new(base: usize) -> Self {
        Self(Mmio::new(base))
    }

    pub const fn board() -> Self {
        // SAFETY: fixed by the SoC memory map.
        unsafe { Self::new(I2C_BASE) }
    }
}

impl RegisterAccess for I2cMmio {
    fn read(&self, reg: Register) -> u8 {
        // the core drives the low byte only
        #[allow(clippy::cast_possible_truncation)]
        let value = self.0.read(reg.offset()) as u8;
        value
    }

    fn write(&self, reg: Register, value: u8) {
        self.0.write(reg.offset(), u32::from(value));
    }
}

/// The two words of the global free-running counter.
pub struct CounterMmio(Mmio);

impl CounterMmio {
    /// # Safety
    ///
    /// `base` must address the counter's low and high words.
    pub const unsafe fn new(base: usize) -> Self {
        Self(Mmio::new(base))
    }

    pub const fn board() -> Self {
        // SAFETY: fixed by the SoC memory map.
        unsafe { Self::new(GCNT_BASE) }
    }
}

impl CounterRegisters for CounterMmio {
    fn low(&self) -> u32 {
        self.0.read(0)
    }

    fn high(&self) -> u32 {
        self.0.read(1)
    }
}

const UART_TX: usize = 1;
const UART_STAT: usize = 2;
const UART_STAT_TX_EMPTY: u32 = 1 << 2;
const UART_STAT_TX_FULL: u32 = 1 << 3;

/// Polled console UART (UART Lite register layout).
pub struct Uart(Mmio);

impl Uart {
    /// # Safety
    ///
    /// `base` must address a UART Lite compatible register block.
    pub const unsafe fn new(base: usize) -> Self {
        Self(Mmio::new(base))
    }

    pub const fn board() -> Self {
        // SAFETY: fixed by the SoC memory map.
        unsafe { Self::new(UART_BASE) }
    }

    fn put(&mut self, byte: u8) {
        while self.0.read(UART_STAT) & UART_STAT_TX_FULL != 0 {
            core::hint::spin_loop();
        }
        self.0.write(UART_TX, u32::from(byte));
    }
}

impl embedded_io::ErrorType for Uart {
    type Error = Infallible;
}

impl embedded_io::Write for Uart {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for &byte in buf {
            self.put(byte);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        while self.0.read(UART_STAT) & UART_STAT_TX_EMPTY == 0 {
            core::hint::spin_loop();
        }
        Ok(())
    }
}

/// Board LEDs on general purpose output port 0.
pub struct Leds(Mmio);

impl Leds {
    /// # Safety
    ///
    /// `base` must address a general purpose output register.
    pub const unsafe fn new(base: usize) -> Self {
        Self(Mmio::new(base))
    }

    pub const fn board() -> Self {
        // SAFETY: fixed by the SoC memory map.
        unsafe { Self::new(GPO_BASE) }
    }

    pub fn set(&self, pattern: u8) {
        self.0.write(0, u32::from(pattern));
    }

    pub fn get(&self) -> u8 {
        #[allow(clippy::cast_possible_truncation)]
        let pattern = self.0.read(0) as u8;
        pattern
    }
}
