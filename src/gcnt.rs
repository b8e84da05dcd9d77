// Licensed under the Apache-2.0 license

//! Global free-running counter.
//!
//! The SoC exposes a 64-bit cycle counter as two 32-bit words that are latched
//! independently, so a plain low/high read can tear across a carry. [`GlobalCounter::get`]
//! reads high, low, high and retries until both high reads agree.
//!
//! The delay helpers only poll the low word and are safe against its wraparound.

use core::hint::spin_loop;

/// Access to the two hardware counter words.
pub trait CounterRegisters {
    fn low(&self) -> u32;
    fn high(&self) -> u32;
}

impl<T: CounterRegisters + ?Sized> CounterRegisters for &T {
    fn low(&self) -> u32 {
        (**self).low()
    }

    fn high(&self) -> u32 {
        (**self).high()
    }
}

/// Longest single busy-wait on the low word, in counter ticks.
const MAX_WAIT_CHUNK: u64 = (u32::MAX >> 1) as u64;

pub struct GlobalCounter<R> {
    regs: R,
    ticks_per_us: u32,
}

impl<R> GlobalCounter<R> {
    /// # Panics
    ///
    /// Panics if `ticks_per_us` is zero.
    #[must_use]
    pub const fn new(regs: R, ticks_per_us: u32) -> Self {
        assert!(ticks_per_us > 0, "counter must tick at least once per microsecond");
        Self { regs, ticks_per_us }
    }

    /// Counter clocked from the CPU core clock.
    ///
    /// # Panics
    ///
    /// Panics if `clock_hz` is below 1 MHz.
    #[must_use]
    pub const fn with_clock_hz(regs: R, clock_hz: u32) -> Self {
        Self::new(regs, clock_hz / 1_000_000)
    }

    #[must_use]
    pub const fn ticks_per_us(&self) -> u32 {
        self.ticks_per_us
    }
}

impl<R: CounterRegisters> GlobalCounter<R> {
    /// Current 64-bit counter value, never torn across a low-word carry.
    pub fn get(&self) -> u64 {
        loop {
            let hi1 = self.regs.high();
            let lo = self.regs.low();
            let hi2 = self.regs.high();
            if hi1 == hi2 {
                return (u64::from(hi1) << 32) | u64::from(lo);
            }
        }
    }

    /// Busy-wait for `ticks` counter ticks.
    pub fn delay_ticks(&self, ticks: u64) {
        let mut remaining = ticks;
        while remaining > 0 {
            let chunk = remaining.min(MAX_WAIT_CHUNK);
            #[allow(clippy::cast_possible_truncation)]
            let budget = chunk as u32;
            let start = self.regs.low();
            // wrapping_sub keeps the elapsed count correct across a low-word rollover
            while self.regs.low().wrapping_sub(start) < budget {
                spin_loop();
            }
            remaining -= chunk;
        }
    }

    pub fn delay_us(&self, us: u32) {
        self.delay_ticks(u64::from(us) * u64::from(self.ticks_per_us));
    }

    pub fn delay_ms(&self, ms: u32) {
        self.delay_ticks(u64::from(ms) * 1000 * u64::from(self.ticks_per_us));
    }

    fn ns_to_ticks(&self, ns: u32) -> u64 {
        (u64::from(ns) * u64::from(self.ticks_per_us)).div_ceil(1000)
    }
}

impl<R: CounterRegisters> embedded_hal::delay::DelayNs for GlobalCounter<R> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ticks(self.ns_to_ticks(ns));
    }

    fn delay_us(&mut self, us: u32) {
        GlobalCounter::delay_us(self, us);
    }

    fn delay_ms(&mut self, ms: u32) {
        GlobalCounter::delay_ms(self, ms);
    }
}

impl<R: CounterRegisters> embedded_hal::delay::DelayNs for &GlobalCounter<R> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ticks(self.ns_to_ticks(ns));
    }

    fn delay_us(&mut self, us: u32) {
        GlobalCounter::delay_us(self, us);
    }

    fn delay_ms(&mut self, ms: u32) {
        GlobalCounter::delay_ms(self, ms);
    }
}
