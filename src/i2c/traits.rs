// Licensed under the Apache-2.0 license

//! Register-level access to the I2C core.
//!
//! The bus state machine only ever talks to the hardware through
//! [`RegisterAccess`], so the same code drives the memory-mapped core on
//! target and a simulated core in host tests.

/// Byte registers of the OpenCores I2C master.
///
/// Offsets 3 and 4 are split by direction: writes hit TXR and CR, reads
/// return RXR and SR.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    PrescaleLo = 0,
    PrescaleHi = 1,
    Control = 2,
    /// TXR on write, RXR on read.
    Data = 3,
    /// CR on write, SR on read.
    CommandStatus = 4,
}

impl Register {
    #[must_use]
    pub const fn offset(self) -> usize {
        self as usize
    }
}

pub trait RegisterAccess {
    fn read(&self, reg: Register) -> u8;
    fn write(&self, reg: Register, value: u8);
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &T {
    fn read(&self, reg: Register) -> u8 {
        (**self).read(reg)
    }

    fn write(&self, reg: Register, value: u8) {
        (**self).write(reg, value);
    }
}
