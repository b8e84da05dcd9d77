// Licensed under the Apache-2.0 license

//! INA219 current/power monitor.
//!
//! Registers are 16-bit big-endian behind a one-byte register pointer. A read
//! sets the pointer with a write and fetches two bytes in a separate
//! transaction. Scaling assumes the board's calibration value
//! ([`CALIBRATION`]): 10 uV shunt LSB, 100 uA current LSB, 2 mW power LSB.

use embedded_hal::i2c::{I2c, SevenBitAddress};
use zerocopy::big_endian::U16;
use zerocopy::{Immutable, IntoBytes, KnownLayout};

use crate::common::{Logger, NoOpLogger};

/// Address with A0 and A1 tied to ground.
pub const DEFAULT_ADDRESS: SevenBitAddress = 0x40;

/// Calibration register value the scaling below is derived from.
pub const CALIBRATION: u16 = 4096;

/// Bus timeout the board uses for this device.
pub const TIMEOUT_MS: u32 = 100;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    Config = 0,
    ShuntVoltage = 1,
    BusVoltage = 2,
    Power = 3,
    Current = 4,
    Calibration = 5,
}

impl Register {
    pub const ALL: [Register; 6] = [
        Register::Config,
        Register::ShuntVoltage,
        Register::BusVoltage,
        Register::Power,
        Register::Current,
        Register::Calibration,
    ];
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error<E> {
    I2c(E),
    /// Calibration read back differently from what was written.
    Calibration { expected: u16, found: u16 },
}

/// One conversion, in engineering units.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Sample {
    pub bus_mv: u16,
    pub shunt_uv: i32,
    pub current_ua: i32,
    pub power_mw: i32,
}

#[derive(IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
struct RegisterWrite {
    reg: u8,
    value: U16,
}

pub struct Ina219<I2C, L: Logger = NoOpLogger> {
    i2c: I2C,
    address: SevenBitAddress,
    pub logger: L,
}

impl<I2C: I2c> Ina219<I2C> {
    pub fn new(i2c: I2C, address: SevenBitAddress) -> Self {
        Self::with_logger(i2c, address, NoOpLogger)
    }
}

impl<I2C: I2c, L: Logger> Ina219<I2C, L> {
    pub fn with_logger(i2c: I2C, address: SevenBitAddress, logger: L) -> Self {
        Self {
            i2c,
            address,
            logger,
        }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    pub fn set_reg(&mut self, reg: Register, value: u16) -> Result<(), Error<I2C::Error>> {
        let frame = RegisterWrite {
            reg: reg as u8,
            value: U16::new(value),
        };
        self.i2c.write(self.address, frame.as_bytes()).map_err(Error::I2c)
    }

    pub fn get_reg(&mut self, reg: Register) -> Result<u16, Error<I2C::Error>> {
        let mut raw = [0u8; 2];
        self.i2c.write(self.address, &[reg as u8]).map_err(Error::I2c)?;
        self.i2c.read(self.address, &mut raw).map_err(Error::I2c)?;
        Ok(U16::from_bytes(raw).get())
    }

    /// Program the calibration register and check that it stuck.
    pub fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        self.set_reg(Register::Calibration, CALIBRATION)?;
        let found = self.get_reg(Register::Calibration)?;
        if found != CALIBRATION {
            self.logger.error(format_args!(
                "ina219 calibration mismatch: wrote 0x{CALIBRATION:04x}, read 0x{found:04x}"
            ));
            return Err(Error::Calibration {
                expected: CALIBRATION,
                found,
            });
        }
        self.logger.debug(format_args!("ina219_init success"));
        Ok(())
    }

    pub fn bus_voltage_mv(&mut self) -> Result<u16, Error<I2C::Error>> {
        // bits 15..3 hold the reading in 4 mV steps
        Ok((self.get_reg(Register::BusVoltage)? >> 3) * 4)
    }

    pub fn shunt_voltage_uv(&mut self) -> Result<i32, Error<I2C::Error>> {
        let raw = self.get_reg(Register::ShuntVoltage)?;
        Ok(i32::from(raw as i16) * 10)
    }

    pub fn current_ua(&mut self) -> Result<i32, Error<I2C::Error>> {
        let raw = self.get_reg(Register::Current)?;
        Ok(i32::from(raw as i16) * 100)
    }

    /// Power is unsigned in the device; the sign is taken from the current.
    pub fn power_mw(&mut self) -> Result<i32, Error<I2C::Error>> {
        let raw = i32::from(self.get_reg(Register::Power)?);
        let sign = if (self.get_reg(Register::Current)? as i16) < 0 {
            -1
        } else {
            1
        };
        Ok(raw * sign * 2)
    }

    pub fn sample(&mut self) -> Result<Sample, Error<I2C::Error>> {
        Ok(Sample {
            bus_mv: self.bus_voltage_mv()?,
            shunt_uv: self.shunt_voltage_uv()?,
            current_ua: self.current_ua()?,
            power_mw: self.power_mw()?,
        })
    }

    /// Raw values of every register, in register order.
    pub fn registers(&mut self) -> Result<[u16; 6], Error<I2C::Error>> {
        let mut out = [0u16; 6];
        for (slot, reg) in out.iter_mut().zip(Register::ALL) {
            *slot = self.get_reg(reg)?;
        }
        Ok(out)
    }
}
