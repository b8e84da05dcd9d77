// Licensed under the Apache-2.0 license

//! Blocking, embedded-hal compatible front end for [`BusController`].
//!
//! Every wait on the bus is raced against a one-shot timer so that a wedged
//! bus turns into [`Error::Timeout`] instead of a hang. The core has no
//! repeated start, so each [`Operation`] of a transaction is sent as its own
//! START ... STOP sequence.
//!
//! A NACK is not visible here: the bus finishes early and the caller gets
//! whatever the buffer held.

use core::hint::spin_loop;

use crate::common::{Logger, NoOpLogger};
use crate::i2c::bus::{BusController, MAX_PAYLOAD};
use crate::i2c::traits::RegisterAccess;
use crate::timer::{TimerId, TimerMode, TimerService};
use embedded_hal::i2c::{ErrorKind, Operation, SevenBitAddress};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The bus was still busy when the deadline timer fired.
    Timeout,
    /// More than [`MAX_PAYLOAD`] bytes in one operation.
    BufferTooLarge,
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

fn deadline_expired(_data: usize) {}

pub struct I2cController<'a, R, L: Logger = NoOpLogger> {
    bus: &'a BusController<R>,
    timers: &'a TimerService,
    deadline: TimerId,
    timeout: u32,
    pub logger: L,
}

impl<'a, R: RegisterAccess, L: Logger> I2cController<'a, R, L> {
    /// Claim `deadline` for bounding bus waits to `timeout` ticks.
    pub fn new(
        bus: &'a BusController<R>,
        timers: &'a TimerService,
        deadline: TimerId,
        timeout: u32,
        logger: L,
    ) -> Self {
        timers.arm(deadline, TimerMode::OneShot, deadline_expired, 0);
        Self {
            bus,
            timers,
            deadline,
            timeout,
            logger,
        }
    }

    pub fn bus(&self) -> &'a BusController<R> {
        self.bus
    }

    fn wait_idle(&mut self, addr: SevenBitAddress) -> Result<(), Error> {
        while self.bus.is_busy() {
            if !self.timers.is_pending(self.deadline) {
                self.logger
                    .error(format_args!("i2c 0x{addr:02x}: timeout after {} ticks", self.timeout));
                return Err(Error::Timeout);
            }
            spin_loop();
        }
        Ok(())
    }

    fn write_op(&mut self, addr: SevenBitAddress, bytes: &[u8]) -> Result<(), Error> {
        self.wait_idle(addr)?;
        self.bus.write(addr, bytes, None);
        self.wait_idle(addr)
    }

    fn read_op(&mut self, addr: SevenBitAddress, buffer: &mut [u8]) -> Result<(), Error> {
        self.wait_idle(addr)?;
        self.bus.read(addr, buffer.len(), None);
        self.wait_idle(addr)?;
        let payload = self.bus.wait();
        for (dst, src) in buffer.iter_mut().zip(payload.iter()) {
            *dst = *src;
        }
        Ok(())
    }

    fn run(&mut self, addr: SevenBitAddress, operations: &mut [Operation<'_>]) -> Result<(), Error> {
        for op in operations.iter() {
            let len = match op {
                Operation::Read(buf) => buf.len(),
                Operation::Write(bytes) => bytes.len(),
            };
            if len > MAX_PAYLOAD {
                self.logger
                    .error(format_args!("i2c 0x{addr:02x}: {len} bytes exceeds buffer"));
                return Err(Error::BufferTooLarge);
            }
        }

        for op in operations.iter_mut() {
            match op {
                Operation::Read(buf) => self.read_op(addr, buf)?,
                Operation::Write(bytes) => self.write_op(addr, *bytes)?,
            }
        }
        Ok(())
    }
}

impl<R, L: Logger> embedded_hal::i2c::ErrorType for I2cController<'_, R, L> {
    type Error = Error;
}

impl<R: RegisterAccess, L: Logger> embedded_hal::i2c::I2c for I2cController<'_, R, L> {
    fn transaction(
        &mut self,
        addr: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.timers.set(self.deadline, self.timeout);
        let result = self.run(addr, operations);
        self.timers.cancel(self.deadline);
        result
    }
}
