// Licensed under the Apache-2.0 license

//! Interrupt-driven transaction engine for the OpenCores I2C master.
//!
//! The core moves one byte per interrupt. [`BusController`] keeps a single
//! in-flight transmission and advances it from [`BusController::on_interrupt`]:
//!
//! ```text
//! write: Idle -> TxWait -> ... -> TxWait -> Done -> Idle
//! read:  Idle -> AddrWait -> RxWait -> ... -> RxWait -> Idle
//! ```
//!
//! A NACK at any point issues STOP and finishes the transmission early. The
//! completion callback still runs exactly once and no status is reported:
//! callers that care must validate the payload themselves.
//!
//! Foreground code starts a transmission with [`BusController::write`] or
//! [`BusController::read`] and either supplies a callback (run from interrupt
//! context) or blocks in [`BusController::wait`]. A new transmission spins
//! until the previous one has completed. There is no timeout here; see
//! [`crate::i2c::i2c_controller`] for a bounded wait.

use core::cell::RefCell;
use core::convert::Infallible;
use core::hint::spin_loop;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;
use heapless::Vec;

use super::common::{cmd, ctr, status, I2cConfig, ADDR_READ, ADDR_WRITE};
use super::traits::{Register, RegisterAccess};

/// Transmission buffer size: address byte plus payload.
pub const BUFFER_LENGTH: usize = 32;

/// Largest payload of a single transmission.
pub const MAX_PAYLOAD: usize = BUFFER_LENGTH - 1;

/// Bytes written or read by one transmission.
pub type Payload = Vec<u8, MAX_PAYLOAD>;

/// Completion callback: 7-bit slave address and payload.
///
/// Runs in interrupt context after the busy flag has been cleared.
pub type BusCallback = fn(address: u8, payload: &[u8]);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusState {
    Idle,
    /// Read address byte on the wire.
    AddrWait,
    /// Write address or data byte on the wire.
    TxWait,
    RxWait,
    /// STOP issued, waiting for the final interrupt.
    Done,
}

struct Completion {
    address: u8,
    payload: Payload,
    callback: Option<BusCallback>,
}

struct Transmission {
    state: BusState,
    buffer: [u8; BUFFER_LENGTH],
    length: usize,
    index: usize,
    callback: Option<BusCallback>,
}

impl Transmission {
    const fn new() -> Self {
        Self {
            state: BusState::Idle,
            buffer: [0; BUFFER_LENGTH],
            length: 0,
            index: 0,
            callback: None,
        }
    }

    fn start(&mut self, address_byte: u8, payload_len: usize, callback: Option<BusCallback>) {
        if let Some(first) = self.buffer.first_mut() {
            *first = address_byte;
        }
        self.length = payload_len + 1;
        self.index = 1;
        self.callback = callback;
    }

    fn address_byte(&self) -> u8 {
        self.buffer.first().copied().unwrap_or(0)
    }

    fn payload(&self) -> Payload {
        let bytes = self.buffer.get(1..self.length).unwrap_or(&[]);
        Payload::from_slice(bytes).unwrap_or_default()
    }

    fn completion(&self) -> Completion {
        Completion {
            address: self.address_byte() >> 1,
            payload: self.payload(),
            callback: self.callback,
        }
    }

    fn stop<R: RegisterAccess>(&mut self, regs: &R) {
        regs.write(Register::CommandStatus, cmd::STO);
        self.state = BusState::Done;
    }

    /// RD for the next byte; the last one is NACKed and followed by STOP.
    fn read_command(&self) -> u8 {
        if self.index == self.length - 1 {
            cmd::RD | cmd::ACK | cmd::STO
        } else {
            cmd::RD
        }
    }

    fn advance<R: RegisterAccess>(&mut self, regs: &R, nack: bool) -> Option<Completion> {
        match self.state {
            BusState::Idle => None,
            BusState::TxWait => {
                // A zero-length write has nothing left after the address.
                if nack || self.index >= self.length {
                    self.stop(regs);
                } else {
                    let byte = self.buffer.get(self.index).copied().unwrap_or(0);
                    regs.write(Register::Data, byte);
                    if self.index == self.length - 1 {
                        regs.write(Register::CommandStatus, cmd::STO | cmd::WR);
                        self.state = BusState::Done;
                    } else {
                        regs.write(Register::CommandStatus, cmd::WR);
                    }
                    self.index += 1;
                }
                None
            }
            BusState::AddrWait => {
                if nack || self.length <= 1 {
                    self.stop(regs);
                } else {
                    regs.write(Register::CommandStatus, self.read_command());
                    self.state = BusState::RxWait;
                }
                None
            }
            BusState::RxWait => {
                let byte = regs.read(Register::Data);
                if let Some(slot) = self.buffer.get_mut(self.index) {
                    *slot = byte;
                }
                self.index += 1;
                if self.index < self.length {
                    regs.write(Register::CommandStatus, self.read_command());
                    None
                } else {
                    self.state = BusState::Idle;
                    Some(self.completion())
                }
            }
            BusState::Done => {
                self.state = BusState::Idle;
                Some(self.completion())
            }
        }
    }
}

pub struct BusController<R> {
    regs: R,
    xfer: Mutex<RefCell<Transmission>>,
    busy: AtomicBool,
}

impl<R> BusController<R> {
    #[must_use]
    pub const fn new(regs: R) -> Self {
        Self {
            regs,
            xfer: Mutex::new(RefCell::new(Transmission::new())),
            busy: AtomicBool::new(false),
        }
    }

    pub fn regs(&self) -> &R {
        &self.regs
    }

    /// True from the start of a transmission until its completion callback
    /// is about to run.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn state(&self) -> BusState {
        critical_section::with(|cs| self.xfer.borrow_ref(cs).state)
    }

    fn wait_idle(&self) {
        while self.is_busy() {
            spin_loop();
        }
    }

    fn snapshot(&self) -> Payload {
        critical_section::with(|cs| self.xfer.borrow_ref(cs).payload())
    }
}

impl<R: RegisterAccess> BusController<R> {
    /// Reset the transmission state and bring up the core with interrupts
    /// enabled.
    pub fn init(&self, config: &I2cConfig) {
        let [lo, hi] = config.prescale().to_le_bytes();
        critical_section::with(|cs| {
            *self.xfer.borrow_ref_mut(cs) = Transmission::new();
            self.busy.store(false, Ordering::Release);
            self.regs.write(Register::PrescaleLo, lo);
            self.regs.write(Register::PrescaleHi, hi);
            self.regs.write(Register::Control, ctr::EN | ctr::IEN);
        });
    }

    /// Start writing `data` to the slave at `address`.
    ///
    /// Waits for any previous transmission to complete first.
    ///
    /// # Panics
    ///
    /// Panics if `data` is longer than [`MAX_PAYLOAD`].
    pub fn write(&self, address: u8, data: &[u8], callback: Option<BusCallback>) {
        assert!(
            data.len() <= MAX_PAYLOAD,
            "i2c write of {} bytes exceeds buffer",
            data.len()
        );
        self.wait_idle();

        let address_byte = (address << 1) | ADDR_WRITE;
        critical_section::with(|cs| {
            let mut xfer = self.xfer.borrow_ref_mut(cs);
            xfer.start(address_byte, data.len(), callback);
            if let Some(dst) = xfer.buffer.get_mut(1..=data.len()) {
                dst.copy_from_slice(data);
            }
            xfer.state = BusState::TxWait;
            self.busy.store(true, Ordering::Release);
            self.regs.write(Register::Data, address_byte);
            self.regs.write(Register::CommandStatus, cmd::STA | cmd::WR);
        });
    }

    /// Start reading `len` bytes from the slave at `address`.
    ///
    /// Waits for any previous transmission to complete first.
    ///
    /// # Panics
    ///
    /// Panics if `len` is larger than [`MAX_PAYLOAD`].
    pub fn read(&self, address: u8, len: usize, callback: Option<BusCallback>) {
        assert!(len <= MAX_PAYLOAD, "i2c read of {len} bytes exceeds buffer");
        self.wait_idle();

        let address_byte = (address << 1) | ADDR_READ;
        critical_section::with(|cs| {
            let mut xfer = self.xfer.borrow_ref_mut(cs);
            xfer.start(address_byte, len, callback);
            xfer.state = BusState::AddrWait;
            self.busy.store(true, Ordering::Release);
            self.regs.write(Register::Data, address_byte);
            self.regs.write(Register::CommandStatus, cmd::STA | cmd::WR);
        });
    }

    /// Spin until the current transmission has completed, including its
    /// callback, and return a copy of its payload.
    pub fn wait(&self) -> Payload {
        self.wait_idle();
        self.snapshot()
    }

    /// Non-blocking [`BusController::wait`].
    pub fn try_wait(&self) -> nb::Result<Payload, Infallible> {
        if self.is_busy() {
            return Err(nb::Error::WouldBlock);
        }
        Ok(self.snapshot())
    }

    /// Byte-event interrupt handler.
    pub fn on_interrupt(&self) {
        critical_section::with(|cs| {
            let sr = self.regs.read(Register::CommandStatus);
            self.regs.write(Register::CommandStatus, cmd::IACK);
            let nack = sr & status::RXACK != 0;

            let finished = self.xfer.borrow_ref_mut(cs).advance(&self.regs, nack);
            if let Some(done) = finished {
                self.busy.store(false, Ordering::Release);
                if let Some(callback) = done.callback {
                    callback(done.address, &done.payload);
                }
            }
        });
    }
}
