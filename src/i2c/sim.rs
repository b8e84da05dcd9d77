// Licensed under the Apache-2.0 license

//! Simulated OpenCores core for host tests.
//!
//! Every command that moves the bus (WR, RD or STO) raises one interrupt,
//! cleared again by IACK. Slave behaviour is scripted: bytes handed out on RD
//! and the index of the transmitted byte that gets NACKed.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::vec::Vec;

use super::bus::BusController;
use super::common::{cmd, status};
use super::traits::{Register, RegisterAccess};

struct State {
    prescale_lo: u8,
    prescale_hi: u8,
    control: u8,
    txr: u8,
    rxr: u8,
    irq: bool,
    nack: bool,
    stalled: bool,
    nack_at: Option<usize>,
    rx: VecDeque<u8>,
    commands: Vec<u8>,
    sent: Vec<u8>,
}

impl State {
    fn command(&mut self, value: u8) {
        self.commands.push(value);
        if value & cmd::IACK != 0 {
            self.irq = false;
        }
        if value & (cmd::WR | cmd::RD | cmd::STO) == 0 {
            return;
        }
        if value & cmd::WR != 0 {
            self.nack = self.nack_at == Some(self.sent.len());
            self.sent.push(self.txr);
        }
        if value & cmd::RD != 0 {
            self.rxr = self.rx.pop_front().unwrap_or(0xFF);
            self.nack = false;
        }
        if !self.stalled {
            self.irq = true;
        }
    }
}

pub(crate) struct SimCore {
    state: Mutex<State>,
}

impl SimCore {
    pub(crate) const fn new() -> Self {
        Self {
            state: Mutex::new(State {
                prescale_lo: 0,
                prescale_hi: 0,
                control: 0,
                txr: 0,
                rxr: 0,
                irq: false,
                nack: false,
                stalled: false,
                nack_at: None,
                rx: VecDeque::new(),
                commands: Vec::new(),
                sent: Vec::new(),
            }),
        }
    }

    /// Slave that returns `bytes` to successive reads.
    pub(crate) fn with_rx(bytes: &[u8]) -> Self {
        let sim = Self::new();
        sim.lock().rx.extend(bytes.iter().copied());
        sim
    }

    /// Slave that never raises an interrupt.
    pub(crate) fn stalled() -> Self {
        let sim = Self::new();
        sim.lock().stalled = true;
        sim
    }

    /// NACK the `index`th byte put on the wire (the address byte is 0).
    pub(crate) fn nack_byte(self, index: usize) -> Self {
        self.lock().nack_at = Some(index);
        self
    }

    pub(crate) fn push_rx(&self, bytes: &[u8]) {
        self.lock().rx.extend(bytes.iter().copied());
    }

    pub(crate) fn irq_pending(&self) -> bool {
        self.lock().irq
    }

    /// Every value written to CR, in order.
    pub(crate) fn commands(&self) -> Vec<u8> {
        self.lock().commands.clone()
    }

    /// Every byte shifted out on WR, address bytes included.
    pub(crate) fn sent(&self) -> Vec<u8> {
        self.lock().sent.clone()
    }

    pub(crate) fn clear_log(&self) {
        let mut s = self.lock();
        s.commands.clear();
        s.sent.clear();
    }

    pub(crate) fn prescale(&self) -> u16 {
        let s = self.lock();
        u16::from_le_bytes([s.prescale_lo, s.prescale_hi])
    }

    pub(crate) fn control(&self) -> u8 {
        self.lock().control
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RegisterAccess for SimCore {
    fn read(&self, reg: Register) -> u8 {
        let s = self.lock();
        match reg {
            Register::PrescaleLo => s.prescale_lo,
            Register::PrescaleHi => s.prescale_hi,
            Register::Control => s.control,
            Register::Data => s.rxr,
            Register::CommandStatus => {
                let mut sr = 0;
                if s.nack {
                    sr |= status::RXACK;
                }
                if s.irq {
                    sr |= status::IF;
                }
                sr
            }
        }
    }

    fn write(&self, reg: Register, value: u8) {
        let mut s = self.lock();
        match reg {
            Register::PrescaleLo => s.prescale_lo = value,
            Register::PrescaleHi => s.prescale_hi = value,
            Register::Control => s.control = value,
            Register::Data => s.txr = value,
            Register::CommandStatus => s.command(value),
        }
    }
}

/// Service interrupts until the simulated core goes quiet.
pub(crate) fn run_isr(bus: &BusController<SimCore>) {
    for _ in 0..1000 {
        if !bus.regs().irq_pending() {
            return;
        }
        bus.on_interrupt();
    }
    panic!("simulated bus never went quiet");
}
