// Licensed under the Apache-2.0 license

//! OpenCores I2C master driver.
//!
//! [`bus`] is the interrupt-driven transaction engine, [`i2c_controller`]
//! layers a blocking embedded-hal interface with a timer-backed timeout on
//! top of it.

pub mod bus;
pub mod common;
pub mod i2c_controller;
#[cfg(test)]
pub(crate) mod sim;
pub mod traits;
