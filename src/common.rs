// Licensed under the Apache-2.0 license

//! Shared plumbing used across the driver modules.
//!
//! Drivers take a `L: Logger` type parameter, defaulting to [`NoOpLogger`], so
//! that a silent build carries no formatting code. [`UartLogger`] is the
//! board logger: every line is stamped with the global counter value.

use core::fmt::{self, Write as _};

use crate::gcnt::{CounterRegisters, GlobalCounter};

/// Line-oriented diagnostic sink.
///
/// Implementations must not be called from interrupt context.
pub trait Logger {
    fn debug(&mut self, args: fmt::Arguments<'_>);
    fn error(&mut self, args: fmt::Arguments<'_>);
}

/// Logger that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn debug(&mut self, _args: fmt::Arguments<'_>) {}
    fn error(&mut self, _args: fmt::Arguments<'_>) {}
}

impl<T: Logger + ?Sized> Logger for &mut T {
    fn debug(&mut self, args: fmt::Arguments<'_>) {
        (**self).debug(args);
    }

    fn error(&mut self, args: fmt::Arguments<'_>) {
        (**self).error(args);
    }
}

/// Logger writing timestamped lines to an `embedded_io` byte sink.
///
/// Output format is `0x<14 hex digit counter>: <message>\r\n`, errors are
/// additionally tagged with `error: `.
pub struct UartLogger<'a, W, C> {
    writer: W,
    counter: &'a GlobalCounter<C>,
}

impl<'a, W: embedded_io::Write, C: CounterRegisters> UartLogger<'a, W, C> {
    pub fn new(writer: W, counter: &'a GlobalCounter<C>) -> Self {
        Self { writer, counter }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn line(&mut self, tag: &str, args: fmt::Arguments<'_>) {
        let stamp = self.counter.get();
        let mut out = FmtAdapter(&mut self.writer);
        // A lost log line is not worth faulting over.
        let _ = write!(out, "0x{stamp:014x}: {tag}{args}\r\n");
    }
}

impl<W: embedded_io::Write, C: CounterRegisters> Logger for UartLogger<'_, W, C> {
    fn debug(&mut self, args: fmt::Arguments<'_>) {
        self.line("", args);
    }

    fn error(&mut self, args: fmt::Arguments<'_>) {
        self.line("error: ", args);
    }
}

/// Bridges `core::fmt::Write` onto an `embedded_io::Write` sink.
struct FmtAdapter<'w, W>(&'w mut W);

impl<W: embedded_io::Write> fmt::Write for FmtAdapter<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_all(s.as_bytes()).map_err(|_| fmt::Error)
    }
}
