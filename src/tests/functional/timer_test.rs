// Licensed under the Apache-2.0 license

//! On-target checks of the timer service against the global counter.
//!
//! Needs the tick interrupt running. Results go to the console.

use core::cell::Cell;

use critical_section::Mutex;
use embedded_io::Write;

use crate::gcnt::{CounterRegisters, GlobalCounter};
use crate::timer::{timeout_in_ms, TimerId, TimerMode, TimerService};

const ONE_SHOT: TimerId = TimerId::new(12);
const PERIODIC: TimerId = TimerId::new(13);
const SELF_CANCEL: TimerId = TimerId::new(14);

static FIRED: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

fn count(_data: usize) {
    critical_section::with(|cs| {
        let fired = FIRED.borrow(cs);
        fired.set(fired.get() + 1);
    });
}

fn fired() -> u32 {
    critical_section::with(|cs| FIRED.borrow(cs).get())
}

fn reset() {
    critical_section::with(|cs| FIRED.borrow(cs).set(0));
}

pub fn run_timer_tests<W, C>(uart: &mut W, timers: &'static TimerService, counter: &GlobalCounter<C>)
where
    W: Write,
    C: CounterRegisters,
{
    writeln!(uart, "\r\n=== Timer Service Tests ===\r").ok();

    test_ticks_advance(uart, timers, counter);
    test_one_shot(uart, timers, counter);
    test_periodic(uart, timers, counter);
    test_self_cancel(uart, timers, counter);

    writeln!(uart, "\r\n=== All Timer Tests Passed ===\r").ok();
}

fn test_ticks_advance<W: Write, C: CounterRegisters>(
    uart: &mut W,
    timers: &TimerService,
    counter: &GlobalCounter<C>,
) {
    write!(uart, "Testing tick rate... ").ok();

    let start = timers.ticks();
    counter.delay_ms(50);
    let elapsed = timers.ticks() - start;
    // one tick of slack either side for phase
    assert!((49..=51).contains(&elapsed), "ticks over 50 ms: {elapsed}");

    writeln!(uart, "PASSED\r").ok();
}

fn test_one_shot<W: Write, C: CounterRegisters>(
    uart: &mut W,
    timers: &TimerService,
    counter: &GlobalCounter<C>,
) {
    write!(uart, "Testing one-shot timer... ").ok();
    reset();

    timers.arm(ONE_SHOT, TimerMode::OneShot, count, 0);
    timers.set(ONE_SHOT, timeout_in_ms(20));
    assert!(timers.remaining(ONE_SHOT) <= 20);

    counter.delay_ms(10);
    assert_eq!(fired(), 0);
    counter.delay_ms(20);
    assert_eq!(fired(), 1);
    assert!(!timers.is_pending(ONE_SHOT));

    writeln!(uart, "PASSED\r").ok();
}

fn test_periodic<W: Write, C: CounterRegisters>(
    uart: &mut W,
    timers: &TimerService,
    counter: &GlobalCounter<C>,
) {
    write!(uart, "Testing periodic timer... ").ok();
    reset();

    timers.arm(PERIODIC, TimerMode::Periodic, count, 0);
    timers.set(PERIODIC, timeout_in_ms(10));
    counter.delay_ms(105);
    timers.cancel(PERIODIC);

    let n = fired();
    assert!((9..=11).contains(&n), "periodic fired {n} times");

    writeln!(uart, "PASSED\r").ok();
}

fn cancel_self(data: usize) {
    count(data);
    #[allow(clippy::cast_possible_truncation)]
    SELF_TIMERS.with(|timers| timers.cancel(TimerId::new(data as u8)));
}

/// Service handle for callbacks that need to reach back into it.
struct ServiceSlot(Mutex<Cell<Option<&'static TimerService>>>);

impl ServiceSlot {
    fn with(&self, f: impl FnOnce(&TimerService)) {
        if let Some(timers) = critical_section::with(|cs| self.0.borrow(cs).get()) {
            f(timers);
        }
    }
}

static SELF_TIMERS: ServiceSlot = ServiceSlot(Mutex::new(Cell::new(None)));

fn test_self_cancel<W: Write, C: CounterRegisters>(
    uart: &mut W,
    timers: &'static TimerService,
    counter: &GlobalCounter<C>,
) {
    write!(uart, "Testing periodic self-cancel... ").ok();
    reset();
    critical_section::with(|cs| SELF_TIMERS.0.borrow(cs).set(Some(timers)));

    timers.arm(
        SELF_CANCEL,
        TimerMode::Periodic,
        cancel_self,
        SELF_CANCEL.index(),
    );
    timers.set(SELF_CANCEL, timeout_in_ms(5));
    counter.delay_ms(30);

    assert_eq!(fired(), 1);
    assert!(!timers.is_pending(SELF_CANCEL));

    writeln!(uart, "PASSED\r").ok();
}
