// Licensed under the Apache-2.0 license

//! Tick-driven software timers.
//!
//! A [`TimerService`] keeps every scheduled timer in one list ordered by the
//! time left until expiry. The periodic tick interrupt calls
//! [`TimerService::on_tick`], which only has to look at the head of the list:
//! firing `k` timers costs O(k), not O(armed timers).
//!
//! # Identity
//!
//! Timers are not allocated. Each client owns a [`TimerId`] (usually a `const`)
//! and binds a callback to it with [`TimerService::arm`]. The id doubles as the
//! timer's node in the armed list.
//!
//! # Time arithmetic
//!
//! The service counts ticks in 64 bits, but expiry instants are 32-bit and
//! compared as points on a ring: the order of two timers is the order of
//! `expire - now` computed with [`tick_sub`]. Timeouts may therefore span up to
//! `u32::MAX` ticks regardless of how long the system has been running.
//!
//! # Concurrency
//!
//! All state lives behind a `critical_section::Mutex`. Callbacks run from
//! [`TimerService::on_tick`] with the critical section held (interrupt context
//! on target) but without the state borrowed, so they may call back into the
//! service. They must be short and must not block.

use core::cell::RefCell;

use critical_section::Mutex;
use fugit::MillisDurationU32;
use heapless::Vec;

use crate::list::{Links, NodeId};

/// Number of timer ids the service can track.
pub const MAX_TIMERS: usize = 16;

/// Length of one tick in milliseconds.
pub const MS_PER_TICK: u32 = 1;

/// Tick interrupt rate.
pub const TICK_HZ: u32 = 1000 / MS_PER_TICK;

/// Duration expressed in service ticks.
pub type TickDuration = fugit::TimerDurationU32<TICK_HZ>;

/// Called with the `data` value bound in [`TimerService::arm`].
pub type TimerCallback = fn(data: usize);

#[must_use]
pub const fn timeout_in_ms(ms: u32) -> u32 {
    ms / MS_PER_TICK
}

#[must_use]
pub const fn timeout_in_sec(sec: u32) -> u32 {
    sec * TICK_HZ
}

#[must_use]
pub const fn ticks_to_ms(ticks: u32) -> u32 {
    ticks * MS_PER_TICK
}

#[must_use]
pub const fn ticks_to_sec(ticks: u32) -> u32 {
    ticks / TICK_HZ
}

/// Distance from `b` forward to `a` on the 32-bit tick ring, `(a - b) mod 2^32`.
#[must_use]
pub const fn tick_sub(a: u32, b: u32) -> u32 {
    a.wrapping_sub(b)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerMode {
    /// Fires once, then stays idle until set again.
    OneShot,
    /// Re-schedules itself for another `timeout` each time it fires.
    Periodic,
}

/// Caller-held timer identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u8);

impl TimerId {
    /// # Panics
    ///
    /// Panics if `index >= MAX_TIMERS`.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        assert!((index as usize) < MAX_TIMERS, "timer id out of range");
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    const fn node(self) -> NodeId {
        NodeId::new(self.0 as u16)
    }
}

/// Hardware that raises the periodic tick interrupt.
pub trait TickSource {
    /// Start generating ticks. The platform routes the interrupt to
    /// [`TimerService::on_tick`].
    fn start(&mut self);
}

#[derive(Clone, Copy)]
struct Binding {
    mode: TimerMode,
    callback: TimerCallback,
    data: usize,
}

#[derive(Clone, Copy)]
struct TimerSlot {
    binding: Option<Binding>,
    timeout: u32,
    expire: u32,
}

impl TimerSlot {
    const UNBOUND: Self = Self {
        binding: None,
        timeout: 0,
        expire: 0,
    };
}

/// Sentinel of the armed list; sits right after the timer nodes.
const ARMED: NodeId = NodeId::new(MAX_TIMERS as u16);

struct TimerQueue {
    tick: u64,
    links: Links<{ MAX_TIMERS + 1 }>,
    slots: [TimerSlot; MAX_TIMERS],
}

fn slot(slots: &[TimerSlot; MAX_TIMERS], node: NodeId) -> &TimerSlot {
    match slots.get(node.index()) {
        Some(s) => s,
        None => panic!("node {} is not a timer", node.index()),
    }
}

impl TimerQueue {
    const fn new() -> Self {
        Self {
            tick: 0,
            links: Links::with_head(ARMED),
            slots: [TimerSlot::UNBOUND; MAX_TIMERS],
        }
    }

    fn reset(&mut self) {
        self.tick = 0;
        self.links = Links::with_head(ARMED);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn now(&self) -> u32 {
        self.tick as u32
    }

    fn slot_mut(&mut self, timer: TimerId) -> &mut TimerSlot {
        match self.slots.get_mut(timer.index()) {
            Some(s) => s,
            None => panic!("timer {} out of range", timer.index()),
        }
    }

    fn remaining(&self, timer: TimerId) -> u32 {
        tick_sub(slot(&self.slots, timer.node()).expire, self.now())
    }

    fn is_pending(&self, timer: TimerId) -> bool {
        self.links.is_linked(timer.node())
    }

    fn cancel(&mut self, timer: TimerId) {
        if self.is_pending(timer) {
            self.links.delete(timer.node());
        }
    }

    fn arm(&mut self, timer: TimerId, binding: Binding) {
        self.cancel(timer);
        *self.slot_mut(timer) = TimerSlot {
            binding: Some(binding),
            timeout: 0,
            expire: 0,
        };
    }

    fn schedule(&mut self, timer: TimerId, timeout: u32) {
        assert!(timeout > 0, "timer {} set with zero timeout", timer.index());
        assert!(
            self.slot_mut(timer).binding.is_some(),
            "timer {} set before arm",
            timer.index()
        );

        self.cancel(timer);

        let now = self.now();
        let entry = self.slot_mut(timer);
        entry.timeout = timeout;
        entry.expire = now.wrapping_add(timeout);

        let node = timer.node();
        if self.links.is_empty(ARMED) {
            self.links.add_after(ARMED, node);
            return;
        }

        // Insert ahead of the first timer with strictly more time left, so
        // equal deadlines keep their insertion order.
        let slots = &self.slots;
        let later = self
            .links
            .iter(ARMED)
            .find(|&n| tick_sub(slot(slots, n).expire, now) > timeout);
        match later {
            Some(anchor) => self.links.insert_before(anchor, node),
            None => self.links.insert_before(ARMED, node),
        }
    }

    /// Unlink the head timer if it expires on the current tick, re-arming it
    /// when periodic, and hand back what to call.
    fn pop_due(&mut self) -> Option<(TimerCallback, usize)> {
        let head = self.links.first(ARMED)?;
        let due = *slot(&self.slots, head);
        if due.expire != self.now() {
            return None;
        }

        self.links.delete(head);
        let binding = due.binding?;
        if binding.mode == TimerMode::Periodic {
            #[allow(clippy::cast_possible_truncation)]
            let timer = TimerId(head.index() as u8);
            self.schedule(timer, due.timeout);
        }
        Some((binding.callback, binding.data))
    }

    fn pending(&self) -> Vec<TimerId, MAX_TIMERS> {
        let mut out = Vec::new();
        for node in self.links.iter(ARMED) {
            #[allow(clippy::cast_possible_truncation)]
            let _ = out.push(TimerId(node.index() as u8));
        }
        out
    }
}

/// Process-wide timer queue shared between foreground code and the tick ISR.
pub struct TimerService {
    queue: Mutex<RefCell<TimerQueue>>,
}

impl Default for TimerService {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerService {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            queue: Mutex::new(RefCell::new(TimerQueue::new())),
        }
    }

    /// Reset the tick count, drop every scheduled timer and start the tick
    /// source.
    pub fn init<S: TickSource + ?Sized>(&self, source: &mut S) {
        critical_section::with(|cs| self.queue.borrow_ref_mut(cs).reset());
        source.start();
    }

    /// Bind `callback` and `data` to `timer`. Does not schedule it; a timer
    /// that was scheduled is cancelled first.
    pub fn arm(&self, timer: TimerId, mode: TimerMode, callback: TimerCallback, data: usize) {
        let binding = Binding {
            mode,
            callback,
            data,
        };
        critical_section::with(|cs| self.queue.borrow_ref_mut(cs).arm(timer, binding));
    }

    /// (Re)schedule `timer` to fire `timeout` ticks from now.
    ///
    /// # Panics
    ///
    /// Panics if `timeout` is zero or `timer` was never armed.
    pub fn set(&self, timer: TimerId, timeout: u32) {
        critical_section::with(|cs| self.queue.borrow_ref_mut(cs).schedule(timer, timeout));
    }

    /// [`TimerService::set`] with the timeout given as a duration, rounded
    /// down to whole ticks.
    pub fn set_duration(&self, timer: TimerId, duration: MillisDurationU32) {
        let ticks: TickDuration = duration.convert();
        self.set(timer, ticks.ticks());
    }

    /// Unschedule `timer`. No-op if it is not pending.
    pub fn cancel(&self, timer: TimerId) {
        critical_section::with(|cs| self.queue.borrow_ref_mut(cs).cancel(timer));
    }

    /// Ticks left until `timer` expires; 0 on its expiry tick.
    #[must_use]
    pub fn remaining(&self, timer: TimerId) -> u32 {
        critical_section::with(|cs| self.queue.borrow_ref(cs).remaining(timer))
    }

    /// Ticks since [`TimerService::init`].
    #[must_use]
    pub fn ticks(&self) -> u64 {
        critical_section::with(|cs| self.queue.borrow_ref(cs).tick)
    }

    /// True while `timer` is scheduled and has not fired.
    #[must_use]
    pub fn is_pending(&self, timer: TimerId) -> bool {
        critical_section::with(|cs| self.queue.borrow_ref(cs).is_pending(timer))
    }

    /// Scheduled timers in firing order.
    #[must_use]
    pub fn pending(&self) -> Vec<TimerId, MAX_TIMERS> {
        critical_section::with(|cs| self.queue.borrow_ref(cs).pending())
    }

    /// Tick interrupt handler.
    pub fn on_tick(&self) {
        critical_section::with(|cs| {
            {
                let mut queue = self.queue.borrow_ref_mut(cs);
                queue.tick = queue.tick.wrapping_add(1);
            }
            // The list is sorted, so stop at the first timer still in the future.
            // The borrow must end before the callback runs.
            loop {
                let due = self.queue.borrow_ref_mut(cs).pop_due();
                let Some((callback, data)) = due else { break };
                callback(data);
            }
        });
    }

    #[cfg(test)]
    fn set_tick(&self, tick: u64) {
        critical_section::with(|cs| self.queue.borrow_ref_mut(cs).tick = tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use std::vec::Vec as StdVec;

    const A: TimerId = TimerId::new(0);
    const B: TimerId = TimerId::new(1);
    const C: TimerId = TimerId::new(2);
    const D: TimerId = TimerId::new(3);

    std::thread_local! {
        static FIRED: RefCell<StdVec<usize>> = const { RefCell::new(StdVec::new()) };
    }

    fn record(data: usize) {
        FIRED.with(|f| f.borrow_mut().push(data));
    }

    fn take_fired() -> StdVec<usize> {
        FIRED.with(|f| f.borrow_mut().drain(..).collect())
    }

    fn service_with(timers: &[(TimerId, TimerMode)]) -> TimerService {
        take_fired();
        let svc = TimerService::new();
        for &(t, mode) in timers {
            svc.arm(t, mode, record, t.index());
        }
        svc
    }

    fn ticks(svc: &TimerService, n: u32) {
        for _ in 0..n {
            svc.on_tick();
        }
    }

    fn pending(svc: &TimerService) -> StdVec<TimerId> {
        svc.pending().iter().copied().collect()
    }

    struct CountingSource {
        starts: Cell<u32>,
    }

    impl TickSource for CountingSource {
        fn start(&mut self) {
            self.starts.set(self.starts.get() + 1);
        }
    }

    #[test]
    fn test_tick_sub_is_ring_subtraction() {
        assert_eq!(tick_sub(5, 0xFFFF_FFFB), 10);
        assert_eq!(tick_sub(10, 3), 7);
        assert_eq!(tick_sub(0, 1), u32::MAX);
        assert_eq!(tick_sub(7, 7), 0);
    }

    #[test]
    fn test_unit_conversions() {
        assert_eq!(timeout_in_ms(250), 250);
        assert_eq!(timeout_in_sec(2), 2000);
        assert_eq!(ticks_to_ms(40), 40);
        assert_eq!(ticks_to_sec(4500), 4);
    }

    #[test]
    fn test_init_resets_and_starts_source() {
        let svc = service_with(&[(A, TimerMode::OneShot)]);
        svc.set(A, 10);
        ticks(&svc, 3);

        let mut source = CountingSource { starts: Cell::new(0) };
        svc.init(&mut source);

        assert_eq!(source.starts.get(), 1);
        assert_eq!(svc.ticks(), 0);
        assert!(!svc.is_pending(A));
        assert!(pending(&svc).is_empty());
    }

    #[test]
    fn test_arm_does_not_schedule() {
        let svc = service_with(&[(A, TimerMode::OneShot)]);
        assert!(!svc.is_pending(A));
        ticks(&svc, 5);
        assert!(take_fired().is_empty());
    }

    #[test]
    fn test_set_keeps_list_sorted_by_remaining_time() {
        let svc = service_with(&[
            (A, TimerMode::OneShot),
            (B, TimerMode::OneShot),
            (C, TimerMode::OneShot),
            (D, TimerMode::OneShot),
        ]);

        svc.set(A, 30);
        assert_eq!(pending(&svc), [A]);
        svc.set(B, 10);
        assert_eq!(pending(&svc), [B, A]);
        svc.set(C, 20);
        assert_eq!(pending(&svc), [B, C, A]);
        ticks(&svc, 5);
        // D expires at tick 45, after A at 30
        svc.set(D, 40);
        assert_eq!(pending(&svc), [B, C, A, D]);
        svc.set(B, 18);
        assert_eq!(pending(&svc), [C, B, A, D]);
    }

    #[test]
    fn test_equal_deadlines_fire_in_insertion_order() {
        let svc = service_with(&[
            (A, TimerMode::OneShot),
            (B, TimerMode::OneShot),
            (C, TimerMode::OneShot),
        ]);
        svc.set(C, 5);
        svc.set(A, 5);
        svc.set(B, 5);
        assert_eq!(pending(&svc), [C, A, B]);

        ticks(&svc, 4);
        assert!(take_fired().is_empty());
        ticks(&svc, 1);
        assert_eq!(take_fired(), [C.index(), A.index(), B.index()]);
        assert!(pending(&svc).is_empty());
    }

    #[test]
    fn test_cancel_then_set_matches_fresh_set() {
        let fresh = service_with(&[(A, TimerMode::OneShot), (B, TimerMode::OneShot)]);
        fresh.set(B, 8);
        fresh.set(A, 12);

        let reused = service_with(&[(A, TimerMode::OneShot), (B, TimerMode::OneShot)]);
        reused.set(B, 8);
        reused.set(A, 3);
        reused.cancel(A);
        reused.set(A, 12);

        assert_eq!(pending(&fresh), pending(&reused));
        assert_eq!(fresh.remaining(A), reused.remaining(A));
    }

    #[test]
    fn test_cancel_unarmed_or_fired_is_noop() {
        let svc = service_with(&[(A, TimerMode::OneShot), (B, TimerMode::OneShot)]);
        svc.cancel(A);
        svc.cancel(C);

        svc.set(A, 2);
        svc.set(B, 9);
        ticks(&svc, 2);
        assert_eq!(take_fired(), [A.index()]);

        svc.cancel(A);
        svc.cancel(A);
        assert_eq!(pending(&svc), [B]);
    }

    #[test]
    fn test_cancelled_timer_does_not_fire() {
        let svc = service_with(&[(A, TimerMode::OneShot)]);
        svc.set(A, 3);
        ticks(&svc, 2);
        svc.cancel(A);
        ticks(&svc, 10);
        assert!(take_fired().is_empty());
    }

    #[test]
    fn test_remaining_counts_down_to_zero() {
        let svc = service_with(&[(A, TimerMode::OneShot)]);
        svc.set(A, 25);
        assert_eq!(svc.remaining(A), 25);

        ticks(&svc, 10);
        assert_eq!(svc.remaining(A), 15);

        ticks(&svc, 15);
        assert_eq!(svc.remaining(A), 0);
        assert_eq!(take_fired(), [A.index()]);
        assert!(!svc.is_pending(A));
    }

    #[test]
    fn test_only_due_timers_fire() {
        let svc = service_with(&[
            (A, TimerMode::OneShot),
            (B, TimerMode::OneShot),
            (C, TimerMode::OneShot),
        ]);
        svc.set(A, 4);
        svc.set(B, 4);
        svc.set(C, 5);

        ticks(&svc, 4);
        assert_eq!(take_fired(), [A.index(), B.index()]);
        assert_eq!(pending(&svc), [C]);
    }

    #[test]
    fn test_periodic_fires_on_exact_multiples() {
        static SVC: TimerService = TimerService::new();
        std::thread_local! {
            static AT: RefCell<StdVec<u64>> = const { RefCell::new(StdVec::new()) };
        }
        fn stamp(_: usize) {
            AT.with(|a| a.borrow_mut().push(SVC.ticks()));
        }

        SVC.set_tick(1000);
        SVC.arm(A, TimerMode::Periodic, stamp, 0);
        SVC.set(A, 7);
        ticks(&SVC, 7 * 5);

        let at = AT.with(|a| a.borrow().clone());
        assert_eq!(at, [1007, 1014, 1021, 1028, 1035]);
        assert!(SVC.is_pending(A));
        assert_eq!(SVC.remaining(A), 7);
    }

    #[test]
    fn test_periodic_rearm_queues_behind_equal_deadline() {
        let svc = service_with(&[(A, TimerMode::Periodic), (B, TimerMode::OneShot)]);
        svc.set(A, 3);
        svc.set(B, 6);

        ticks(&svc, 3);
        assert_eq!(take_fired(), [A.index()]);
        // A re-armed for tick 6, where B was already waiting
        assert_eq!(pending(&svc), [B, A]);

        ticks(&svc, 3);
        assert_eq!(take_fired(), [B.index(), A.index()]);
        assert_eq!(pending(&svc), [A]);
    }

    #[test]
    fn test_callback_cancelling_itself_stops_periodic_timer() {
        static SVC: TimerService = TimerService::new();
        static CALLS: core::sync::atomic::AtomicU32 = core::sync::atomic::AtomicU32::new(0);
        fn once(data: usize) {
            CALLS.fetch_add(1, core::sync::atomic::Ordering::Relaxed);
            #[allow(clippy::cast_possible_truncation)]
            SVC.cancel(TimerId::new(data as u8));
        }

        SVC.arm(B, TimerMode::Periodic, once, B.index());
        SVC.set(B, 2);
        ticks(&SVC, 20);

        assert_eq!(CALLS.load(core::sync::atomic::Ordering::Relaxed), 1);
        assert!(!SVC.is_pending(B));
    }

    #[test]
    fn test_callback_may_schedule_other_timers() {
        static SVC: TimerService = TimerService::new();
        std::thread_local! {
            static LOG: RefCell<StdVec<(usize, u64)>> = const { RefCell::new(StdVec::new()) };
        }
        fn chain(data: usize) {
            LOG.with(|l| l.borrow_mut().push((data, SVC.ticks())));
            if data == 0 {
                SVC.set(TimerId::new(1), 4);
            }
        }

        SVC.arm(A, TimerMode::OneShot, chain, 0);
        SVC.arm(B, TimerMode::OneShot, chain, 1);
        SVC.set(A, 2);
        ticks(&SVC, 10);

        let log = LOG.with(|l| l.borrow().clone());
        assert_eq!(log, [(0, 2), (1, 6)]);
    }

    #[test]
    fn test_callback_may_query_service() {
        static SVC: TimerService = TimerService::new();
        std::thread_local! {
            static SEEN: Cell<Option<(u64, u32, bool, bool)>> = const { Cell::new(None) };
        }
        fn query(_: usize) {
            let seen = (SVC.ticks(), SVC.remaining(B), SVC.is_pending(A), SVC.is_pending(B));
            SEEN.with(|s| s.set(Some(seen)));
        }
        fn idle(_: usize) {}

        SVC.arm(A, TimerMode::OneShot, query, 0);
        SVC.arm(B, TimerMode::OneShot, idle, 0);
        SVC.set(A, 3);
        SVC.set(B, 10);
        ticks(&SVC, 3);

        // A is already unlinked when its callback runs
        assert_eq!(SEEN.with(Cell::get), Some((3, 7, false, true)));
    }

    #[test]
    fn test_callback_may_cancel_timer_due_on_same_tick() {
        static SVC: TimerService = TimerService::new();
        std::thread_local! {
            static FIRED_HERE: RefCell<StdVec<usize>> = const { RefCell::new(StdVec::new()) };
        }
        fn cancel_b(data: usize) {
            FIRED_HERE.with(|f| f.borrow_mut().push(data));
            SVC.cancel(B);
        }

        SVC.arm(A, TimerMode::OneShot, cancel_b, 0);
        SVC.arm(B, TimerMode::OneShot, cancel_b, 1);
        SVC.set(A, 4);
        SVC.set(B, 4);
        ticks(&SVC, 10);

        assert_eq!(FIRED_HERE.with(|f| f.borrow().clone()), [0]);
        assert!(SVC.pending().is_empty());
    }

    #[test]
    fn test_callback_may_rebind_itself() {
        static SVC: TimerService = TimerService::new();
        std::thread_local! {
            static LOG: RefCell<StdVec<(usize, u64)>> = const { RefCell::new(StdVec::new()) };
        }
        fn last(data: usize) {
            LOG.with(|l| l.borrow_mut().push((data, SVC.ticks())));
        }
        fn first(data: usize) {
            LOG.with(|l| l.borrow_mut().push((data, SVC.ticks())));
            // drops the periodic re-arm made before this call
            SVC.arm(A, TimerMode::OneShot, last, 1);
            SVC.set(A, 5);
        }

        SVC.arm(A, TimerMode::Periodic, first, 0);
        SVC.set(A, 2);
        ticks(&SVC, 20);

        assert_eq!(LOG.with(|l| l.borrow().clone()), [(0, 2), (1, 7)]);
        assert!(!SVC.is_pending(A));
    }

    #[test]
    fn test_periodic_callback_may_reset_its_own_timeout() {
        static SVC: TimerService = TimerService::new();
        std::thread_local! {
            static AT: RefCell<StdVec<u64>> = const { RefCell::new(StdVec::new()) };
        }
        fn stretch(_: usize) {
            AT.with(|a| a.borrow_mut().push(SVC.ticks()));
            SVC.set(C, 5);
        }

        SVC.arm(C, TimerMode::Periodic, stretch, 0);
        SVC.set(C, 2);
        ticks(&SVC, 12);

        // the first period is 2, every later one is the 5 set from the callback
        assert_eq!(AT.with(|a| a.borrow().clone()), [2, 7, 12]);
        assert_eq!(SVC.remaining(C), 5);
    }

    #[test]
    fn test_ordering_is_wraparound_safe() {
        let svc = service_with(&[(A, TimerMode::OneShot), (B, TimerMode::OneShot)]);
        let start = u64::from(u32::MAX) - 5;
        svc.set_tick(start);

        // A's expiry wraps past zero, B's does not
        svc.set(A, 10);
        svc.set(B, 3);
        assert_eq!(pending(&svc), [B, A]);
        assert_eq!(svc.remaining(A), 10);

        ticks(&svc, 3);
        assert_eq!(take_fired(), [B.index()]);
        ticks(&svc, 7);
        assert_eq!(take_fired(), [A.index()]);
        assert_eq!(svc.ticks(), start + 10);
        assert!(svc.ticks() > u64::from(u32::MAX));
    }

    #[test]
    fn test_rearm_cancels_pending_timer() {
        let svc = service_with(&[(A, TimerMode::OneShot)]);
        svc.set(A, 5);
        svc.arm(A, TimerMode::OneShot, record, 42);
        assert!(!svc.is_pending(A));
        ticks(&svc, 10);
        assert!(take_fired().is_empty());

        svc.set(A, 1);
        ticks(&svc, 1);
        assert_eq!(take_fired(), [42]);
    }

    #[test]
    fn test_set_duration_converts_to_ticks() {
        let svc = service_with(&[(A, TimerMode::OneShot)]);
        svc.set_duration(A, MillisDurationU32::millis(250));
        assert_eq!(svc.remaining(A), timeout_in_ms(250));
    }

    #[test]
    #[should_panic(expected = "zero timeout")]
    fn test_zero_timeout_is_fatal() {
        let svc = service_with(&[(A, TimerMode::OneShot)]);
        svc.set(A, 0);
    }

    #[test]
    #[should_panic(expected = "before arm")]
    fn test_set_unarmed_timer_is_fatal() {
        let svc = TimerService::new();
        svc.set(D, 10);
    }

    #[test]
    #[should_panic(expected = "timer id out of range")]
    fn test_timer_id_out_of_range() {
        let _ = TimerId::new(MAX_TIMERS as u8);
    }
}
