//! Trailing-edge debouncing on top of [`TimerRegistry`].
//!
//! A debouncer owns at most one pending timer. Each call cancels the pending
//! timer and arms a fresh one carrying the latest arguments, so a burst of
//! calls collapses into a single execution `delay` after the last call.

use crate::timers::{TimerId, TimerRegistry};

#[derive(Debug)]
struct Pending<A> {
    timer: TimerId,
    args: A,
}

#[derive(Debug)]
pub struct Debouncer<A> {
    delay_ms: u64,
    pending: Option<Pending<A>>,
}

impl<A> Debouncer<A> {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Schedules (or reschedules) the trailing execution with `args`.
    pub fn call<T: Clone>(&mut self, timers: &mut TimerRegistry<T>, task: T, args: A) -> TimerId {
        if let Some(previous) = self.pending.take() {
            timers.clear_timer(previous.timer);
        }
        let timer = timers.set_timeout(self.delay_ms, task);
        self.pending = Some(Pending { timer, args });
        timer
    }

    /// Claims the arguments of the final call if `timer` is the live one.
    /// Superseded or foreign timers yield `None`.
    pub fn take_fired(&mut self, timer: TimerId) -> Option<A> {
        if self.owns(timer) {
            self.pending.take().map(|pending| pending.args)
        } else {
            None
        }
    }

    pub fn owns(&self, timer: TimerId) -> bool {
        self.pending.as_ref().is_some_and(|p| p.timer == timer)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel<T: Clone>(&mut self, timers: &mut TimerRegistry<T>) {
        if let Some(pending) = self.pending.take() {
            timers.clear_timer(pending.timer);
        }
    }
}

/// A debouncer bound to the handler it rate-limits.
pub struct Debounced<A, F>
where
    F: FnMut(A),
{
    debouncer: Debouncer<A>,
    handler: F,
}

impl<A, F> Debounced<A, F>
where
    F: FnMut(A),
{
    pub fn new(delay_ms: u64, handler: F) -> Self {
        Self {
            debouncer: Debouncer::new(delay_ms),
            handler,
        }
    }

    pub fn call<T: Clone>(&mut self, timers: &mut TimerRegistry<T>, task: T, args: A) -> TimerId {
        self.debouncer.call(timers, task, args)
    }

    /// Runs the handler if `timer` is this wrapper's live timer.
    pub fn fire(&mut self, timer: TimerId) -> bool {
        match self.debouncer.take_fired(timer) {
            Some(args) => {
                (self.handler)(args);
                true
            }
            None => false,
        }
    }

    pub fn cancel<T: Clone>(&mut self, timers: &mut TimerRegistry<T>) {
        self.debouncer.cancel(timers);
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}
