// libjensen/src/dispatcher/lock.rs

//! Ticket lock: callers are served strictly in the order they called
//! `lock`, which `std::sync::Mutex` does not promise.

use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tickets {
    next: u64,
    serving: u64,
}

/// Mutex granting access in request order.
#[derive(Debug, Default)]
pub struct FifoMutex<T> {
    tickets: Mutex<Tickets>,
    turn: Condvar,
    value: Mutex<T>,
}

impl<T> FifoMutex<T> {
    /// Wrap `value`.
    pub fn new(value: T) -> Self {
        Self {
            tickets: Mutex::new(Tickets::default()),
            turn: Condvar::new(),
            value: Mutex::new(value),
        }
    }

    /// Block until every earlier caller has released the lock.
    pub fn lock(&self) -> FifoGuard<'_, T> {
        let mut t = self.tickets.lock().unwrap_or_else(|p| p.into_inner());
        let ticket = t.next;
        t.next += 1;
        while t.serving != ticket {
            t = self.turn.wait(t).unwrap_or_else(|p| p.into_inner());
        }
        drop(t);

        // Only the ticket holder reaches this point, so it never contends.
        let guard = self.value.lock().unwrap_or_else(|p| p.into_inner());
        FifoGuard {
            owner: self,
            guard: Some(guard),
        }
    }

    /// Number of callers holding or waiting for the lock.
    #[cfg(test)]
    fn queue_len(&self) -> u64 {
        let t = self.tickets.lock().unwrap_or_else(|p| p.into_inner());
        t.next - t.serving
    }
}

/// Access to the value of a [`FifoMutex`]; the next ticket is served on drop.
pub struct FifoGuard<'a, T> {
    owner: &'a FifoMutex<T>,
    guard: Option<MutexGuard<'a, T>>,
}

impl<T> Deref for FifoGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.guard.as_deref() {
            Some(v) => v,
            None => unreachable!("guard is only taken in drop"),
        }
    }
}

impl<T> DerefMut for FifoGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match self.guard.as_deref_mut() {
            Some(v) => v,
            None => unreachable!("guard is only taken in drop"),
        }
    }
}

impl<T> Drop for FifoGuard<'_, T> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut t = self.owner.tickets.lock().unwrap_or_else(|p| p.into_inner());
        t.serving += 1;
        self.owner.turn.notify_all();
    }
}
