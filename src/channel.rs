//! Bounded channel for state notifications.
//!
//! A multi-sender channel built on `critical-section` and `heapless::Deque`.
//! Handles own an `Arc` to the channel so they can move between threads.
//! Receivers may block; a waiting thread is parked and unparked by the next
//! send.

use core::cell::RefCell;
use std::sync::Arc;
use std::thread::{self, Thread};

use critical_section::Mutex;
use embassy_time::{Duration, Instant};
use heapless::Deque;

/// Error returned when trying to receive from an empty channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryReceiveError;

struct Inner<T, const SIZE: usize> {
    queue: Deque<T, SIZE>,
    waiters: Vec<Thread>,
}

/// A bounded, thread-safe channel backed by a fixed-size `heapless::Deque`.
pub struct Channel<T, const SIZE: usize> {
    inner: Mutex<RefCell<Inner<T, SIZE>>>,
}

impl<T, const SIZE: usize> Channel<T, SIZE> {
    /// Create a new empty channel.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                queue: Deque::new(),
                waiters: Vec::new(),
            })),
        }
    }

    /// Get a sender handle for this channel.
    pub fn sender(self: &Arc<Self>) -> Sender<T, SIZE> {
        Sender {
            channel: Arc::clone(self),
        }
    }

    /// Get a receiver handle for this channel.
    ///
    /// Clones of a receiver compete for messages.
    pub fn receiver(self: &Arc<Self>) -> Receiver<T, SIZE> {
        Receiver {
            channel: Arc::clone(self),
        }
    }

    /// Send a value, dropping the oldest queued one if the channel is full.
    ///
    /// Returns the dropped value.
    pub fn send_overwrite(&self, value: T) -> Option<T> {
        let (dropped, waiters) = critical_section::with(|cs| {
            let mut inner = self.inner.borrow(cs).borrow_mut();
            let dropped = if inner.queue.is_full() {
                inner.queue.pop_front()
            } else {
                None
            };
            // Cannot fail, a slot was freed above
            let _ = inner.queue.push_back(value);
            (dropped, core::mem::take(&mut inner.waiters))
        });

        for waiter in waiters {
            waiter.unpark();
        }
        dropped
    }

    /// Try to receive a value from the channel.
    ///
    /// Returns `Err(TryReceiveError)` if the channel is empty.
    pub fn try_receive(&self) -> Result<T, TryReceiveError> {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow(cs).borrow_mut();
            inner.queue.pop_front().ok_or(TryReceiveError)
        })
    }

    /// Pop a value, or register the current thread to be unparked by the
    /// next send.
    fn receive_or_register(&self) -> Option<T> {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow(cs).borrow_mut();
            let value = inner.queue.pop_front();
            if value.is_none() {
                let current = thread::current();
                if !inner.waiters.iter().any(|waiter| waiter.id() == current.id()) {
                    inner.waiters.push(current);
                }
            }
            value
        })
    }

    /// Block until a value arrives.
    pub fn receive(&self) -> T {
        loop {
            if let Some(value) = self.receive_or_register() {
                return value;
            }
            thread::park();
        }
    }

    /// Block until a value arrives or `timeout` elapses.
    pub fn receive_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(value) = self.receive_or_register() {
                return Some(value);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let remaining = deadline.saturating_duration_since(now);
            thread::park_timeout(std::time::Duration::from_micros(remaining.as_micros()));
        }
    }
}

impl<T, const SIZE: usize> Default for Channel<T, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// A sender handle for a [`Channel`].
pub struct Sender<T, const SIZE: usize> {
    channel: Arc<Channel<T, SIZE>>,
}

impl<T, const SIZE: usize> Clone for Sender<T, SIZE> {
    fn clone(&self) -> Self {
        Self {
            channel: Arc::clone(&self.channel),
        }
    }
}

impl<T, const SIZE: usize> Sender<T, SIZE> {
    /// Send a value, dropping the oldest queued one if the channel is full.
    pub fn send_overwrite(&self, value: T) -> Option<T> {
        self.channel.send_overwrite(value)
    }

    /// Whether every other handle of the channel is gone
    pub fn is_closed(&self) -> bool {
        Arc::strong_count(&self.channel) == 1
    }
}

/// A receiver handle for a [`Channel`].
pub struct Receiver<T, const SIZE: usize> {
    channel: Arc<Channel<T, SIZE>>,
}

impl<T, const SIZE: usize> Clone for Receiver<T, SIZE> {
    fn clone(&self) -> Self {
        Self {
            channel: Arc::clone(&self.channel),
        }
    }
}

impl<T, const SIZE: usize> Receiver<T, SIZE> {
    /// Try to receive a value from the channel.
    ///
    /// Returns `Err(TryReceiveError)` if the channel is empty.
    pub fn try_receive(&self) -> Result<T, TryReceiveError> {
        self.channel.try_receive()
    }

    /// Block until a value arrives.
    pub fn receive(&self) -> T {
        self.channel.receive()
    }

    /// Block until a value arrives, giving up after `timeout`.
    pub fn receive_timeout(&self, timeout: Duration) -> Option<T> {
        self.channel.receive_timeout(timeout)
    }

    /// Drain everything queued right now
    pub fn drain(&self) -> impl Iterator<Item = T> + '_ {
        core::iter::from_fn(|| self.channel.try_receive().ok())
    }
}
