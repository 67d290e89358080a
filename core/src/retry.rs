//! Bounded retry loop around the transport.
//!
//! # Design
//! Attempts run strictly one after another. Every attempt except the first is
//! preceded by a fixed delay taken through a `Pause`, which the host can
//! interrupt. The loop ends as soon as any response arrives: HTTP error
//! statuses are never retried, only transport failures are.
//!
//! An interrupted delay counts as a failed attempt. The loop still moves on to
//! the next attempt if one remains, and the interruption becomes the terminal
//! cause if it hit the last one.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{HttpCallError, TransportError, TransportErrorKind};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// How many attempts to make and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Always at least 1.
    pub max_attempts: u32,
    /// Fixed delay before every attempt after the first.
    pub delay: Duration,
    /// Whether an exhausted loop stops the build.
    pub fail_on_error: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::from_millis(crate::config::DEFAULT_RETRY_DELAY_MS),
            fail_on_error: true,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_fail_on_error(mut self, fail: bool) -> Self {
        self.fail_on_error = fail;
        self
    }
}

/// A delay was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

/// A timed wait the host can cut short.
pub trait Pause {
    fn pause(&self, delay: Duration) -> Result<(), Interrupted>;
}

impl<P: Pause + ?Sized> Pause for &P {
    fn pause(&self, delay: Duration) -> Result<(), Interrupted> {
        (**self).pause(delay)
    }
}

/// Cloneable interrupt handle and the default `Pause`.
///
/// `trigger()` wakes a pending `pause` (or the next one to start) early. The
/// pause that observes the trigger consumes it, so later delays wait their
/// full length again.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let (flag, wake) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        wake.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Pause for Interrupt {
    fn pause(&self, delay: Duration) -> Result<(), Interrupted> {
        let (flag, wake) = &*self.inner;
        let deadline = Instant::now() + delay;
        let mut triggered = flag.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if *triggered {
                *triggered = false;
                return Err(Interrupted);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            triggered = wake
                .wait_timeout(triggered, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

/// Every attempt failed at the transport level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalFailure {
    pub attempts: u32,
    pub last_error: TransportError,
}

impl From<TerminalFailure> for HttpCallError {
    fn from(failure: TerminalFailure) -> Self {
        HttpCallError::RetriesExhausted {
            attempts: failure.attempts,
            source: failure.last_error,
        }
    }
}

/// Drives a transport through the retry loop described by a `RetryPolicy`.
#[derive(Debug, Clone)]
pub struct RetryExecutor<T, P = Interrupt> {
    transport: T,
    pause: P,
}

impl<T: Transport> RetryExecutor<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            pause: Interrupt::default(),
        }
    }
}

impl<T: Transport, P: Pause> RetryExecutor<T, P> {
    pub fn with_pause<Q: Pause>(self, pause: Q) -> RetryExecutor<T, Q> {
        RetryExecutor {
            transport: self.transport,
            pause,
        }
    }

    /// Send `request` until a response arrives or attempts run out.
    pub fn execute(
        &self,
        request: &HttpRequest,
        policy: &RetryPolicy,
    ) -> Result<HttpResponse, TerminalFailure> {
        let max_attempts = policy.max_attempts.max(1);
        let retries = max_attempts - 1;
        let mut last_error = None;

        for attempt in 0..max_attempts {
            let outcome = if attempt > 0 {
                info!("Retry attempt {attempt}/{retries}");
                match self.pause.pause(policy.delay) {
                    Ok(()) => self.transport.send(request),
                    Err(Interrupted) => Err(TransportError::new(
                        TransportErrorKind::Interrupted,
                        "interrupted while waiting to retry",
                    )),
                }
            } else {
                self.transport.send(request)
            };

            match outcome {
                Ok(response) => {
                    if attempt > 0 {
                        debug!("Request succeeded after {} attempts", attempt + 1);
                    }
                    return Ok(response);
                }
                Err(err) => {
                    if attempt < retries {
                        warn!("HTTP call failed, retrying: {err}");
                    }
                    last_error = Some(err);
                }
            }
        }

        Err(TerminalFailure {
            attempts: max_attempts,
            last_error: last_error.unwrap_or_else(|| {
                TransportError::new(TransportErrorKind::Io, "no attempt was made")
            }),
        })
    }
}
