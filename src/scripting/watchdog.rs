//! Deadline and cancellation for running guest code
//!
//! The engine's progress hook polls the watchdog between operations; a tripped
//! watchdog terminates the evaluation with a token naming the reason. A single
//! native call is never interrupted, which is what the engine's data size
//! limits are for.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rhai::{Dynamic, EvalAltResult};

use crate::error::BridgeError;

const CANCELLED: &str = "cancelled";
const TIMED_OUT: &str = "timed out";

#[derive(Debug, Default)]
struct State {
    armed: bool,
    cancelled: bool,
    deadline: Option<(Instant, Duration)>,
}

/// Cancel requests only land while an evaluation is armed, so a request that
/// arrives after its target finished never leaks into the next call.
#[derive(Debug, Default)]
pub struct Watchdog {
    state: Mutex<State>,
}

impl Watchdog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Progress hook body: `Some(token)` stops the running evaluation
    pub fn check(&self) -> Option<Dynamic> {
        let state = self.state.lock();
        if state.cancelled {
            return Some(Dynamic::from(CANCELLED.to_string()));
        }
        match state.deadline {
            Some((deadline, _)) if Instant::now() >= deadline => {
                Some(Dynamic::from(TIMED_OUT.to_string()))
            }
            _ => None,
        }
    }

    /// Start the clock for one evaluation. Dropping the guard disarms it.
    pub fn arm(&self, timeout: Option<Duration>) -> Armed<'_> {
        let mut state = self.state.lock();
        state.armed = true;
        state.cancelled = false;
        state.deadline = timeout.map(|t| (Instant::now() + t, t));
        Armed { watchdog: self }
    }

    /// Request cancellation of the armed evaluation.
    /// Returns `false` when nothing was running.
    pub fn cancel(&self) -> bool {
        let mut state = self.state.lock();
        if state.armed {
            state.cancelled = true;
        }
        state.armed
    }

    /// Map a guest runtime error, recognising terminations we caused
    pub fn classify(&self, err: Box<EvalAltResult>) -> BridgeError {
        if let EvalAltResult::ErrorTerminated(token, _) = err.as_ref() {
            let reason = token.to_string();
            if reason == CANCELLED {
                return BridgeError::Cancelled;
            }
            if reason == TIMED_OUT {
                let limit = self.state.lock().deadline.map(|(_, limit)| limit);
                return BridgeError::Timeout(limit.unwrap_or_default());
            }
        }
        BridgeError::Eval(err.to_string())
    }
}

pub struct Armed<'a> {
    watchdog: &'a Watchdog,
}

impl Drop for Armed<'_> {
    fn drop(&mut self) {
        *self.watchdog.state.lock() = State::default();
    }
}

/// Cloneable handle for cancelling the evaluation in flight from another thread
#[derive(Debug, Clone)]
pub struct CancelHandle {
    watchdog: Arc<Watchdog>,
}

impl CancelHandle {
    pub(crate) fn new(watchdog: Arc<Watchdog>) -> Self {
        Self { watchdog }
    }

    /// Abort the evaluation in flight, if any. Returns whether one was.
    pub fn cancel(&self) -> bool {
        self.watchdog.cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_watchdog_never_trips() {
        let watchdog = Watchdog::new();
        assert!(watchdog.check().is_none());
        let _armed = watchdog.arm(Some(Duration::from_secs(60)));
        assert!(watchdog.check().is_none());
    }

    #[test]
    fn expired_deadline_trips() {
        let watchdog = Watchdog::new();
        let _armed = watchdog.arm(Some(Duration::ZERO));
        assert_eq!(watchdog.check().unwrap().to_string(), TIMED_OUT);
    }

    #[test]
    fn disarm_clears_cancel_and_deadline() {
        let watchdog = Watchdog::new();
        {
            let _armed = watchdog.arm(Some(Duration::ZERO));
            assert!(watchdog.cancel());
            assert!(watchdog.check().is_some());
        }
        assert!(watchdog.check().is_none());
    }

    #[test]
    fn cancel_while_idle_is_ignored() {
        let watchdog = Watchdog::new();
        assert!(!watchdog.cancel());

        let _armed = watchdog.arm(None);
        assert!(watchdog.check().is_none());
    }

    #[test]
    fn cancel_after_disarm_does_not_leak() {
        let watchdog = Watchdog::new();
        {
            let _armed = watchdog.arm(None);
        }
        assert!(!watchdog.cancel());
        let _armed = watchdog.arm(None);
        assert!(watchdog.check().is_none());
    }

    #[test]
    fn classify_terminations() {
        let watchdog = Watchdog::new();
        let _armed = watchdog.arm(Some(Duration::from_millis(10)));
        let cancelled = Box::new(EvalAltResult::ErrorTerminated(
            Dynamic::from(CANCELLED.to_string()),
            rhai::Position::NONE,
        ));
        assert!(matches!(watchdog.classify(cancelled), BridgeError::Cancelled));

        let timed_out = Box::new(EvalAltResult::ErrorTerminated(
            Dynamic::from(TIMED_OUT.to_string()),
            rhai::Position::NONE,
        ));
        assert!(matches!(
            watchdog.classify(timed_out),
            BridgeError::Timeout(limit) if limit == Duration::from_millis(10)
        ));
    }
}
