//! The circuit itself: `CLOSED` -> `OPEN` -> `HALF_OPEN` on consecutive L2
//! failures, guarding every outbound call to the remote tier.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use vericache_core::{Clock, EventListeners};

use crate::config::CircuitBreakerConfig;
use crate::error::TierUnavailable;
use crate::events::BreakerEvent;
use crate::state::CircuitState;

/// A consecutive-failure circuit breaker.
///
/// Thread-safe: `state` is published via an `AtomicU8` so [`Circuit::state`]
/// never blocks, and the consecutive-failure counter and last-failure
/// instant use atomics/a small mutex respectively.
pub struct Circuit {
    config: CircuitBreakerConfig,
    clock: Arc<dyn Clock>,
    state: AtomicU8,
    consecutive_failures: AtomicU32,
    last_failure: Mutex<Option<Instant>>,
    half_open_trial_in_flight: AtomicBool,
    listeners: EventListeners<BreakerEvent>,
}

impl Circuit {
    /// Creates a new circuit in the `CLOSED` state.
    pub fn new(config: CircuitBreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            state: AtomicU8::new(CircuitState::Closed as u8),
            consecutive_failures: AtomicU32::new(0),
            last_failure: Mutex::new(None),
            half_open_trial_in_flight: AtomicBool::new(false),
            listeners: EventListeners::new(),
        }
    }

    /// Registers a listener for breaker events.
    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: vericache_core::EventListener<BreakerEvent> + 'static,
    {
        self.listeners.add(listener);
    }

    /// Returns the current state.
    pub fn state(&self) -> CircuitState {
        CircuitState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Returns `Ok(())` if a call may proceed, or `Err(TierUnavailable)` if
    /// the breaker is `OPEN` and the recovery window hasn't elapsed.
    ///
    /// When the recovery window has elapsed, this transitions `OPEN` ->
    /// `HALF_OPEN` and admits exactly one trial call; concurrent callers
    /// during that trial are rejected until the trial resolves via
    /// [`Circuit::on_success`] or [`Circuit::on_failure`].
    pub fn allow(&self) -> Result<(), TierUnavailable> {
        match self.state() {
            CircuitState::Closed => Ok(()),
            CircuitState::HalfOpen => {
                if self
                    .half_open_trial_in_flight
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    Ok(())
                } else {
                    self.emit_rejected();
                    Err(self.unavailable())
                }
            }
            CircuitState::Open => {
                let elapsed_ok = {
                    let last_failure = self.last_failure.lock().expect("mutex poisoned");
                    match *last_failure {
                        Some(at) => self.clock.now().duration_since(at) >= self.config.recovery_window,
                        None => true,
                    }
                };

                if elapsed_ok {
                    self.transition_to(CircuitState::HalfOpen);
                    self.half_open_trial_in_flight.store(true, Ordering::Release);
                    Ok(())
                } else {
                    self.emit_rejected();
                    Err(self.unavailable())
                }
            }
        }
    }

    /// Records a successful call.
    pub fn on_success(&self) {
        match self.state() {
            CircuitState::HalfOpen => {
                self.half_open_trial_in_flight.store(false, Ordering::Release);
                self.consecutive_failures.store(0, Ordering::Release);
                self.transition_to(CircuitState::Closed);
            }
            CircuitState::Closed => {
                self.consecutive_failures.store(0, Ordering::Release);
            }
            CircuitState::Open => {}
        }
    }

    /// Records a failed call.
    pub fn on_failure(&self) {
        *self.last_failure.lock().expect("mutex poisoned") = Some(self.clock.now());

        match self.state() {
            CircuitState::HalfOpen => {
                self.half_open_trial_in_flight.store(false, Ordering::Release);
                self.transition_to(CircuitState::Open);
            }
            CircuitState::Closed => {
                let failures = self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1;
                if failures >= self.config.failure_threshold {
                    self.transition_to(CircuitState::Open);
                }
            }
            CircuitState::Open => {}
        }
    }

    fn transition_to(&self, to: CircuitState) {
        let from = self.state();
        if from == to {
            return;
        }
        self.state.store(to as u8, Ordering::Release);

        let event = BreakerEvent::StateTransition {
            name: self.config.name.clone(),
            from,
            to,
            timestamp: self.clock.now(),
        };
        self.listeners.emit(&event);

        #[cfg(feature = "tracing")]
        tracing::info!(
            breaker = %self.config.name,
            from = %from,
            to = %to,
            "circuit breaker transitioned"
        );

        #[cfg(feature = "metrics")]
        metrics::counter!(
            "vericache_circuit_transitions_total",
            "breaker" => self.config.name.clone(),
            "from" => from.to_string(),
            "to" => to.to_string()
        )
        .increment(1);
    }

    fn emit_rejected(&self) {
        let event = BreakerEvent::CallRejected {
            name: self.config.name.clone(),
            timestamp: self.clock.now(),
        };
        self.listeners.emit(&event);

        #[cfg(feature = "metrics")]
        metrics::counter!(
            "vericache_circuit_rejected_total",
            "breaker" => self.config.name.clone()
        )
        .increment(1);
    }

    fn unavailable(&self) -> TierUnavailable {
        TierUnavailable {
            name: self.config.name.clone(),
        }
    }
}
