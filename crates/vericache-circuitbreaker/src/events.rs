//! Events emitted by [`crate::Circuit`] on state transitions and outcomes.

use std::time::Instant;

use vericache_core::CacheEvent;

use crate::state::CircuitState;

/// An event emitted by a [`crate::Circuit`].
#[derive(Debug, Clone)]
pub enum BreakerEvent {
    /// The breaker moved from one state to another.
    StateTransition {
        /// Breaker name.
        name: String,
        /// State before the transition.
        from: CircuitState,
        /// State after the transition.
        to: CircuitState,
        /// When the transition happened.
        timestamp: Instant,
    },
    /// A call was rejected because the breaker was `OPEN`.
    CallRejected {
        /// Breaker name.
        name: String,
        /// When the rejection happened.
        timestamp: Instant,
    },
}

impl CacheEvent for BreakerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BreakerEvent::StateTransition { .. } => "breaker_state_transition",
            BreakerEvent::CallRejected { .. } => "breaker_call_rejected",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            BreakerEvent::StateTransition { timestamp, .. } => *timestamp,
            BreakerEvent::CallRejected { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            BreakerEvent::StateTransition { name, .. } => name,
            BreakerEvent::CallRejected { name, .. } => name,
        }
    }
}
