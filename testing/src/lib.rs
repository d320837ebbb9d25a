//! # Marquee Testing
//!
//! Testing utilities for reducer-driven flows.
//!
//! This crate provides:
//! - Deterministic Environment implementations (fixed clock)
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Assertion helpers for returned effects
//! - [`resolve_effect`] for driving `Effect::Future` feedback in async tests
//!
//! ## Example
//!
//! ```ignore
//! use marquee_testing::{assertions, ReducerTest};
//!
//! ReducerTest::new(BookingReducer::new())
//!     .with_env(())
//!     .given_state(state_at_seats_step())
//!     .when_action(BookingAction::ToggleSeat { seat_id })
//!     .then_state(|state| assert_eq!(state.selected_count(), 1))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use marquee_core::{effect::Effect, environment::Clock};

mod reducer_test;

pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time.
    ///
    /// # Example
    ///
    /// ```
    /// use marquee_testing::mocks::FixedClock;
    /// use marquee_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2026-03-15 19:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_773_601_200, 0).unwrap_or_default())
    }
}

pub use mocks::{test_clock, FixedClock};

/// Run an effect to completion without a store and collect the actions it feeds back
///
/// `Delay` effects are resolved immediately (the duration is ignored), so
/// reducer tests can follow a feedback loop without waiting on real time.
/// `Parallel` children are resolved in declaration order.
pub async fn resolve_effect<A: Send + 'static>(effect: Effect<A>) -> Vec<A> {
    let mut pending = vec![effect];
    let mut actions = Vec::new();

    while let Some(effect) = pending.pop() {
        match effect {
            Effect::None => {},
            Effect::Delay { action, .. } => actions.push(*action),
            Effect::Future(fut) => {
                if let Some(action) = fut.await {
                    actions.push(action);
                }
            },
            Effect::Parallel(children) | Effect::Sequential(children) => {
                pending.extend(children.into_iter().rev());
            },
        }
    }

    actions
}
