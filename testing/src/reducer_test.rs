//! Given-When-Then harness for reducers plus effect assertions.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use marquee_core::{effect::Effect, reducer::Reducer};
use std::fmt::Debug;

type Check<T> = Box<dyn FnOnce(&T)>;
type EffectsCheck<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent reducer test
///
/// Actions queued with `when_action` are reduced in order. Effect checks
/// registered with `then_effects` see the effects of the last action;
/// `then_effects_of` picks any earlier step by index.
///
/// ```ignore
/// ReducerTest::new(BookingReducer)
///     .with_env(())
///     .given_state(booking_at_seats(2, &[]))
///     .when_action(BookingAction::ToggleSeat { seat_id })
///     .then_state(|state| assert_eq!(state.selected_count(), 1))
///     .then_effects(assertions::assert_no_effects)
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    actions: Vec<A>,
    state_checks: Vec<Check<S>>,
    effect_checks: Vec<(Option<usize>, EffectsCheck<A>)>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Start a test for `reducer`
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            actions: Vec::new(),
            state_checks: Vec::new(),
            effect_checks: Vec::new(),
        }
    }

    /// Environment passed to every reduction
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Given: starting state
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// When: queue an action
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// When: queue several actions
    #[must_use]
    pub fn when_actions<I>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
    {
        self.actions.extend(actions);
        self
    }

    /// Then: check the final state
    #[must_use]
    pub fn then_state<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_checks.push(Box::new(check));
        self
    }

    /// Then: check the effects of the last action
    #[must_use]
    pub fn then_effects<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_checks.push((None, Box::new(check)));
        self
    }

    /// Then: check the effects of the action queued at `step` (0-based)
    #[must_use]
    pub fn then_effects_of<F>(mut self, step: usize, check: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_checks.push((Some(step), Box::new(check)));
        self
    }

    /// Reduce every queued action, then run the checks
    ///
    /// # Panics
    ///
    /// Panics when the state, environment or actions are missing, when a
    /// step index is out of range, or when a check fails.
    #[allow(clippy::panic)]
    pub fn run(self) {
        let Some(mut state) = self.initial_state else {
            panic!("Initial state must be set with given_state()");
        };
        let Some(env) = self.environment else {
            panic!("Environment must be set with with_env()");
        };
        assert!(
            !self.actions.is_empty(),
            "At least one action must be set with when_action()"
        );

        let steps: Vec<Vec<Effect<A>>> = self
            .actions
            .into_iter()
            .map(|action| self.reducer.reduce(&mut state, action, &env).into_vec())
            .collect();

        for check in self.state_checks {
            check(&state);
        }

        let last = steps.len() - 1;
        for (step, check) in self.effect_checks {
            let index = step.unwrap_or(last);
            let Some(effects) = steps.get(index) else {
                panic!("No step {index}: only {} actions were reduced", steps.len());
            };
            check(effects);
        }
    }
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
    S: PartialEq + Debug + 'static,
{
    /// Then: the final state equals `expected`
    #[must_use]
    pub fn then_state_eq(self, expected: S) -> Self {
        self.then_state(move |state| assert_eq!(*state, expected))
    }
}

/// Checks over the effects a reducer returned
pub mod assertions {
    use marquee_core::effect::Effect;
    use std::fmt::Debug;
    use std::time::Duration;

    /// Nothing but `Effect::None`
    ///
    /// # Panics
    ///
    /// Panics if any other effect is present.
    pub fn assert_no_effects<A: Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Exactly `expected` effects
    ///
    /// # Panics
    ///
    /// Panics on a different count.
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {expected} effects, but found {}",
            effects.len()
        );
    }

    /// At least one `Effect::Future`
    ///
    /// # Panics
    ///
    /// Panics if there is none.
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "Expected at least one Future effect, but none found"
        );
    }

    /// At least one `Effect::Delay`
    ///
    /// # Panics
    ///
    /// Panics if there is none.
    pub fn assert_has_delay_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Delay { .. })),
            "Expected at least one Delay effect, but none found"
        );
    }

    /// A top-level `Effect::Delay` that feeds back `action` after `duration`
    ///
    /// # Panics
    ///
    /// Panics if no delay matches both.
    #[allow(clippy::panic)]
    pub fn assert_delayed_action<A>(effects: &[Effect<A>], duration: Duration, action: &A)
    where
        A: PartialEq + Debug,
    {
        let delays: Vec<(Duration, &A)> = effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Delay { duration, action } => Some((*duration, &**action)),
                _ => None,
            })
            .collect();
        if !delays.iter().any(|(d, a)| *d == duration && *a == action) {
            panic!("Expected {action:?} after {duration:?}, but delays were {delays:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::{smallvec, SmallVec};
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        count: i32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum CounterAction {
        Increment,
        Decrement,
        IncrementLater,
    }

    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = Counter;
        type Action = CounterAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                CounterAction::Increment => {
                    state.count += 1;
                    smallvec![Effect::None]
                },
                CounterAction::Decrement => {
                    state.count -= 1;
                    SmallVec::new()
                },
                CounterAction::IncrementLater => smallvec![Effect::Delay {
                    duration: Duration::from_millis(10),
                    action: Box::new(CounterAction::Increment),
                }],
            }
        }
    }

    #[test]
    fn single_action() {
        ReducerTest::new(CounterReducer)
            .with_env(())
            .given_state(Counter { count: 0 })
            .when_action(CounterAction::Increment)
            .then_state_eq(Counter { count: 1 })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn effects_are_kept_per_step() {
        ReducerTest::new(CounterReducer)
            .with_env(())
            .given_state(Counter { count: 5 })
            .when_actions([CounterAction::IncrementLater, CounterAction::Decrement])
            .when_action(CounterAction::Decrement)
            .then_state(|state| assert_eq!(state.count, 3))
            .then_effects_of(0, |effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_delayed_action(
                    effects,
                    Duration::from_millis(10),
                    &CounterAction::Increment,
                );
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 0))
            .run();
    }

    #[test]
    #[should_panic(expected = "No step 4")]
    fn step_index_out_of_range() {
        ReducerTest::new(CounterReducer)
            .with_env(())
            .given_state(Counter { count: 0 })
            .when_action(CounterAction::Increment)
            .then_effects_of(4, assertions::assert_no_effects)
            .run();
    }

    #[test]
    #[should_panic(expected = "Expected Increment after 20ms")]
    fn delayed_action_checks_the_duration() {
        let effects: Vec<Effect<CounterAction>> = vec![Effect::Delay {
            duration: Duration::from_millis(10),
            action: Box::new(CounterAction::Increment),
        }];
        assertions::assert_delayed_action(&effects, Duration::from_millis(20), &CounterAction::Increment);
    }

    #[test]
    #[should_panic(expected = "Expected at least one Future effect")]
    fn future_assertion_fails_without_future() {
        assertions::assert_has_future_effect::<CounterAction>(&[Effect::None]);
    }
}
