//! Declarative macros for ergonomic effect construction
//!
//! These macros cut the boilerplate of boxing actions and pinning futures when
//! a reducer returns effects.

/// Create an `Effect::Future` from an async block
///
/// The block must evaluate to `Option<Action>`.
///
/// # Example
///
/// ```
/// use marquee_core::{async_effect, effect::Effect};
///
/// #[derive(Debug)]
/// enum Action { Loaded(u32) }
///
/// let effect: Effect<Action> = async_effect! {
///     Some(Action::Loaded(7))
/// };
/// assert!(matches!(effect, Effect::Future(_)));
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```
/// use marquee_core::{delay, effect::Effect};
/// use std::time::Duration;
///
/// #[derive(Debug)]
/// enum Action { TimedOut }
///
/// let effect = delay! {
///     duration: Duration::from_secs(30),
///     action: Action::TimedOut
/// };
/// assert!(matches!(effect, Effect::Delay { .. }));
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}
