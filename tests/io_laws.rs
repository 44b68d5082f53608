#![cfg(feature = "effect")]
//! Property-based tests for IO laws.
//!
//! Equality is observational: two computations are equal when running them
//! produces the same value or the same error message.
//!
//! - Left Identity: pure(a).flat_map(f) == f(a)
//! - Right Identity: m.flat_map(pure) == m
//! - Associativity: m.flat_map(f).flat_map(g) == m.flat_map(|x| f(x).flat_map(g))
//! - Functor identity and composition
//! - Error recovery: raise_error(e).handle_error_with(f) == f(e)

use lambars_io::effect::{IO, IoError, IoKind, MonadDefer};
use lambars_io::typeclass::{Applicative, Functor};
use proptest::prelude::*;

fn observe<A: Send + 'static>(io: IO<A>) -> Result<A, String> {
    io.run_unsafe().map_err(|error| error.to_string())
}

// =============================================================================
// Monad Laws
// =============================================================================

proptest! {
    /// Left Identity Law: pure(a).flat_map(f) == f(a)
    #[test]
    fn prop_io_left_identity(value: i32) {
        let function = |n: i32| IO::pure(n.wrapping_mul(2));

        let left_result = observe(IO::pure(value).flat_map(function));
        let right_result = observe(function(value));

        prop_assert_eq!(left_result, right_result);
    }

    /// Right Identity Law: m.flat_map(pure) == m
    #[test]
    fn prop_io_right_identity(value: i32) {
        let left_result = observe(IO::pure(value).flat_map(IO::pure));

        prop_assert_eq!(left_result, Ok(value));
    }

    /// Associativity Law: m.flat_map(f).flat_map(g) == m.flat_map(|x| f(x).flat_map(g))
    #[test]
    fn prop_io_associativity(value: i32) {
        let function1 = |n: i32| IO::pure(n.wrapping_add(1));
        let function2 = |n: i32| IO::pure(n.wrapping_mul(2));

        let left_result = observe(IO::pure(value).flat_map(function1).flat_map(function2));
        let right_result =
            observe(IO::pure(value).flat_map(move |x| function1(x).flat_map(function2)));

        prop_assert_eq!(left_result, right_result);
    }

    /// Associativity holds across an asynchronous boundary.
    #[test]
    fn prop_io_associativity_across_async(value: i32) {
        let function1 = |n: i32| IO::async_io(move |callback| callback.succeed(n.wrapping_add(1)));
        let function2 = |n: i32| IO::delay(move || n.wrapping_mul(3));

        let left_result = observe(IO::pure(value).flat_map(function1).flat_map(function2));
        let right_result =
            observe(IO::pure(value).flat_map(move |x| function1(x).flat_map(function2)));

        prop_assert_eq!(left_result, right_result);
    }
}

// =============================================================================
// Functor Laws
// =============================================================================

proptest! {
    /// Identity Law: fa.map(|x| x) == fa
    #[test]
    fn prop_io_functor_identity(value: i32) {
        prop_assert_eq!(observe(IoKind::map(IO::pure(value), |x| x)), Ok(value));
    }

    /// Composition Law: fa.map(f).map(g) == fa.map(|x| g(f(x)))
    #[test]
    fn prop_io_functor_composition(value: i32) {
        let function1 = |n: i32| n.wrapping_add(7);
        let function2 = |n: i32| n.wrapping_mul(3);

        let left_result = observe(IO::pure(value).map(function1).map(function2));
        let right_result = observe(IO::pure(value).map(move |x| function2(function1(x))));

        prop_assert_eq!(left_result, right_result);
    }

    /// map2 agrees with flat_map
    #[test]
    fn prop_io_map2_consistent_with_flat_map(first: i32, second: i32) {
        let left_result = observe(IoKind::map2(IO::pure(first), IO::pure(second), i32::wrapping_add));
        let right_result = observe(
            IO::pure(first).flat_map(move |a| IO::pure(second).map(move |b| a.wrapping_add(b))),
        );

        prop_assert_eq!(left_result, right_result);
    }
}

// =============================================================================
// Error and Deferral Laws
// =============================================================================

proptest! {
    /// Recovery Law: raise_error(e).handle_error_with(f) == f(e)
    #[test]
    fn prop_io_handle_error_with_applies_handler(message in "[a-z]{1,16}") {
        let handler = |error: IoError| IO::pure(error.to_string().len());

        let left_result = observe(
            IO::<usize>::raise_error(IoError::msg(message.clone())).handle_error_with(handler),
        );
        let right_result = observe(handler(IoError::msg(message)));

        prop_assert_eq!(left_result, right_result);
    }

    /// Pure Law: pure(a).handle_error_with(f) == pure(a)
    #[test]
    fn prop_io_handle_error_with_ignores_success(value: i32) {
        let result = observe(IO::pure(value).handle_error_with(|_| IO::pure(0)));

        prop_assert_eq!(result, Ok(value));
    }

    /// Errors short-circuit: raise_error(e).flat_map(f) == raise_error(e)
    #[test]
    fn prop_io_raise_error_short_circuits(message in "[a-z]{1,16}") {
        let result = observe(
            IO::<i32>::raise_error(IoError::msg(message.clone())).flat_map(|x| IO::pure(x + 1)),
        );

        prop_assert_eq!(result, Err(message));
    }

    /// Delay Law: delay(|| a) == pure(a)
    #[test]
    fn prop_io_delay_is_pure(value: i32) {
        prop_assert_eq!(observe(IoKind::delay(move || value)), observe(IO::pure(value)));
    }

    /// Suspend Law: suspend(|| fa) == fa
    #[test]
    fn prop_io_suspend_is_identity(value: i32) {
        let result = observe(IoKind::suspend(move || IoKind::pure(value)));

        prop_assert_eq!(result, Ok(value));
    }

    /// Attempt Law: attempt(fa).map(Result::ok) is Some exactly when fa succeeds
    #[test]
    fn prop_io_attempt_materializes(value: i32, fail: bool) {
        let io = if fail {
            IO::raise_error(IoError::msg("failed"))
        } else {
            IO::pure(value)
        };
        let attempted = io.attempt().run_unsafe().unwrap();

        prop_assert_eq!(attempted.is_err(), fail);
    }
}
