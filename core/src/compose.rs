//! Right-to-left function composition
//!
//! `compose(f, g, h)` behaves like `|x| f(g(h(x)))`: the rightmost function
//! runs first and receives the original argument, every function to its left
//! receives the single value returned by its right neighbour.
//!
//! Two shapes are provided:
//!
//! - **[`compose`]**: a homogeneous, runtime-sized list of [`Unary`] functions.
//!   This is what the chain builder uses to stack interceptors.
//! - **[`compose2`]** / [`compose!`](crate::compose!): heterogeneous, statically
//!   known composition. The rightmost function may take a tuple, which is how a
//!   multi-argument entry point is expressed.
//!
//! # Examples
//!
//! ```
//! use composable_middleware_core::compose::{compose, Unary};
//!
//! let funcs: Vec<Unary<String>> = vec![
//!     Box::new(|s| format!("{s}f")),
//!     Box::new(|s| format!("{s}g")),
//!     Box::new(|s| format!("{s}h")),
//! ];
//!
//! let composed = compose(funcs);
//! assert_eq!(composed(String::new()), "hgf");
//! ```

/// A boxed single-argument function whose input and output types match.
pub type Unary<T> = Box<dyn Fn(T) -> T + Send + Sync>;

/// Returns its argument unchanged.
///
/// This is what composing zero functions yields.
#[inline]
pub const fn identity<T>(value: T) -> T {
    value
}

/// Combines two functions so that `inner` runs first and `outer` receives its
/// result.
///
/// # Examples
///
/// ```
/// use composable_middleware_core::compose::compose2;
///
/// // The inner function may take a tuple for multi-argument calls.
/// let joined_len = compose2(|s: String| s.len(), |(a, b): (&str, &str)| format!("{a}{b}"));
/// assert_eq!(joined_len(("ab", "cde")), 5);
/// ```
pub fn compose2<A, B, C, F, G>(outer: F, inner: G) -> impl Fn(A) -> C
where
    F: Fn(B) -> C,
    G: Fn(A) -> B,
{
    move |args| outer(inner(args))
}

/// Composes single-argument functions from right to left.
///
/// - No functions: returns [`identity`].
/// - One function: returns that exact function, not a wrapper around it.
/// - Two or more: folds pairwise with `(a, b) -> |x| a(b(x))`.
///
/// # Examples
///
/// ```
/// use composable_middleware_core::compose::{compose, Unary};
///
/// let double: Unary<i32> = Box::new(|x| x * 2);
/// let add_ten: Unary<i32> = Box::new(|x| x + 10);
///
/// // add_ten runs first, then double
/// let composed = compose(vec![double, add_ten]);
/// assert_eq!(composed(5), 30);
///
/// let empty = compose(Vec::<Unary<i32>>::new());
/// assert_eq!(empty(7), 7);
/// ```
#[must_use]
pub fn compose<T, I>(funcs: I) -> Unary<T>
where
    T: 'static,
    I: IntoIterator<Item = Unary<T>>,
{
    let mut funcs = funcs.into_iter();

    let Some(first) = funcs.next() else {
        return Box::new(identity::<T>);
    };

    let Some(second) = funcs.next() else {
        return first;
    };

    funcs.fold(Box::new(compose2(first, second)) as Unary<T>, |outer, inner| {
        Box::new(compose2(outer, inner)) as Unary<T>
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn data_ptr<T>(f: &Unary<T>) -> *const () {
        std::ptr::from_ref(&**f).cast::<()>()
    }

    fn marker(tag: &'static str) -> Unary<String> {
        Box::new(move |s| format!("{s}{tag}"))
    }

    #[test]
    fn test_empty_compose_is_identity() {
        let composed = compose(Vec::<Unary<&str>>::new());
        assert_eq!(composed("unchanged"), "unchanged");
    }

    #[test]
    fn test_single_function_is_returned_unwrapped() {
        let offset = 41_i64;
        let f: Unary<i64> = Box::new(move |x| x + offset);
        let before = data_ptr(&f);

        let composed = compose(vec![f]);

        assert_eq!(data_ptr(&composed), before);
        assert_eq!(composed(1), 42);
    }

    #[test]
    fn test_execution_order_is_right_to_left() {
        let composed = compose(vec![marker("f"), marker("g"), marker("h")]);
        assert_eq!(composed(String::from(">")), ">hgf");
    }

    #[test]
    fn test_each_function_receives_neighbour_result() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));

        let record = |label: &'static str| -> Unary<i32> {
            let seen = std::sync::Arc::clone(&seen);
            Box::new(move |x| {
                seen.lock().unwrap().push((label, x));
                x * 10
            })
        };

        let composed = compose(vec![record("outer"), record("middle"), record("inner")]);
        assert_eq!(composed(1), 1000);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("inner", 1), ("middle", 10), ("outer", 100)]
        );
    }

    #[test]
    fn test_compose2_with_tuple_arguments() {
        let sum_then_negate = compose2(|x: i32| -x, |(a, b, c): (i32, i32, i32)| a + b + c);
        assert_eq!(sum_then_negate((1, 2, 3)), -6);
    }

    #[test]
    fn test_compose_macro_shapes() {
        assert_eq!(crate::compose!()(9), 9);

        let single = crate::compose!(|x: i32| x - 1);
        assert_eq!(single(1), 0);

        let chained = crate::compose!(|s: String| s.len(), |x: u8| "ab".repeat(x.into()));
        assert_eq!(chained(3), 6);

        let three = crate::compose!(|x: i32| x * 2, |x: i32| x + 1, |(a, b): (i32, i32)| a * b);
        assert_eq!(three((3, 4)), 26);
    }

    proptest! {
        #[test]
        fn prop_identity_law(x in any::<i64>()) {
            let composed = compose(Vec::<Unary<i64>>::new());
            prop_assert_eq!(composed(x), x);
        }

        #[test]
        fn prop_single_function_law(x in -1_000_000_i64..1_000_000, k in -1000_i64..1000) {
            let composed = compose(vec![Box::new(move |v: i64| v * k) as Unary<i64>]);
            prop_assert_eq!(composed(x), x * k);
        }

        #[test]
        fn prop_matches_nested_application(tags in proptest::collection::vec("[a-z]{1,3}", 0..8)) {
            let funcs: Vec<Unary<String>> = tags
                .iter()
                .cloned()
                .map(|tag| Box::new(move |s: String| format!("{s}{tag}")) as Unary<String>)
                .collect();

            let expected: String = tags.iter().rev().map(String::as_str).collect();
            prop_assert_eq!(compose(funcs)(String::new()), expected);
        }
    }
}
