//! Declarative macro for statically known composition
//!
//! [`compose!`](crate::compose!) mirrors [`compose`](crate::compose::compose)
//! for a fixed list of functions whose types may differ from step to step.

/// Compose functions from right to left
///
/// - `compose!()` is [`identity`](crate::compose::identity)
/// - `compose!(f)` is `f` itself, untouched
/// - `compose!(f, g, h)` is `|x| f(g(h(x)))`
///
/// # Example
///
/// ```rust
/// use composable_middleware_core::compose;
///
/// let describe = compose!(
///     |n: usize| format!("{n} chars"),
///     |s: &str| s.trim().len(),
/// );
///
/// assert_eq!(describe("  hello "), "5 chars");
/// ```
#[macro_export]
macro_rules! compose {
    () => {
        $crate::compose::identity
    };
    ($f:expr $(,)?) => {
        $f
    };
    ($f:expr, $($rest:expr),+ $(,)?) => {
        $crate::compose::compose2($f, $crate::compose!($($rest),+))
    };
}
