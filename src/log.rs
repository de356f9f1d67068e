//  LOG.rs
//    by Lut99
//
//  Created:
//    03 Mar 2025, 10:20:31
//  Last edited:
//    10 Mar 2025, 09:41:12
//  Auto updated?
//    Yes
//
//  Description:
//!   Provides [`log`]-macro counterparts that only log if the `log`-feature
//!   is enabled.
//!
//!   The engine sits in the inner loop of a planner, so without the feature, every logging
//!   statement vanishes entirely (including the formatting of its arguments).
//


/***** LIBRARY *****/
/// Forwards to the `debug!()`-macro of the [`log`](https://github.com/rust-lang/log)-crate if the
/// `log`-feature is enabled.
#[cfg(feature = "log")]
#[allow(unused)]
macro_rules! debug {
    ($($t:tt)*) => {
        ::log::debug!($($t)*)
    };
}
/// Swallows its arguments because the `log`-feature is disabled.
#[cfg(not(feature = "log"))]
#[allow(unused)]
macro_rules! debug {
    ($($t:tt)*) => {};
}
#[allow(unused)]
pub(crate) use debug;

/// Forwards to the `trace!()`-macro of the [`log`](https://github.com/rust-lang/log)-crate if the
/// `log`-feature is enabled.
#[cfg(feature = "log")]
#[allow(unused)]
macro_rules! trace {
    ($($t:tt)*) => {
        ::log::trace!($($t)*)
    };
}
/// Swallows its arguments because the `log`-feature is disabled.
#[cfg(not(feature = "log"))]
#[allow(unused)]
macro_rules! trace {
    ($($t:tt)*) => {};
}
#[allow(unused)]
pub(crate) use trace;
