//! Logging shims.
//!
//! With the `tracing` feature enabled this module re-exports the `tracing`
//! macros. Without it, crate-root macros of the same names expand to nothing,
//! so call sites stay identical and the default build logs nothing.
//!
//! ```ignore
//! #[cfg(feature = "tracing")]
//! use crate::logging::{debug, warn};
//! #[cfg(not(feature = "tracing"))]
//! use crate::{debug, warn};
//! ```

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, trace, warn};

#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! debug_span {
    ($($arg:tt)*) => {
        $crate::logging::NoopSpan
    };
}

/// Stand-in for a `tracing` span when the feature is disabled.
#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
