//! Degradable results
//!
//! Dependency failures in the search pipeline never reach the caller. Instead
//! every fallible stage returns an [`Outcome`]: either the complete value, or a
//! substitute value together with the classified reason it was substituted.

/// Result of a stage that degrades instead of failing
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T, F> {
    /// The stage produced its real value
    Complete(T),
    /// The stage failed and `value` is the fallback
    Degraded { value: T, reason: F },
}

impl<T, F> Outcome<T, F> {
    pub fn degraded(value: T, reason: F) -> Self {
        Self::Degraded { value, reason }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Complete(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Complete(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn reason(&self) -> Option<&F> {
        match self {
            Self::Complete(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Splits into the value and the optional failure reason
    pub fn into_parts(self) -> (T, Option<F>) {
        match self {
            Self::Complete(value) => (value, None),
            Self::Degraded { value, reason } => (value, Some(reason)),
        }
    }
}
