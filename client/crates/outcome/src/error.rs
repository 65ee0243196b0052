//! Invariant violations detected by outcome constructors and accessors.

use thiserror::Error;

/// Programmer errors raised while building or reading an outcome.
///
/// These never describe a runtime failure of the operation itself; that is
/// what [`crate::Outcome::Failure`] is for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutcomeError {
    /// A constructor argument broke an outcome invariant.
    #[error("invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        /// Name of the rejected argument.
        argument: &'static str,
        /// Why the argument was rejected.
        reason: String,
    },
    /// An accessor was used on the variant that does not define it.
    #[error("invalid state: {reason}")]
    InvalidState {
        /// Which accessor was misused.
        reason: &'static str,
    },
}

impl OutcomeError {
    pub(crate) fn invalid_argument(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }

    pub(crate) const fn invalid_state(reason: &'static str) -> Self {
        Self::InvalidState { reason }
    }
}
