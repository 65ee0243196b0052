//! Outcomes of protocol exchanges, tagged with the status that produced them.

use crate::{Outcome, OutcomeError, ProtocolStatus};

/// [`Outcome`] of a request/response exchange plus its [`ProtocolStatus`].
///
/// ## Invariants
/// - a failure carries an error-class status or [`ProtocolStatus::UNUSED`];
/// - a success carries a non-error status or [`ProtocolStatus::UNUSED`];
/// - the status is always readable, whichever variant holds.
///
/// # Examples
/// ```
/// use outcome::{ApiOutcome, ProtocolStatus};
///
/// let created = ApiOutcome::success("item-1", ProtocolStatus::CREATED);
/// assert_eq!(*created.value(), "item-1");
///
/// let offline: ApiOutcome<&str> = ApiOutcome::fail("connection refused", None);
/// assert_eq!(offline.status(), ProtocolStatus::UNUSED);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ApiOutcome<T = ()> {
    outcome: Outcome<T>,
    status: ProtocolStatus,
}

impl<T> ApiOutcome<T> {
    /// Build a failure.
    ///
    /// A missing `status` is recorded as [`ProtocolStatus::UNUSED`].
    ///
    /// # Panics
    ///
    /// Panics when `message` is blank or `status` is a non-error code.
    pub fn fail(message: impl Into<String>, status: Option<ProtocolStatus>) -> Self {
        match Self::try_fail(message, status) {
            Ok(outcome) => outcome,
            Err(err) => panic!("api outcome invariant violated: {err}"),
        }
    }

    /// Fallible form of [`ApiOutcome::fail`].
    ///
    /// # Errors
    ///
    /// Returns [`OutcomeError::InvalidArgument`] when `message` is blank or
    /// `status` is a concrete code below `400`.
    pub fn try_fail(
        message: impl Into<String>,
        status: Option<ProtocolStatus>,
    ) -> Result<Self, OutcomeError> {
        let outcome = Outcome::try_fail(message)?;
        let status = status.unwrap_or(ProtocolStatus::UNUSED);
        if status.is_non_error() {
            return Err(OutcomeError::invalid_argument(
                "status",
                format!("cannot construct a failure with non-error status {status}"),
            ));
        }
        Ok(Self { outcome, status })
    }

    /// Build a success.
    ///
    /// # Panics
    ///
    /// Panics when `status` is an error-class code.
    pub fn success(value: T, status: ProtocolStatus) -> Self {
        match Self::try_success(value, status) {
            Ok(outcome) => outcome,
            Err(err) => panic!("api outcome invariant violated: {err}"),
        }
    }

    /// Fallible form of [`ApiOutcome::success`].
    ///
    /// # Errors
    ///
    /// Returns [`OutcomeError::InvalidArgument`] when `status` is `>= 400`.
    pub fn try_success(value: T, status: ProtocolStatus) -> Result<Self, OutcomeError> {
        if status.is_error() {
            return Err(OutcomeError::invalid_argument(
                "status",
                format!("cannot construct a success with error status {status}"),
            ));
        }
        Ok(Self {
            outcome: Outcome::success(value),
            status,
        })
    }

    /// Status of the exchange; defined for both variants.
    #[must_use]
    pub const fn status(&self) -> ProtocolStatus {
        self.status
    }

    /// Borrow the underlying outcome.
    pub const fn outcome(&self) -> &Outcome<T> {
        &self.outcome
    }

    /// Drop the status and keep the outcome.
    pub fn into_outcome(self) -> Outcome<T> {
        self.outcome
    }

    /// Split into outcome and status.
    #[must_use]
    pub fn into_parts(self) -> (Outcome<T>, ProtocolStatus) {
        (self.outcome, self.status)
    }

    /// Whether this is a success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Whether this is a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.outcome.is_failure()
    }

    /// Reason for the failure.
    ///
    /// # Panics
    ///
    /// Panics when called on a success.
    #[must_use]
    pub fn failure_message(&self) -> &str {
        self.outcome.failure_message()
    }

    /// Fallible form of [`ApiOutcome::failure_message`].
    ///
    /// # Errors
    ///
    /// Returns [`OutcomeError::InvalidState`] on a success.
    pub fn try_failure_message(&self) -> Result<&str, OutcomeError> {
        self.outcome.try_failure_message()
    }

    /// Borrow the success value.
    ///
    /// # Panics
    ///
    /// Panics when called on a failure.
    #[must_use]
    pub fn value(&self) -> &T {
        self.outcome.value()
    }

    /// Fallible form of [`ApiOutcome::value`].
    ///
    /// # Errors
    ///
    /// Returns [`OutcomeError::InvalidState`] on a failure.
    pub fn try_value(&self) -> Result<&T, OutcomeError> {
        self.outcome.try_value()
    }

    /// Take the success value.
    ///
    /// # Panics
    ///
    /// Panics when called on a failure.
    pub fn into_value(self) -> T {
        self.outcome.into_value()
    }

    /// Transform the success value; the status is carried over unchanged.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiOutcome<U> {
        ApiOutcome {
            outcome: self.outcome.map(f),
            status: self.status,
        }
    }
}
