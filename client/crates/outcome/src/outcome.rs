//! The two-variant outcome type and its validated failure message.

use std::fmt;

use crate::OutcomeError;

const MESSAGE_UNDEFINED_ON_SUCCESS: &str =
    "failure message is not defined when the outcome is a success";
const VALUE_UNDEFINED_ON_FAILURE: &str = "value is not defined when the outcome is a failure";

/// Reason an operation failed.
///
/// ## Invariants
/// - the message is non-empty once trimmed of whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FailureMessage(String);

impl FailureMessage {
    /// Validate and wrap a failure message.
    ///
    /// # Errors
    ///
    /// Returns [`OutcomeError::InvalidArgument`] when the message is empty or
    /// whitespace only.
    ///
    /// # Examples
    /// ```
    /// use outcome::FailureMessage;
    ///
    /// assert!(FailureMessage::new("disk full").is_ok());
    /// assert!(FailureMessage::new(" \t").is_err());
    /// ```
    pub fn new(message: impl Into<String>) -> Result<Self, OutcomeError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(OutcomeError::invalid_argument(
                "message",
                "cannot be empty or whitespace only",
            ));
        }
        Ok(Self(message))
    }

    /// Borrow the message text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FailureMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for FailureMessage {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<FailureMessage> for String {
    fn from(value: FailureMessage) -> Self {
        value.0
    }
}

impl std::error::Error for FailureMessage {}

/// Success or failure of one operation.
///
/// `Outcome` without a type parameter is the payload-free form used for
/// operations that only report whether they worked.
///
/// # Examples
/// ```
/// use outcome::Outcome;
///
/// let outcome: Outcome<&str> = Outcome::fail("upstream unavailable");
/// assert!(outcome.is_failure());
/// assert_eq!(outcome.failure_message(), "upstream unavailable");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[must_use]
pub enum Outcome<T = ()> {
    /// The operation succeeded and produced a value.
    Success(T),
    /// The operation failed for the given reason.
    Failure(FailureMessage),
}

impl<T> Outcome<T> {
    /// Build a success carrying `value`.
    pub const fn success(value: T) -> Self {
        Self::Success(value)
    }

    /// Build a failure with the given reason.
    ///
    /// # Panics
    ///
    /// Panics when `message` is empty or whitespace only.
    pub fn fail(message: impl Into<String>) -> Self {
        match Self::try_fail(message) {
            Ok(outcome) => outcome,
            Err(err) => panic!("outcome invariant violated: {err}"),
        }
    }

    /// Fallible form of [`Outcome::fail`].
    ///
    /// # Errors
    ///
    /// Returns [`OutcomeError::InvalidArgument`] when `message` is blank.
    pub fn try_fail(message: impl Into<String>) -> Result<Self, OutcomeError> {
        FailureMessage::new(message).map(Self::Failure)
    }

    /// Whether this is a success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Whether this is a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Reason for the failure.
    ///
    /// # Panics
    ///
    /// Panics when called on a success.
    #[must_use]
    pub fn failure_message(&self) -> &str {
        match self.try_failure_message() {
            Ok(message) => message,
            Err(err) => panic!("outcome misuse: {err}"),
        }
    }

    /// Fallible form of [`Outcome::failure_message`].
    ///
    /// # Errors
    ///
    /// Returns [`OutcomeError::InvalidState`] on a success.
    pub fn try_failure_message(&self) -> Result<&str, OutcomeError> {
        match self {
            Self::Failure(message) => Ok(message.as_str()),
            Self::Success(_) => Err(OutcomeError::invalid_state(MESSAGE_UNDEFINED_ON_SUCCESS)),
        }
    }

    /// Borrow the success value.
    ///
    /// # Panics
    ///
    /// Panics when called on a failure.
    #[must_use]
    pub fn value(&self) -> &T {
        match self.try_value() {
            Ok(value) => value,
            Err(err) => panic!("outcome misuse: {err}"),
        }
    }

    /// Fallible form of [`Outcome::value`].
    ///
    /// # Errors
    ///
    /// Returns [`OutcomeError::InvalidState`] on a failure.
    pub fn try_value(&self) -> Result<&T, OutcomeError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(_) => Err(OutcomeError::invalid_state(VALUE_UNDEFINED_ON_FAILURE)),
        }
    }

    /// Take the success value.
    ///
    /// # Panics
    ///
    /// Panics when called on a failure.
    pub fn into_value(self) -> T {
        match self {
            Self::Success(value) => value,
            Self::Failure(_) => panic!(
                "outcome misuse: {}",
                OutcomeError::invalid_state(VALUE_UNDEFINED_ON_FAILURE)
            ),
        }
    }

    /// Convert into a standard library `Result`.
    ///
    /// # Errors
    ///
    /// Returns the failure message when this is a failure.
    pub fn into_result(self) -> Result<T, FailureMessage> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(message) => Err(message),
        }
    }

    /// Transform the success value, keeping failures untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure(message) => Outcome::Failure(message),
        }
    }

    /// Chain another fallible step onto a success.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Self::Success(value) => f(value),
            Self::Failure(message) => Outcome::Failure(message),
        }
    }
}

impl Outcome {
    /// Payload-free success.
    pub const fn ok() -> Self {
        Self::Success(())
    }

    /// Logical AND over several outcomes.
    ///
    /// Scans left to right and returns the first failure found, or a fresh
    /// success when every input succeeded (including when there are none).
    ///
    /// # Examples
    /// ```
    /// use outcome::Outcome;
    ///
    /// let checks = [Outcome::ok(), Outcome::fail("name missing"), Outcome::fail("price negative")];
    /// assert_eq!(Outcome::combine(&checks), Outcome::fail("name missing"));
    /// assert_eq!(Outcome::combine(&[] as &[Outcome]), Outcome::ok());
    /// ```
    pub fn combine<'a, T, I>(results: I) -> Self
    where
        T: 'a,
        I: IntoIterator<Item = &'a Outcome<T>>,
    {
        results
            .into_iter()
            .find_map(|result| match result {
                Outcome::Failure(message) => Some(message.clone()),
                Outcome::Success(_) => None,
            })
            .map_or_else(Self::ok, Self::Failure)
    }
}

impl<T> From<Outcome<T>> for Result<T, FailureMessage> {
    fn from(value: Outcome<T>) -> Self {
        value.into_result()
    }
}
