//! Protocol status codes attached to API outcomes.

use std::fmt;

use crate::OutcomeError;

const MIN_CODE: u16 = 100;
const MAX_CODE: u16 = 599;
const FIRST_ERROR_CODE: u16 = 400;

/// Status reported by the protocol exchange behind an outcome.
///
/// Codes live in the HTTP status space (`100..=599`). Codes of `400` and
/// above are error-class. [`ProtocolStatus::UNUSED`] is the sentinel for
/// "no protocol exchange took place" and is neither error nor non-error.
///
/// # Examples
/// ```
/// use outcome::ProtocolStatus;
///
/// let status = ProtocolStatus::from_u16(503).expect("valid code");
/// assert!(status.is_error());
/// assert!(!ProtocolStatus::UNUSED.is_error());
/// assert_eq!(ProtocolStatus::UNUSED.code(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolStatus(Option<u16>);

impl ProtocolStatus {
    /// No protocol exchange took place.
    pub const UNUSED: Self = Self(None);
    /// `200 OK`.
    pub const OK: Self = Self(Some(200));
    /// `201 Created`.
    pub const CREATED: Self = Self(Some(201));
    /// `204 No Content`.
    pub const NO_CONTENT: Self = Self(Some(204));
    /// `400 Bad Request`.
    pub const BAD_REQUEST: Self = Self(Some(400));
    /// `404 Not Found`.
    pub const NOT_FOUND: Self = Self(Some(404));
    /// `500 Internal Server Error`.
    pub const INTERNAL_SERVER_ERROR: Self = Self(Some(500));
    /// `503 Service Unavailable`.
    pub const SERVICE_UNAVAILABLE: Self = Self(Some(503));

    /// Validate a numeric status code.
    ///
    /// # Errors
    ///
    /// Returns [`OutcomeError::InvalidArgument`] for codes outside
    /// `100..=599`.
    pub fn from_u16(code: u16) -> Result<Self, OutcomeError> {
        if (MIN_CODE..=MAX_CODE).contains(&code) {
            Ok(Self(Some(code)))
        } else {
            Err(OutcomeError::invalid_argument(
                "status",
                format!("{code} is outside the status code range {MIN_CODE}..={MAX_CODE}"),
            ))
        }
    }

    /// Numeric code, or `None` for the sentinel.
    #[must_use]
    pub const fn code(self) -> Option<u16> {
        self.0
    }

    /// Whether this is the [`ProtocolStatus::UNUSED`] sentinel.
    #[must_use]
    pub const fn is_unused(self) -> bool {
        self.0.is_none()
    }

    /// Whether the code denotes a client or server error (`>= 400`).
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self.0, Some(code) if code >= FIRST_ERROR_CODE)
    }

    /// Whether the code is concrete and below the error range.
    #[must_use]
    pub const fn is_non_error(self) -> bool {
        matches!(self.0, Some(code) if code < FIRST_ERROR_CODE)
    }
}

impl TryFrom<u16> for ProtocolStatus {
    type Error = OutcomeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::from_u16(value)
    }
}

impl fmt::Display for ProtocolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, "{code}"),
            None => f.write_str("unused"),
        }
    }
}
