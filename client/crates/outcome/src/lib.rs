//! Two-state outcome values for operations whose failures are expected.
//!
//! [`Outcome`] replaces "throw on failure" with an explicit success/failure
//! value that callers must inspect before reading the payload.
//! [`ApiOutcome`] adds a [`ProtocolStatus`] that is kept consistent with the
//! variant: error-class codes pair only with failures, other codes only with
//! successes, and [`ProtocolStatus::UNUSED`] with either.
//!
//! Constructors come in two flavours. The infallible ones (`fail`,
//! `success`) panic when an invariant is broken, because that is a bug in the
//! caller. The `try_*` twins return [`OutcomeError`] for callers that build
//! outcomes from untrusted input.
//!
//! # Examples
//! ```
//! use outcome::{ApiOutcome, Outcome, ProtocolStatus};
//!
//! let parsed: Outcome<u32> = Outcome::success(7);
//! assert_eq!(*parsed.value(), 7);
//!
//! let missing: ApiOutcome<u32> = ApiOutcome::fail("not there", Some(ProtocolStatus::NOT_FOUND));
//! assert_eq!(missing.status(), ProtocolStatus::NOT_FOUND);
//! assert_eq!(missing.failure_message(), "not there");
//! ```

mod api;
mod error;
mod outcome;
mod status;

pub use self::api::ApiOutcome;
pub use self::error::OutcomeError;
pub use self::outcome::{FailureMessage, Outcome};
pub use self::status::ProtocolStatus;
