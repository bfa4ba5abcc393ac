//! [`Outcome`], the success/failure envelope returned by use cases.
//!
//! Expected business conditions (a duplicate email, an unknown id) are
//! reported as [`Outcome::Failure`]. Storage errors never end up here; they
//! travel in the outer `Result` of each handler.

use serde::Serialize;

/// Why a use case declined to proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
  /// The addressed record does not exist.
  NotFound,
  /// One or more business rules were violated.
  Rule,
}

/// A failed outcome: a summary message plus every individual error in the
/// order it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
  pub kind:    FailureKind,
  pub message: String,
  pub errors:  Vec<String>,
}

impl Failure {
  pub fn not_found(message: impl Into<String>) -> Self {
    let message = message.into();
    Self {
      kind:    FailureKind::NotFound,
      errors:  vec![message.clone()],
      message,
    }
  }

  pub fn rule(message: impl Into<String>) -> Self {
    let message = message.into();
    Self {
      kind:    FailureKind::Rule,
      errors:  vec![message.clone()],
      message,
    }
  }

  /// A rule failure for several violations; the message joins them with
  /// `"; "`.
  pub fn rules(errors: Vec<String>) -> Self {
    Self {
      kind:    FailureKind::Rule,
      message: errors.join("; "),
      errors,
    }
  }

  pub fn is_not_found(&self) -> bool { self.kind == FailureKind::NotFound }
}

/// Result of a command or query handler.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
  Success(T),
  Failure(Failure),
}

impl<T> Outcome<T> {
  pub fn is_success(&self) -> bool { matches!(self, Self::Success(_)) }

  pub fn is_failure(&self) -> bool { matches!(self, Self::Failure(_)) }

  pub fn success(self) -> Option<T> {
    match self {
      Self::Success(value) => Some(value),
      Self::Failure(_) => None,
    }
  }

  pub fn failure(self) -> Option<Failure> {
    match self {
      Self::Success(_) => None,
      Self::Failure(failure) => Some(failure),
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
    match self {
      Self::Success(value) => Outcome::Success(f(value)),
      Self::Failure(failure) => Outcome::Failure(failure),
    }
  }
}
