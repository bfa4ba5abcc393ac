//! Core types and trait definitions for the people service.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the [`Person`](person::Person) entity, the [`Outcome`](outcome::Outcome)
//! envelope returned by use cases, the storage traits, and the use-case
//! handlers themselves.

pub mod error;
pub mod handlers;
pub mod outcome;
pub mod person;
pub mod store;
pub mod view;

pub use error::{Error, Result};
pub use outcome::{Failure, FailureKind, Outcome};
pub use person::Person;
pub use view::PersonView;

#[cfg(test)]
mod memory;
