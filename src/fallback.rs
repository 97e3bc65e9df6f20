//! Fallible transforms with a defined fallback value.

use std::fmt::Display;

/// Result of [`attempt_or`]: the attempted value, or the fallback and the
/// error that caused it
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T, E> {
    Attempted(T),
    FellBack { value: T, error: E },
}

impl<T, E: Display> Outcome<T, E> {
    pub fn value(&self) -> &T {
        match self {
            Outcome::Attempted(value) | Outcome::FellBack { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Attempted(value) | Outcome::FellBack { value, .. } => value,
        }
    }

    /// The reason the fallback was taken, if it was
    pub fn failure(&self) -> Option<String> {
        match self {
            Outcome::Attempted(_) => None,
            Outcome::FellBack { error, .. } => Some(error.to_string()),
        }
    }
}

/// Run `attempt`; on error use `fallback` and keep the error for reporting
pub fn attempt_or<T, E, A, F>(attempt: A, fallback: F) -> Outcome<T, E>
where
    A: FnOnce() -> Result<T, E>,
    F: FnOnce() -> T,
{
    match attempt() {
        Ok(value) => Outcome::Attempted(value),
        Err(error) => Outcome::FellBack {
            value: fallback(),
            error,
        },
    }
}
