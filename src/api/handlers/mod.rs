//! HTTP handlers. `/api/users*` responses share the [`ResponseEnvelope`] body.

pub mod envelope;
pub mod health;
pub mod root;
pub mod users;

pub use self::envelope::{ApiError, ResponseEnvelope};

#[cfg(test)]
mod tests;
