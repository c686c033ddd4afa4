//! # middleware
//!
//! Cross-cutting middleware for the handler chain: request logging and the
//! one-time user registration gate.

mod logging;
mod registration;

#[cfg(test)]
mod test;

pub use logging::LoggingMiddleware;
pub use registration::{RegistrationMiddleware, UserRecord};
