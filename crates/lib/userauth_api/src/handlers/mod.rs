//! Request handlers.

pub mod user;
