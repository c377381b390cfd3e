//! # userauth_core
//!
//! Core authentication domain logic for userauth: password hashing, dual-class
//! JWT issuance, the user directory, and the auth service tying them together.

pub mod auth;
pub mod config;
pub mod directory;
pub mod models;

