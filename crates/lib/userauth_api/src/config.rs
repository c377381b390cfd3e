//! API server configuration.

use userauth_core::config::AuthConfig;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3000").
    pub bind_addr: String,
    /// Token secrets, lifetimes and hashing cost.
    pub auth: AuthConfig,
}
