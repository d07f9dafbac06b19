//! Runtime configuration of the HTTP application.

use std::time::Duration;

/// Startup parameters, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// How long a graceful shutdown may take before the process aborts.
    pub shutdown_grace: Duration,
}

impl Config {
    /// Builds the configuration from environment variables.
    ///
    /// `HTTP_LISTEN_ADDR` takes precedence; `PORT` alone yields
    /// `0.0.0.0:<port>`; the default is `0.0.0.0:8080`.
    /// `SHUTDOWN_GRACE_SECS` defaults to 10 seconds.
    pub fn from_env() -> Self {
        let listen_addr = std::env::var("HTTP_LISTEN_ADDR").unwrap_or_else(|_| {
            let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
            format!("0.0.0.0:{port}")
        });

        let grace_secs = std::env::var("SHUTDOWN_GRACE_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Self {
            listen_addr,
            shutdown_grace: Duration::from_secs(grace_secs),
        }
    }
}
