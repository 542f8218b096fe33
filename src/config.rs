//! Application-level constants and environment-driven configuration.

/// Application-level constants
pub const APP_NAME: &str = "SmartClinic";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend mount point used when `SMARTCLINIC_API_URL` is not set.
/// The clinic service exposes every resource under `/api`.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Per-request timeout for gateway calls, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Resolve the backend base URL, preferring the environment override.
pub fn default_api_base_url() -> String {
    std::env::var("SMARTCLINIC_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
}

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}
