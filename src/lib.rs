//! SmartClinic core — the stateful heart of the clinic-operations client.
//!
//! Presentation renders this crate's state (`view`, `draft`, `transcript`,
//! `loading`, `pending`) and feeds intents back into the controllers;
//! everything remote goes through the gateway seams.

pub mod chat; // assistant conversation: transcript, pending guard, session identifier
pub mod collection; // per-collection sync: items, filtered view, loading
pub mod config;
pub mod editing; // creating-vs-editing form sessions
pub mod error;
pub mod gateway; // HTTP clients + local emulation behind the transport traits
pub mod models;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for a host binary. Respects `RUST_LOG`, falling back
/// to the crate default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} core v{} ready", config::APP_NAME, config::APP_VERSION);
}
