pub mod api;
pub mod config;
pub mod feedback_store;
pub mod models;
pub mod procedure_generator;
pub mod retrosynthesis;
pub mod risk_annotator;
pub mod text;

use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// Install the global subscriber. `RUST_LOG` wins over settings.
pub fn init_tracing(settings: &Settings) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_filter())),
        )
        .init();
}
