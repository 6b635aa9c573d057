//! medforms-app
//!
//! Host command layer shared by the builder and filler front-ends: config,
//! logging, application state and the commands the UIs invoke.

use std::path::Path;

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod state;

pub use error::AppError;
pub use state::AppState;

/// Load (or create) the user's config, install logging and open the state
/// the commands run against.
pub fn start(role: impl Into<String>) -> eyre::Result<AppState> {
    let config = config::load_or_init()?;
    launch(&config, role)
}

/// [`start`] with an explicit config file and default data directory.
pub fn start_at(
    config_path: &Path,
    data_dir: &Path,
    role: impl Into<String>,
) -> eyre::Result<AppState> {
    let config = config::load_or_init_at(config_path, data_dir)?;
    launch(&config, role)
}

fn launch(config: &config::AppConfig, role: impl Into<String>) -> eyre::Result<AppState> {
    logging::init(config)?;
    let state = AppState::open(config, role);
    tracing::info!(data_dir = %config.data_dir.display(), role = %state.role, "medforms started");
    Ok(state)
}
