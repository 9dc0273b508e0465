// CLI module
// Service configuration from flags and environment variables

mod args;

pub use args::{RegistryMode, ServiceConfig};

use clap::Parser;

/// Load service configuration
///
/// Reads `.env` from the working directory first (a missing file is ignored),
/// then parses flags, falling back to environment variables and defaults.
/// Invalid flags make clap print usage and exit.
pub fn load_config() -> ServiceConfig {
    let _ = dotenvy::dotenv();
    ServiceConfig::parse()
}
