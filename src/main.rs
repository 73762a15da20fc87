#![forbid(unsafe_code)]

//! qso-glance: show one contest-log chart in the terminal until `q`.

use qso_glance::app::{self, ACTIVE_VISUALIZATION, RunOptions};
use qso_glance::core::config::Config;
use qso_glance::data::store::SqliteStore;
use qso_glance::display::terminal::TerminalBackend;
use qso_glance::logger;
use tracing::info;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let config = match Config::load_from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("qso-glance: {e}");
            return 1;
        }
    };
    if let Err(e) = config.log_level().and_then(|level| logger::init(&config.logging, level)) {
        eprintln!("qso-glance: {e}");
        return 1;
    }

    let config_hash = config.stable_hash().unwrap_or_else(|_| "unavailable".to_string());
    info!(
        config = %config.config_file.display(),
        config_hash = %config_hash,
        "qso-glance startup"
    );

    let store = SqliteStore::new(&config.database.path);
    let options = RunOptions::from_config(&config, ACTIVE_VISUALIZATION);
    let outcome = app::run(&TerminalBackend, &store, &options);

    let code = outcome.exit_code();
    info!(?outcome, code, "qso-glance exit");
    code
}
