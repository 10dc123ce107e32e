//! Fitch, a small platformer

use std::process::ExitCode;

use fitch::prelude::*;
use fitch::{cli::Args, logging};

fn main() -> ExitCode {
    let args = Args::from_env();

    let mut log_guard = logging::init(args.write_log, logging::DEFAULT_LOG_PATH);
    logging::log_system_info();

    let config = GameConfig::load_or_default(&args.config_path);
    log_guard.set_path(&config.log_path);

    let game = FitchGame::new(config);
    let engine = Engine::new(game.engine_config(), game);
    let result = engine.run();

    if let Err(e) = &result {
        log::error!("Engine error: {}", e);
    }

    // The log is written before the exit status is returned.
    drop(log_guard);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
