//! Scenario replay entry point (native).

use std::process::ExitCode;

#[cfg(feature = "native")]
fn main() -> ExitCode {
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage: dropgrid-replay <scenario.json>");
        return ExitCode::FAILURE;
    };
    log::info!("Replaying {}", path);

    let report = match dropgrid_app::load_scenario(&path).and_then(|s| dropgrid_app::replay(&s)) {
        Ok(report) => report,
        Err(e) => {
            log::error!("Replay failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to serialize report: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() -> ExitCode {
    eprintln!("Native feature not enabled. Use `cargo run --features native`");
    ExitCode::FAILURE
}
