use std::io;
use std::process::ExitCode;

use reality_engine::run_app;
use tracing::error;

use super::bootstrap::{AppWiring, LaunchMode};
use super::headless::run_script_file;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        mode,
        config,
        mut journey,
        scenes,
    } = app;

    match mode {
        LaunchMode::Windowed => {
            if let Err(err) = run_app(config, journey, scenes) {
                error!(error = %err, "startup_failed");
                return ExitCode::FAILURE;
            }
        }
        LaunchMode::Script(path) => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            if let Err(err) = run_script_file(&path, &mut journey, &mut out) {
                error!(error = %err, path = %path.display(), "script_failed");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
