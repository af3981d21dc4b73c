mod app;

use std::process::ExitCode;

fn main() -> ExitCode {
    let app = match app::bootstrap::build_app(std::env::args().skip(1)) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("{}", app::bootstrap::USAGE);
            return ExitCode::FAILURE;
        }
    };
    app::loop_runner::run(app)
}
