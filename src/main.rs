use std::process::ExitCode;

mod app;
mod logging;

fn main() -> ExitCode {
    let args = photo_organizer::cli::parse();
    app::run(args)
}
