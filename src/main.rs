use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tweak::controller::Controller;
use tweak::domain::{TweakConfig, TweakError};
use tweak::model::{Model, Status};
use tweak::ui;

#[derive(Parser)]
#[command(name = "tweak", about = "A tui based csv editor.", version)]
struct Args {
    /// Csv file to open on startup
    path: Option<PathBuf>,
}

fn main() -> ExitCode {
    let result = run();
    ratatui::restore();
    match result {
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run() -> Result<(), TweakError> {
    init_tracing()?;
    let args = Args::parse();
    let config = TweakConfig::default();

    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    let mut model = Model::init(&config, size.width as usize, size.height as usize);
    if let Some(path) = &args.path {
        model.open_path(path);
    }

    let controller = Controller::new(&config);
    info!("Started tweak!");

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui::draw(model.get_uidata(), f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message)?;
        }
    }

    Ok(())
}

// The terminal owns stderr, so traces go to a file when TWEAK_LOG names
// one. Filtering is the usual RUST_LOG.
fn init_tracing() -> Result<(), TweakError> {
    if let Ok(path) = std::env::var("TWEAK_LOG") {
        let file = std::fs::File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(Arc::new(file))
            .with_ansi(false)
            .init();
    }
    Ok(())
}
