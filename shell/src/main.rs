//! Scripted playground for the rewind edit history.
//!
//! ```text
//! rewind-shell --config history.toml scripts/demo.txt
//! ```

mod scene;
mod script;
mod view;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use rewind_core::{EditLog, HistoryConfig, LogEvent, load_config};

use crate::script::Session;

/// Runs an editing script against a scene of shapes and prints the results.
#[derive(Parser, Debug)]
#[command(
    name = "rewind-shell",
    about = "Scripted undo/redo playground",
    long_about = "Reads editing commands one per line, from SCRIPT or standard input.\n\n\
        COMMANDS:\n  \
          shape NAME | move NAME X Y | opacity NAME V | fade V\n  \
          insert NAME I X Y | remove NAME I | drag NAME I X Y\n  \
          boundary | undo | redo | jump N | delete NAME\n  \
          limit N | clear | history | show\n\n\
        Lines starting with '#' are comments. Set RUST_LOG=debug to trace the log.",
    version
)]
struct Args {
    /// History configuration file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Script to run. Reads standard input when omitted.
    script: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path).unwrap_or_else(|e| {
            log::warn!("{e}; using default history settings");
            HistoryConfig::default()
        }),
        None => HistoryConfig::default(),
    };
    let history = Arc::new(EditLog::from_config(&config));
    log::info!("history limit: {:?}", history.limit());
    history.add_listener(Arc::new(|event: &LogEvent| log::info!("history {event}")));

    let mut session = Session::new(history);
    let mut stdout = io::stdout().lock();
    let result = match &args.script {
        Some(path) => File::open(path).and_then(|file| session.run(BufReader::new(file), &mut stdout)),
        None => session.run(io::stdin().lock(), &mut stdout),
    };

    log::info!(
        "{} shapes, {} edits in history",
        session.scene().len(),
        session.history().len()
    );
    match result {
        Ok(0) => {}
        Ok(failed) => {
            log::warn!("{failed} script lines failed");
            std::process::exit(1);
        }
        Err(e) => {
            log::error!("failed to read script: {e}");
            std::process::exit(1);
        }
    }
}
