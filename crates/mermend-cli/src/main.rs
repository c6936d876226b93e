//! Mermend CLI - Repair Mermaid diagram markup and render it through Kroki

mod cli;
mod kroki;

use clap::Parser;
use mermend::core::logging::init_logging;

fn main() {
    let cli_args = cli::Cli::parse();

    // Early logging; `run` reinstalls with the CLI flags when it can
    if let Err(e) = init_logging(None, None) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let app = cli::MermendApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
