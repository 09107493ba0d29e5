#![forbid(unsafe_code)]

//! flexlist demo binary entry point.

use std::io::Write;

use flexlist_demo::cli;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("flexlist=info,flexlist_demo=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();
    let opts = cli::Opts::parse();

    let snapshots = match flexlist_demo::run_session(&opts) {
        Ok(snapshots) => snapshots,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for snapshot in &snapshots {
        let written = if opts.json {
            match serde_json::to_string(snapshot) {
                Ok(line) => writeln!(out, "{line}"),
                Err(e) => {
                    eprintln!("Failed to encode snapshot: {e}");
                    std::process::exit(1);
                }
            }
        } else {
            write!(out, "{}", snapshot.render_text())
        };
        if written.is_err() {
            // Downstream closed the pipe.
            return;
        }
    }
}
