#![forbid(unsafe_code)]

//! Headless demo for `flexlist`: a panel of wrapped text rows driven by a
//! script, printing the slot table after each step.

pub mod cli;
pub mod panel;
pub mod text_item;

use std::fmt;

use flexlist::FlexListError;

use crate::cli::Opts;
use crate::panel::{FlexPanel, Snapshot, parse_script};

/// Errors that stop a demo session.
#[derive(Debug)]
pub enum DemoError {
    /// The script could not be parsed.
    Script(String),
    /// The list rejected the configuration.
    List(FlexListError),
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script(msg) => write!(f, "script error: {msg}"),
            Self::List(err) => write!(f, "list error: {err}"),
        }
    }
}

impl std::error::Error for DemoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Script(_) => None,
            Self::List(err) => Some(err),
        }
    }
}

impl From<FlexListError> for DemoError {
    fn from(err: FlexListError) -> Self {
        Self::List(err)
    }
}

/// Run a full session: initialize, then every script step.
///
/// Returns one snapshot for the initial state and one per step. A step the
/// list rejects is logged and recorded in its snapshot; the session goes on.
pub fn run_session(opts: &Opts) -> Result<Vec<Snapshot>, DemoError> {
    let steps = parse_script(&opts.script).map_err(DemoError::Script)?;
    let mut panel = FlexPanel::new(opts)?;
    panel.initialize(opts.rows);

    let mut snapshots = Vec::with_capacity(steps.len() + 1);
    snapshots.push(panel.snapshot("init", None));
    for step in &steps {
        let error = match panel.apply(step) {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(%step, error = %err, "step rejected");
                Some(err.to_string())
            }
        };
        snapshots.push(panel.snapshot(&step.to_string(), error));
    }
    Ok(snapshots)
}
