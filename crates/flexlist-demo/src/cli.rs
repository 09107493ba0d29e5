#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parses args by hand, with `FLEXLIST_DEMO_*` environment variables as
//! fallbacks that explicit flags override.

use std::env;
use std::process;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Script run when none is given: a tour of every panel action.
pub const DEFAULT_SCRIPT: &str =
    "jump:25,refresh:3,refresh:10:4,delete,add,scroll:120,scroll:-60,fling:1500,resize:240,clear,add:3";

pub const HELP_TEXT: &str = "\
flexlist demo: a headless variable-height list driven by a script

USAGE:
    flexlist-demo [OPTIONS]

OPTIONS:
    --rows=N          Initial number of rows (default: 50)
    --viewport=H      Viewport height (default: 100)
    --padding=P       Gap between rows (default: 15)
    --wrap=W          Title wrap width in columns (default: 40)
    --seed=S          Seed for random titles (default: 7)
    --script=STEPS    Comma-separated steps (default: a tour of every step)
    --json            Print one JSON snapshot per step instead of text
    --help, -h        Show this help message
    --version, -V     Show version

STEPS:
    add | add:N           Append one or N random rows
    delete                Remove the last row
    jump:R                Scroll row R into view
    refresh:R[:C]         Give rows R..R+C new titles and refresh them
    refresh-all           Return to the top and repopulate every slot
    scroll:DY             Scroll by DY pixels
    fling:V               Fling at V px/s and let it settle
    resize:H              Change the viewport height
    clear                 Remove every row

ENVIRONMENT VARIABLES:
    FLEXLIST_DEMO_ROWS        Override --rows
    FLEXLIST_DEMO_VIEWPORT    Override --viewport
    FLEXLIST_DEMO_PADDING     Override --padding
    FLEXLIST_DEMO_WRAP        Override --wrap
    FLEXLIST_DEMO_SEED        Override --seed
    FLEXLIST_DEMO_SCRIPT      Override --script
    RUST_LOG                  Log filter (default: flexlist=info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// Rows created before the script runs.
    pub rows: usize,
    /// Viewport height.
    pub viewport: f32,
    /// Gap between rows.
    pub padding: f32,
    /// Title wrap width in columns.
    pub wrap: usize,
    /// Random title seed.
    pub seed: u64,
    /// Script steps.
    pub script: String,
    /// Emit JSON snapshots.
    pub json: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            rows: 50,
            viewport: 100.0,
            padding: 15.0,
            wrap: 40,
            seed: 7,
            script: DEFAULT_SCRIPT.into(),
            json: false,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// Run the demo.
    Run(Opts),
    /// Print help.
    Help,
    /// Print the version.
    Version,
}

fn parse_value<T: std::str::FromStr>(flag: &str, val: &str) -> Result<T, String> {
    val.parse()
        .map_err(|_| format!("Invalid {flag} value: {val}"))
}

impl Opts {
    /// Parse the process arguments and environment, exiting on help,
    /// version, or a bad flag.
    pub fn parse() -> Self {
        match Self::parse_from(|key| env::var(key).ok(), env::args().skip(1)) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("flexlist-demo {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse from an environment lookup and an argument list.
    ///
    /// Unparseable environment values are ignored; unparseable flags are
    /// errors.
    pub fn parse_from<E, I>(env_var: E, args: I) -> Result<Parsed, String>
    where
        E: Fn(&str) -> Option<String>,
        I: IntoIterator<Item = String>,
    {
        let mut opts = Self::default();

        if let Some(val) = env_var("FLEXLIST_DEMO_ROWS")
            && let Ok(n) = val.parse()
        {
            opts.rows = n;
        }
        if let Some(val) = env_var("FLEXLIST_DEMO_VIEWPORT")
            && let Ok(h) = val.parse()
        {
            opts.viewport = h;
        }
        if let Some(val) = env_var("FLEXLIST_DEMO_PADDING")
            && let Ok(p) = val.parse()
        {
            opts.padding = p;
        }
        if let Some(val) = env_var("FLEXLIST_DEMO_WRAP")
            && let Ok(w) = val.parse()
        {
            opts.wrap = w;
        }
        if let Some(val) = env_var("FLEXLIST_DEMO_SEED")
            && let Ok(s) = val.parse()
        {
            opts.seed = s;
        }
        if let Some(val) = env_var("FLEXLIST_DEMO_SCRIPT") {
            opts.script = val;
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "--json" => opts.json = true,
                other => {
                    if let Some(val) = other.strip_prefix("--rows=") {
                        opts.rows = parse_value("--rows", val)?;
                    } else if let Some(val) = other.strip_prefix("--viewport=") {
                        opts.viewport = parse_value("--viewport", val)?;
                    } else if let Some(val) = other.strip_prefix("--padding=") {
                        opts.padding = parse_value("--padding", val)?;
                    } else if let Some(val) = other.strip_prefix("--wrap=") {
                        opts.wrap = parse_value("--wrap", val)?;
                    } else if let Some(val) = other.strip_prefix("--seed=") {
                        opts.seed = parse_value("--seed", val)?;
                    } else if let Some(val) = other.strip_prefix("--script=") {
                        opts.script = val.to_string();
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        Ok(Parsed::Run(opts))
    }
}
