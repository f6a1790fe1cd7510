//! Command-line interface.
//!
//! The classic Windows spelling is accepted alongside the usual one:
//!
//! ```text
//! instsoft [/f path] [computername]
//! instsoft [-f path] [computername]
//! instsoft /?
//! ```

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{name} version {version}
{about}

{usage-heading} {usage}

{all-args}";

#[derive(Debug, Parser)]
#[command(name = "instsoft")]
#[command(
    version,
    about = "List the software installed on a local or remote Windows computer",
    help_template = HELP_TEMPLATE
)]
pub struct Cli {
    /// Write the report to a new file in this directory instead of stdout
    #[arg(short = 'f', long = "output-dir", value_name = "PATH")]
    pub output_dir: Option<PathBuf>,

    /// Computer to inventory (defaults to this computer)
    #[arg(value_name = "COMPUTERNAME")]
    pub host: Option<String>,

    /// Anything after the computer name is accepted and ignored.
    #[arg(hide = true, value_name = "IGNORED")]
    pub ignored: Vec<OsString>,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub debug: bool,

    /// Read settings from this file instead of the default config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not show a progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

/// Rewrites a leading `/?` or `/f` into the flags clap understands.
///
/// Only the first argument is rewritten; that is the only position where
/// the Windows-style flags are meaningful.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            if i != 1 {
                return arg;
            }
            match arg.to_str() {
                Some("/?") => OsString::from("--help"),
                Some("/f") | Some("/F") => OsString::from("-f"),
                _ => arg,
            }
        })
        .collect()
}
