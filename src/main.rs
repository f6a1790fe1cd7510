use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use instsoft::{
    cli::{normalize_args, Cli},
    collect_inventory,
    config::Config,
    output::{open_output, render_report},
    platform::local_computer_name,
    probe::{ArchitectureProbe, FixedProbe, WmiProbe},
    registry::{Backend, PowerShellConnector, RegExeConnector},
    Extractor, InventoryError, RunRequest, StoreLocation,
};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit codes. Usage errors exit with clap's code 2.
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
}

/// Log level is `instsoft=error` unless `--debug` is given or `RUST_LOG`
/// is set. Logs go to stderr so they never mix with a report on stdout.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("instsoft=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("instsoft=error"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    init_tracing(cli.debug);

    tracing::debug!("instsoft starting with args: {:?}", cli);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => match e.downcast_ref::<InventoryError>() {
            Some(fatal) => {
                eprintln!("{}", fatal);
                ExitCode::from(fatal.exit_code())
            }
            None => {
                eprintln!("Error: {:#}", e);
                ExitCode::from(exit_codes::ERROR)
            }
        },
    }
}

fn run(cli: Cli) -> Result<u8> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };

    let local_host = local_computer_name();
    let mut request = RunRequest::new(cli.host.clone().unwrap_or_else(|| local_host.clone()));
    if let Some(dir) = cli.output_dir {
        request = request.with_output_dir(dir);
    }

    if !cli.ignored.is_empty() {
        tracing::debug!("ignoring extra arguments: {:?}", cli.ignored);
    }

    let probe: Box<dyn ArchitectureProbe> = if config.probe_architecture {
        Box::new(WmiProbe::new(&config.powershell_exe))
    } else {
        Box::new(FixedProbe::default())
    };

    let progress = if config.show_progress && !cli.no_progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Connecting to {}...", request.host));
        pb
    } else {
        ProgressBar::hidden()
    };

    let extractor = Extractor::new(config.product_name_fallback);
    let on_location =
        |location: StoreLocation| progress.set_message(format!("Scanning {}...", location));
    let run = match config.registry_backend {
        Backend::PowerShell => collect_inventory(
            &request,
            &PowerShellConnector::new(&config.powershell_exe, local_host),
            probe.as_ref(),
            extractor,
            on_location,
        ),
        Backend::RegExe => collect_inventory(
            &request,
            &RegExeConnector::new(&config.reg_exe, local_host),
            probe.as_ref(),
            extractor,
            on_location,
        ),
    };
    progress.finish_and_clear();
    let run = run?;

    if !run.summary.skipped.is_empty() {
        tracing::debug!("{} location(s) could not be read", run.summary.skipped.len());
    }

    let (mut writer, path) = open_output(&run.context)?;
    if let Some(path) = path {
        println!("{}", path.display());
    }
    render_report(&mut *writer, &run.context, &run.inventory)?;

    Ok(exit_codes::SUCCESS)
}
