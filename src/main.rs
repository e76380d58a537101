use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use vacuscan::args::{Cli, Commands};
use vacuscan::batch;
use vacuscan::config::ScanConfig;
use vacuscan::detect::{self, OutputOptions};
use vacuscan::sweep;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ScanConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ScanConfig::load_default(),
    };

    let mut params = config.detection_parameters();
    cli.apply_overrides(&mut params);

    let outputs = OutputOptions {
        write_report: config.write_reports() && !cli.no_report,
        write_chart: config.write_charts() && !cli.no_chart,
    };

    if let Some(command) = cli.command {
        match command {
            Commands::Sweep { file } => {
                let target = match file.or_else(|| cli.file.clone()) {
                    Some(path) => path,
                    None => {
                        let folder = cli.folder.as_deref().context(
                            "Sweep needs a telemetry file; pass one or use --file/--folder",
                        )?;
                        batch::discover_files(folder)?
                            .into_iter()
                            .next()
                            .with_context(|| {
                                format!("No telemetry files in {}", folder.display())
                            })?
                    }
                };
                let report = sweep::run_sweep(&target, &params)?;
                sweep::print_report(&report);
            }
        }
        return Ok(());
    }

    if let Some(file) = &cli.file {
        let outcome = detect::run_file(file, &params, &outputs).map_err(|err| {
            let kind = err.kind();
            anyhow::Error::new(err).context(format!("{} error", kind))
        })?;
        println!(
            "{}: {} sinusoid detections, {} vacuum events",
            outcome.path.display(),
            outcome.detection_count,
            outcome.event_count
        );
        if let Some(path) = &outcome.report_path {
            println!("Report written to {}", path.display());
        }
        if let Some(path) = &outcome.chart_path {
            println!("Chart written to {}", path.display());
        }
        return Ok(());
    }

    if let Some(folder) = &cli.folder {
        let summary = batch::run_folder(folder, &params, &outputs)?;
        batch::print_summary(&summary);
        return Ok(());
    }

    anyhow::bail!("Nothing to do; pass --file or --folder (see --help)")
}
