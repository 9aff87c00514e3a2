//! pdfstitch - Combine images and PDF files into a single PDF document.

mod cli;
mod output;

use clap::Parser;
use std::process;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::output::{OutputFormatter, ProgressBar, RunSummary, format_file_size};
use pdfstitch::config::{Config, OverwriteMode};
use pdfstitch::error::StitchError;
use pdfstitch::finish::{Delivery, FileDelivery, finish};
use pdfstitch::merge::InputOutcome;
use pdfstitch::{CancelFlag, MediaKind, Merger, estimate_output_size, load_inputs};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        error!(error = %err, "Run failed");
        let formatter = OutputFormatter::default();
        formatter.error(&err.user_message());
        if err.is_run_failure() {
            formatter.error(&err.to_string());
        }
        process::exit(err.exit_code());
    }
}

/// Install the tracing subscriber; `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,pdfstitch=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), StitchError> {
    cli.validate()?;

    let inputs = cli.get_all_inputs().await?;
    let config = cli.to_config(inputs)?;
    let formatter = if cli.json {
        OutputFormatter::quiet()
    } else {
        OutputFormatter::from_config(&config)
    };

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfstitch::NAME, pdfstitch::VERSION));
        formatter.blank_line();
    }

    let estimated_size = estimate_output_size(config.inputs.len(), config.quality);
    let mut summary = RunSummary::empty(config.quality, estimated_size.clone());

    if config.inputs.is_empty() {
        formatter.info("No input files given, nothing to do");
        return print_summary(cli.json, &summary);
    }

    formatter.info(&format!(
        "{} input(s) at {} quality, estimated size {}",
        config.inputs.len(),
        config.quality,
        estimated_size
    ));

    if config.dry_run {
        print_plan(&config, &formatter);
        formatter.blank_line();
        formatter.success("Dry run completed successfully");
        formatter.info(&format!("  Output would be: {}", config.output_path().display()));
        return print_summary(cli.json, &summary);
    }

    handle_output_overwrite(&config, &formatter)?;

    let files = load_inputs(&config.inputs).await?;

    let cancel = CancelFlag::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let merger = Merger::new(config.quality).with_decode_timeout(config.decode_timeout);

    let mut bar = if formatter.should_print() {
        ProgressBar::new()
    } else {
        ProgressBar::disabled()
    };
    bar.set_message("Stitching");

    let merged = merger.merge(&files, &mut bar, &cancel).await;
    bar.finish();
    let Some(result) = merged? else {
        return print_summary(cli.json, &summary);
    };

    for outcome in &result.outcomes {
        match outcome {
            InputOutcome::Recovered { name, error, .. } => {
                formatter.warning(&format!("{name}: replaced with a placeholder page ({error})"));
            }
            InputOutcome::Converted { name, pages, .. } => {
                formatter.debug(&format!("{name}: {pages} page(s)"));
            }
        }
    }
    summary = summary.with_merge(&result.outcomes, &result.statistics);

    let statistics = result.statistics;
    let finished = finish(result.document, &config.output_name, config.compress).await?;

    let delivery = FileDelivery::new(&config.output_dir, config.overwrite_mode);
    let delivered = delivery.deliver(finished).await?;

    if formatter.should_print() {
        formatter.blank_line();
        formatter.success(&format!(
            "Created {} ({}, {} pages)",
            delivered.location.display(),
            format_file_size(delivered.size),
            statistics.total_pages
        ));

        if formatter.is_verbose() {
            formatter.section("Statistics");
            formatter.detail("Inputs", &statistics.inputs.to_string());
            formatter.detail("Placeholders", &statistics.recovered.to_string());
            formatter.detail("Total pages", &statistics.total_pages.to_string());
            formatter.detail("Estimated size", &estimated_size);
            formatter.detail("Output size", &format_file_size(delivered.size));
            formatter.detail(
                "Merge time",
                &format!("{:.2}s", statistics.elapsed.as_secs_f64()),
            );
            formatter.detail(
                "Write time",
                &format!("{:.2}s", delivered.elapsed.as_secs_f64()),
            );
            formatter.detail("Compression", if config.compress { "Yes" } else { "No" });
        }
    }

    summary.output = Some(delivered.location);
    summary.size_bytes = Some(delivered.size);
    print_summary(cli.json, &summary)
}

/// List what each input will become.
fn print_plan(config: &Config, formatter: &OutputFormatter) {
    formatter.section("Plan");
    for (index, path) in config.inputs.iter().enumerate() {
        let name = path.display().to_string();
        let kind = if MediaKind::detect(None, &name).is_document() {
            "all pages"
        } else {
            "one A4 page"
        };
        formatter.list_item(index + 1, &format!("{name} ({kind})"));
    }
}

fn print_summary(json: bool, summary: &RunSummary) -> Result<(), StitchError> {
    if json {
        let rendered = serde_json::to_string_pretty(summary).map_err(StitchError::serialize)?;
        println!("{rendered}");
    }
    Ok(())
}

/// Handle output file overwrite scenarios.
fn handle_output_overwrite(config: &Config, formatter: &OutputFormatter) -> Result<(), StitchError> {
    let output = config.output_path();

    if !output.exists() {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(StitchError::OutputExists { path: output }),
        OverwriteMode::Prompt => {
            if formatter.is_quiet() {
                return Err(StitchError::OutputExists { path: output });
            }

            formatter.warning(&format!("Output file already exists: {}", output.display()));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin().read_line(&mut response)?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(())
            } else {
                Err(StitchError::Cancelled)
            }
        }
    }
}
