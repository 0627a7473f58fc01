//! Verdict binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use verdict::cli::{Cli, Commands};
use verdict::config::RunConfig;
use verdict::runner::Runner;
use verdict_core::CoreResult;
use verdict_triage::{Phase, ResourceProbe};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dispatch(cli).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> CoreResult<()> {
    match cli.command {
        Commands::Run {
            logs_dir,
            out,
            phases,
            fix_scripts,
            no_probe,
        } => {
            let mut config = RunConfig::load(&cli.config)?;
            if let Some(out) = out {
                config.output.dir = out;
            }
            if fix_scripts {
                config.fix.scripts = true;
            }

            let mut runner = Runner::new(config, logs_dir).with_probe(!no_probe);
            if !phases.is_empty() {
                let selected = phases
                    .iter()
                    .map(|s| {
                        Phase::parse(s).ok_or_else(|| {
                            verdict_core::CoreError::config(format!("unknown phase: {}", s))
                        })
                    })
                    .collect::<CoreResult<Vec<Phase>>>()?;
                runner = runner.with_phases(selected);
            }

            let outcome = runner.execute().await?;
            println!(
                "{} event(s) recorded; {} error(s), {} warning(s), overall status: {}",
                outcome.events_recorded,
                outcome.snapshot.total_errors,
                outcome.snapshot.total_warnings,
                outcome.snapshot.overall_status
            );
            println!("consolidated report: {}", outcome.summary_report.display());
            Ok(())
        }
        Commands::Probe => {
            for finding in ResourceProbe::default().probe() {
                println!("[{}] {}", finding.level, finding.message);
            }
            Ok(())
        }
    }
}
