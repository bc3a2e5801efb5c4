//! citegen: bibliography generator CLI
//!
//! Classifies the given identifiers, resolves them in parallel against
//! their sources, and prints a formatted bibliography. Failed and
//! unclassifiable identifiers are listed before any bibliography output.

mod cli;
mod config;

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use citegen_core::render::Renderer;
use citegen_core::{classify_batch, resolve_all, Sources};

use cli::{Cli, Command};
use config::FileConfig;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // help/version are normal termination; usage errors exit 1
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    init_logging(cli.log_errors);

    if let Some(Command::Config { key, value }) = &cli.command {
        return run_config(key, value.as_deref());
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("Error: could not start async runtime: {}", err);
            return ExitCode::from(1);
        }
    };
    runtime.block_on(run(cli))
}

fn init_logging(log_errors: bool) {
    let filter = if log_errors { "citegen=error,citegen_core=error" } else { "off" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(cli: Cli) -> ExitCode {
    let file_config = match FileConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {}", err);
            return ExitCode::from(1);
        }
    };

    let options = match file_config.render_options(
        cli.style.clone(),
        cli.locale.clone(),
        cli.format.clone(),
        cli.intext_override(),
    ) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("Configuration error: {}", err);
            return ExitCode::from(1);
        }
    };

    if cli.identifiers.is_empty() {
        eprintln!("No identifiers given. Run `citegen --help` for usage.");
        return ExitCode::from(1);
    }

    let (classified, unknown) = classify_batch(&cli.identifiers);

    if !unknown.is_empty() {
        println!("Unrecognized identifiers (not resolved):");
        for value in &unknown {
            println!("  {}", value);
        }
        println!();
    }

    let sources = Sources::new();
    let outcome = resolve_all(&sources, &classified).await;

    if !outcome.failures.is_empty() {
        println!("Failed to resolve:");
        for failure in &outcome.failures {
            println!("  [{}] {}", failure.kind, failure.identifier);
        }
        println!();
    }

    if outcome.store.is_empty() {
        return ExitCode::from(0);
    }

    let renderer = Renderer::new();
    match renderer.render(outcome.store.records(), &options).await {
        Ok(rendered) => {
            println!("{}", rendered.references);
            if let Some(intext) = rendered.intext {
                println!();
                println!("In-text citations:");
                println!("{}", intext);
            }
            ExitCode::from(0)
        }
        Err(err) => {
            // distinct from the per-identifier failure list above
            println!("Could not render bibliography: {}", err);
            ExitCode::from(0)
        }
    }
}

fn run_config(key: &str, value: Option<&str>) -> ExitCode {
    let result = (|| -> Result<(), config::ConfigError> {
        let mut file_config = FileConfig::load()?;
        match value {
            None => {
                println!("{}", file_config.get(key)?);
            }
            Some("reset") => {
                file_config.reset(key)?;
                file_config.save()?;
            }
            Some(new_value) => {
                file_config.set(key, new_value)?;
                file_config.save()?;
            }
        }
        Ok(())
    })();

    match result {
        Ok(()) => ExitCode::from(0),
        Err(err) => {
            eprintln!("Configuration error: {}", err);
            ExitCode::from(1)
        }
    }
}
