//! flagfile
//!
//! Loads a YAML config file, following its includes and resolving option
//! aliases, and prints the merged result.

use anyhow::{Context, Result, bail};
use clap::Parser;
use flagfile::cli::{Cli, Command, env_var_name};
use flagfile::error::ErrorReport;
use flagfile::format::{OutputFormat, format_resolved, format_source};
use flagfile::gate::ConfigFileArg;
use flagfile::logging::{self, LogTarget};
use flagfile::overlay::Overlay;
use flagfile::source::{KeyValueSource, MergedSource};
use std::io::Write;
use tracing::{debug, info};

fn main() {
    let cli = Cli::parse();
    let json_errors = cli.json_errors;
    if let Err(e) = run(cli) {
        if json_errors {
            let report = ErrorReport::from_anyhow(&e);
            match serde_json::to_string(&report) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("Error: {:#}", e),
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let config_arg = ConfigFileArg::discover(cli.config.as_deref());
    debug!(path = %config_arg.path.display(), explicit = config_arg.explicit, "Config file");

    let mut options = cli.options;
    let source = config_arg
        .load(&options)
        .with_context(|| format!("Failed loading config from {}", config_arg.path.display()))?;

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Some(Command::Show { format }) => {
            let Some(format) = OutputFormat::from_str(&format) else {
                bail!("Unknown output format '{}' (expected yaml or json)", format);
            };
            stdout.write_all(format_source(&source, format)?.as_bytes())?;
        }
        None => {
            stdout.write_all(format_source(&source, OutputFormat::default())?.as_bytes())?;
        }
        Some(Command::Get { key }) => {
            let value = source.get_string(&key)?;
            writeln!(stdout, "{}", value)?;
        }
        Some(Command::Check) => {
            report(&source, &mut stdout)?;
        }
        Some(Command::Resolve { set, env_prefix }) => {
            if let Some(prefix) = env_prefix {
                for descriptor in options.iter_mut() {
                    descriptor.env = vec![env_var_name(&prefix, &descriptor.canonical)];
                }
            }
            let overlay = set
                .into_iter()
                .fold(Overlay::new(&options, &source), |overlay, (name, value)| {
                    overlay.with_explicit(name, value)
                });
            let undeclared = overlay.undeclared_explicit();
            if !undeclared.is_empty() {
                bail!(
                    "Unknown option(s) in --set: {} (declare them with -o)",
                    undeclared.join(", ")
                );
            }
            stdout.write_all(format_resolved(&overlay.resolve_all()?).as_bytes())?;
        }
    }

    Ok(())
}

fn report(source: &MergedSource, out: &mut impl Write) -> Result<()> {
    match source.origin() {
        Some(origin) => {
            info!(path = %origin.display(), keys = source.len(), "Config OK");
            writeln!(out, "{}: {} keys", origin.display(), source.len())?;
        }
        None => writeln!(out, "no config file loaded")?,
    }
    Ok(())
}
