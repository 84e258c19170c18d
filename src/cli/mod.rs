//! CLI command definitions for flagfile
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::descriptor::OptionDescriptor;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Load a YAML config file with includes and option aliases
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (default: $FLAGFILE_CONFIG, then the user config dir)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Declare an option and its aliases: canonical[=alias1,alias2,...]
    #[arg(short = 'o', long = "option", global = true, value_name = "SPEC",
          value_parser = OptionDescriptor::parse_spec)]
    pub options: Vec<OptionDescriptor>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Print errors as a JSON object with code, message and path
    #[arg(long, global = true)]
    pub json_errors: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the merged configuration (default if no subcommand given)
    Show {
        /// Output format: yaml or json
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Print a single string value by canonical key
    Get {
        /// Canonical key; dotted keys read nested mappings
        key: String,
    },

    /// Load the configuration and report what was found
    Check,

    /// Resolve declared options across command line, environment, file and defaults
    Resolve {
        /// Explicit value for an option: NAME=VALUE
        #[arg(short, long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,

        /// Environment prefix; option `listen-http` reads `<PREFIX>LISTEN_HTTP`
        #[arg(long, value_name = "PREFIX")]
        env_prefix: Option<String>,
    },
}

/// Parse a `NAME=VALUE` assignment.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

/// Environment variable name for `canonical` under `prefix`.
pub fn env_var_name(prefix: &str, canonical: &str) -> String {
    let mut name = String::with_capacity(prefix.len() + canonical.len());
    name.push_str(prefix);
    for c in canonical.chars() {
        match c {
            '-' | '.' => name.push('_'),
            c => name.push(c.to_ascii_uppercase()),
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_and_subcommand() {
        let cli = Cli::try_parse_from([
            "flagfile",
            "--config",
            "/etc/app/server.yml",
            "-o",
            "listen-http=listen_http,L",
            "-o",
            "key-file=K",
            "get",
            "listen-http",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/app/server.yml")));
        assert_eq!(cli.options.len(), 2);
        assert_eq!(cli.options[0].aliases, vec!["listen_http", "L"]);
        match cli.command {
            Some(Command::Get { key }) => assert_eq!(key, "listen-http"),
            other => panic!("expected get, got {other:?}"),
        }
    }

    #[test]
    fn test_default_subcommand_is_none() {
        let cli = Cli::try_parse_from(["flagfile"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
        assert_eq!(cli.log, "2");
        assert!(!cli.json_errors);
    }

    #[test]
    fn test_json_errors_is_global() {
        let cli = Cli::try_parse_from(["flagfile", "check", "--json-errors"]).unwrap();
        assert!(cli.json_errors);
    }

    #[test]
    fn test_bad_option_spec_rejected() {
        assert!(Cli::try_parse_from(["flagfile", "-o", "=x", "check"]).is_err());
    }

    #[test]
    fn test_resolve_args() {
        let cli = Cli::try_parse_from([
            "flagfile",
            "resolve",
            "--set",
            "listen-http=:9000",
            "--env-prefix",
            "APP_",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Resolve { set, env_prefix }) => {
                assert_eq!(set, vec![("listen-http".to_string(), ":9000".to_string())]);
                assert_eq!(env_prefix.as_deref(), Some("APP_"));
            }
            other => panic!("expected resolve, got {other:?}"),
        }
    }

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name("APP_", "listen-http"), "APP_LISTEN_HTTP");
        assert_eq!(env_var_name("", "server.port"), "SERVER_PORT");
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }
}
