//! testrun-ctx - test run property context tool
//!
//! Loads property snapshots into a test run context, resolves references
//! between properties and prints them by dotted path.
//!
//! ## Usage
//!
//! ```bash
//! # Print a nested property
//! testrun-ctx lookup --file run.yaml --path server.port
//!
//! # Resolve references first
//! testrun-ctx lookup --file run.yaml --path client.endpoint --resolve
//!
//! # Write a resolved copy of a snapshot
//! testrun-ctx resolve --file run.yaml --output resolved.json
//!
//! # Show the effective configuration
//! testrun-ctx config show
//! ```

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{debug, info};

use testrun_context::cli::{self, Args};
use testrun_context::config::{self, EngineConfig, EnvConfig};
use testrun_context::context::TestContext;
use testrun_context::models::Property;
use testrun_context::output::{OutputFormat, PropertyFormatter};
use testrun_context::snapshot;
use testrun_context::utils::{init_logger, LogLevel, Timer};

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        EnvConfig::load()
            .log_level
            .as_deref()
            .and_then(LogLevel::from_str)
            .unwrap_or_default()
    };
    init_logger(level);

    let config_path = args.config.as_deref().map(Path::new);

    match args.command {
        cli::Command::Lookup(lookup_args) => {
            let config = EngineConfig::load_default(config_path)?;
            lookup(lookup_args, &config)?;
        }
        cli::Command::Show(show_args) => {
            let config = EngineConfig::load_default(config_path)?;
            show(show_args, &config)?;
        }
        cli::Command::Resolve(resolve_args) => {
            let config = EngineConfig::load_default(config_path)?;
            resolve(resolve_args, &config)?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, config_path)?;
        }
    }

    Ok(())
}

/// Context with the configured tracing flag and the snapshot's properties
fn load_context(file: &str, config: &EngineConfig, with_globals: bool) -> Result<TestContext> {
    let mut context = if with_globals {
        TestContext::from_config(config)
    } else {
        let mut context = TestContext::new();
        context.set_tracing(config.tracing);
        context
    };

    let count = snapshot::load_into(file, &mut context)?;
    info!("Loaded {} properties from {}", count, file);
    Ok(context)
}

/// Resolve the references of every top-level property list
fn resolve_all(context: &mut TestContext) -> Result<()> {
    let timer = Timer::start("Reference resolution");
    let passes = context
        .resolve_all()
        .context("Failed to resolve property references")?;
    debug!("Reference resolution settled after {} passes", passes);
    timer.stop();
    Ok(())
}

fn lookup(args: cli::LookupArgs, config: &EngineConfig) -> Result<()> {
    let mut context = load_context(&args.file, config, true)?;
    if args.resolve {
        resolve_all(&mut context)?;
    }

    let property = context
        .get_property(&args.path)
        .ok_or_else(|| anyhow!("Property not found: {}", args.path))?;

    let format = output_format(args.format.as_deref());
    print!("{}", PropertyFormatter::new(format).format_property(property));
    if format != OutputFormat::Table {
        println!();
    }
    Ok(())
}

fn show(args: cli::ShowArgs, config: &EngineConfig) -> Result<()> {
    let context = load_context(&args.file, config, args.globals)?;

    let format = output_format(args.format.as_deref());
    print!("{}", PropertyFormatter::new(format).format_properties(context.get_all()));
    if format != OutputFormat::Table {
        println!();
    }
    Ok(())
}

fn resolve(args: cli::ResolveArgs, config: &EngineConfig) -> Result<()> {
    let mut context = load_context(&args.file, config, false)?;
    resolve_all(&mut context)?;

    let mut properties: Vec<Property> = context.get_all().map(Property::deep_copy).collect();
    properties.sort_by(|a, b| a.name().cmp(&b.name()));

    match args.output {
        Some(output) => {
            snapshot::save(&output, &properties)?;
            println!("✓ Resolved snapshot written: {output}");
        }
        None => {
            println!("{}", serde_yaml::to_string(&properties)?);
        }
    }
    Ok(())
}

/// `--format` when given, otherwise TESTRUN_CTX_FORMAT
fn output_format(explicit: Option<&str>) -> OutputFormat {
    OutputFormat::select(explicit, EnvConfig::load().format.as_deref())
}

fn manage_config(args: cli::ConfigArgs, config_path: Option<&Path>) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(&output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            EngineConfig::default().save(path)?;
            println!("✓ Configuration file created: {output}");
            println!("\nEdit the file to set the global run properties.");
        }

        cli::ConfigAction::Show { env, format } => {
            if env {
                EnvConfig::load().print_summary();
            } else {
                let config = EngineConfig::load_default(config_path)?;
                let output = if format == "json" {
                    serde_json::to_string_pretty(&config)?
                } else {
                    serde_yaml::to_string(&config)?
                };
                println!("{output}");
            }
        }

        cli::ConfigAction::Env => {
            config::env::print_env_help();
        }
    }

    Ok(())
}
