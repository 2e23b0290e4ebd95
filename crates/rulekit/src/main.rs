//! rulekit - Entry Point
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rulekit vet` | Discover and validate rules, print the validation result |
//! | `rulekit test` | Run every rule against its pass/fail fixtures |
//! | `rulekit package -o FILE` | Validate and write a reproducible policy tarball |
//! | `rulekit config` | Print the effective configuration as TOML |
//!
//! Results are printed to stdout as JSON; logs go to stderr. Exit status is
//! 0 on success, 1 when rules are invalid or tests fail, 2 on any other error.

// Force-link rulekit-providers to ensure linkme registrations are included
extern crate rulekit_providers;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rulekit_application::PolicyManager;
use rulekit_domain::{Error, MultiError, ValidateResult};
use rulekit_infrastructure::config::loader::render_toml;
use rulekit_infrastructure::logging::verbosity_level;
use rulekit_infrastructure::{ConfigLoader, RulekitConfig, build_manager, init_logging};

/// Command line interface for rulekit
#[derive(Parser, Debug)]
#[command(name = "rulekit")]
#[command(about = "Author, vet, test and package custom policy rules")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate every discovered rule
    Vet(PolicyArgs),
    /// Run rule fixtures through the configured scanners
    Test(PolicyArgs),
    /// Validate and package rules into a gzip tarball
    Package {
        #[command(flatten)]
        policy: PolicyArgs,
        /// Destination of the tarball
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Args, Debug)]
struct PolicyArgs {
    /// Policy root, its `policies` directory, or unset to search upward
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Continue with the valid rules when some rule directories fail to load
    #[arg(long)]
    skip_invalid: bool,
}

const EXIT_FAILED_CHECKS: u8 = 1;
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let mut config = loader.load().context("loading configuration")?;
    config.logging.level = verbosity_level(&config.logging.level, cli.verbose);
    config.logging.json_format |= cli.log_json;
    init_logging(&config.logging)?;

    match cli.command {
        Command::Vet(args) => vet(&config, &args),
        Command::Test(args) => test(&config, &args),
        Command::Package { policy, output } => package(&config, &policy, &output),
        Command::Config => {
            print!("{}", render_toml(&config)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Detect the policy root and load its rules
///
/// Discovery errors are returned alongside the manager so `vet` can report
/// them; other commands fail on them unless `--skip-invalid` is given.
fn load(
    config: &RulekitConfig,
    args: &PolicyArgs,
) -> anyhow::Result<(PolicyManager, MultiError)> {
    let mut manager = build_manager(config)?;
    let hint = args
        .directory
        .as_deref()
        .or(config.policy.directory.as_deref());
    manager.detect_policy(hint)?;

    let errors = match manager.load_rules() {
        Ok(_) => MultiError::new(),
        Err(Error::Discovery(errors)) => errors,
        Err(e) => return Err(e.into()),
    };
    Ok((manager, errors))
}

fn load_strict(config: &RulekitConfig, args: &PolicyArgs) -> anyhow::Result<PolicyManager> {
    let (manager, errors) = load(config, args)?;
    if errors.is_empty() {
        return Ok(manager);
    }
    if !args.skip_invalid {
        return Err(Error::Discovery(errors).into());
    }
    for error in errors.iter() {
        tracing::warn!(%error, "skipping rule directory");
    }
    Ok(manager)
}

fn vet(config: &RulekitConfig, args: &PolicyArgs) -> anyhow::Result<ExitCode> {
    let (manager, discovery_errors) = load(config, args)?;
    let mut result = ValidateResult::new();
    for error in discovery_errors {
        result.record_invalid(error);
    }
    result.merge(manager.validate_rules());

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILED_CHECKS)
    })
}

fn test(config: &RulekitConfig, args: &PolicyArgs) -> anyhow::Result<ExitCode> {
    let manager = load_strict(config, args)?;
    let (metrics, code) = match manager.test_rules() {
        Ok(metrics) => (metrics, ExitCode::SUCCESS),
        Err(Error::TestsFailed { metrics }) => (metrics, ExitCode::from(EXIT_FAILED_CHECKS)),
        Err(e) => return Err(e.into()),
    };
    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(code)
}

fn package(config: &RulekitConfig, args: &PolicyArgs, output: &Path) -> anyhow::Result<ExitCode> {
    let manager = load_strict(config, args)?;
    let result = manager.validate_rules();
    if !result.is_ok() {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(ExitCode::from(EXIT_FAILED_CHECKS));
    }

    manager
        .create_tarball(output)
        .with_context(|| format!("packaging rules into {}", output.display()))?;
    let summary = serde_json::json!({
        "tarball": output,
        "rules": manager.rules().len(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(ExitCode::SUCCESS)
}
