//! planscript - analyze and run plan scripts from the command line
//!
//! # Usage
//!
//! ```bash
//! # Which capabilities does a plan need?
//! planscript analyze order.plan
//! planscript analyze order.plan --format json
//!
//! # Run it against canned tool results
//! planscript run order.plan --tools fixtures.json
//! planscript run order.plan --tools fixtures.json --config options.toml --max-steps 200
//! planscript run order.plan --dry-run
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use planscript::{analyze, prepare, CapabilityRegistry, ExecutionOptions};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "planscript")]
#[command(version)]
#[command(about = "Analyze and execute plan scripts", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a plan and list the capabilities it requires
    Analyze {
        /// Plan script file
        file: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },

    /// Execute a plan against fixture capabilities
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Plan script file
    file: PathBuf,

    /// JSON object mapping tool names to the value each one returns
    #[arg(short, long, value_name = "FILE")]
    tools: Option<PathBuf>,

    /// TOML file with execution options
    #[arg(short, long, value_name = "FILE", env = "PLANSCRIPT_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum statements plus loop iterations
    #[arg(long)]
    max_steps: Option<u32>,

    /// Wall-clock budget in milliseconds
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Record calls without invoking any tool
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Plain,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Analyze { file, format } => run_analyze(&file, format),
        Commands::Run(args) => run_plan(args).await,
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn run_analyze(file: &Path, format: OutputFormat) -> Result<bool> {
    let source = read_source(file)?;
    let analysis = analyze(&source).with_context(|| format!("parsing {}", file.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
        OutputFormat::Plain => {
            println!("Required capabilities:");
            for name in &analysis.required_capabilities {
                println!("  {}", name);
            }
            println!("Invocations: {}", analysis.invocations.len());
            for call in &analysis.invocations {
                match &call.capture {
                    Some(capture) => println!("  {} {} -> {}", call.location, call.name, capture),
                    None => println!("  {} {}", call.location, call.name),
                }
            }
        }
    }
    Ok(true)
}

/// File options first, then explicit flags on top.
fn resolve_options(args: &RunArgs) -> Result<ExecutionOptions> {
    let mut options = match &args.config {
        Some(path) => ExecutionOptions::load(path)
            .with_context(|| format!("loading options from {}", path.display()))?,
        None => ExecutionOptions::default(),
    };
    if let Some(max_steps) = args.max_steps {
        options = options.with_max_steps(max_steps);
    }
    if let Some(deadline_ms) = args.deadline_ms {
        options = options.with_deadline_ms(deadline_ms);
    }
    if args.dry_run {
        options = options.with_dry_run(true);
    }
    options.validate()?;
    Ok(options)
}

fn load_fixtures(path: Option<&Path>) -> Result<CapabilityRegistry> {
    let Some(path) = path else {
        return Ok(CapabilityRegistry::new());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading fixtures {}", path.display()))?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Object(fixtures) => Ok(CapabilityRegistry::from_fixtures(fixtures)),
        _ => bail!("fixtures in {} must be a JSON object", path.display()),
    }
}

async fn run_plan(args: RunArgs) -> Result<bool> {
    let options = resolve_options(&args)?;
    let registry = load_fixtures(args.tools.as_deref())?;
    let source = read_source(&args.file)?;
    let plan = prepare(&source).with_context(|| format!("parsing {}", args.file.display()))?;

    let missing = plan.missing_capabilities(&registry);
    if !missing.is_empty() {
        warn!("Plan requires unregistered capabilities: {}", missing.join(", "));
    }

    let result = plan.run(&registry, options).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result.ok)
}
