use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use opsflow_core::Params;
use opsflow_ec2::{AwsCli, Operation, Picker, autocomplete, dispatch};
use serde_json::{Value, json};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "opsflow")]
#[command(version)]
#[command(about = "Run AWS EC2 provisioning operations from workflow parameter bags", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one EC2 operation
    Run {
        /// Operation name (see `opsflow ops`)
        #[arg(value_parser = parse_operation)]
        operation: Operation,
        /// JSON parameter bag: a file path, or "-" for stdin
        #[arg(short, long)]
        params: Option<PathBuf>,
        /// Inline parameter override (key=value, repeatable). Values are
        /// parsed as JSON where possible, kept as strings otherwise
        #[arg(short = 'P', long = "param")]
        param: Vec<String>,
        /// AWS region
        #[arg(short, long, env = "AWS_REGION")]
        region: String,
        /// AWS credentials profile
        #[arg(long, env = "AWS_PROFILE")]
        profile: Option<String>,
    },
    /// List the supported operations
    Ops,
    /// Query an autocomplete picker (instance-types, regions, subnets)
    Complete {
        /// Picker name
        #[arg(value_parser = parse_picker)]
        picker: Picker,
        /// Filter query
        query: Option<String>,
        /// AWS region (required for instance-types)
        #[arg(short, long, env = "AWS_REGION")]
        region: Option<String>,
        /// AWS credentials profile
        #[arg(long, env = "AWS_PROFILE")]
        profile: Option<String>,
    },
}

fn parse_operation(name: &str) -> Result<Operation, String> {
    Operation::parse(name)
        .ok_or_else(|| format!("unsupported operation {name:?}, see `opsflow ops`"))
}

fn parse_picker(name: &str) -> Result<Picker, String> {
    Picker::parse(name).ok_or_else(|| {
        let known: Vec<&str> = Picker::ALL.iter().map(|p| p.name()).collect();
        format!("unknown picker {name:?}, expected one of: {}", known.join(", "))
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            operation,
            params,
            param,
            region,
            profile,
        } => {
            let params = load_params(params.as_deref(), &param)?;
            AwsCli::check_installed().await?;
            let mut api = AwsCli::new(region);
            if let Some(profile) = profile {
                api = api.with_profile(profile);
            }
            let report = dispatch(&api, operation, &params).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Ops => {
            for operation in Operation::ALL {
                println!("{operation}");
            }
        }
        Commands::Complete {
            picker,
            query,
            region,
            profile,
        } => {
            let query = query.unwrap_or_default();
            let items = match picker {
                Picker::Regions => autocomplete::regions(&query),
                Picker::InstanceTypes | Picker::Subnets => {
                    let Some(region) = region else {
                        bail!("--region is required for the {picker} picker");
                    };
                    AwsCli::check_installed().await?;
                    let mut api = AwsCli::new(region.clone());
                    if let Some(profile) = profile {
                        api = api.with_profile(profile);
                    }
                    match picker {
                        Picker::InstanceTypes => {
                            autocomplete::instance_types(&api, &region, &query).await?
                        }
                        _ => autocomplete::subnets(&api, &query).await?,
                    }
                }
            };
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }

    Ok(())
}

/// Loads the parameter bag and applies inline overrides on top.
fn load_params(path: Option<&Path>, overrides: &[String]) -> anyhow::Result<Params> {
    let value: Value = match path {
        None => json!({}),
        Some(path) if path == Path::new("-") => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read parameters from stdin")?;
            serde_json::from_str(&input).context("parameters on stdin are not valid JSON")?
        }
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read parameter file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("{} is not valid JSON", path.display()))?
        }
    };

    let mut params = Params::from_value(value)?;
    for entry in overrides {
        let (name, raw) = entry
            .split_once('=')
            .with_context(|| format!("invalid --param {entry:?}, expected key=value"))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        params.insert(name, value);
    }
    Ok(params)
}
