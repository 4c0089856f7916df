use anyhow::{Context, Result};
use clap::Parser;
use stampede_config::{ConfigLoader, LoadTestConfig, LogLevel, RunMode};
use stampede_core::{Form, LoadTest, RunReport, Schedule, TracingSink};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

mod cli;
mod sinks;

use cli::{Cli, Commands, ConfigCommands, RunOptions};
use sinks::JsonLinesSink;

/// Load configuration from file or environment, then apply the CLI log level
fn load_config(config_path: Option<&PathBuf>, log_level: Option<&String>) -> Result<LoadTestConfig> {
    let loader = ConfigLoader::new();

    let mut config = match config_path {
        Some(path) => loader
            .from_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => loader
            .from_env()
            .context("Failed to load configuration from environment")?,
    };

    if let Some(level) = log_level {
        config.logging.level = level.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
    }

    Ok(config)
}

fn load_forms(path: &Path) -> Result<Vec<Form>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read forms from {:?}", path))?;
    let forms: Vec<Form> = serde_json::from_str(&content)
        .with_context(|| format!("Forms file {:?} is not a JSON array of forms", path))?;
    info!("Loaded {} forms from {:?}", forms.len(), path);
    Ok(forms)
}

fn write_summary(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create summary directory")?;
        }
    }
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run summary")?;
    fs::write(path, json).with_context(|| format!("Failed to write summary to {:?}", path))?;
    info!("Summary written to {:?}", path);
    Ok(())
}

/// Apply run flags on top of the loaded configuration
fn apply_run_options(config: &mut LoadTestConfig, options: &RunOptions) {
    if options.dry_run {
        config.cohort.mode = RunMode::Synthetic;
    }
    if let Some(seed) = options.seed {
        config.cohort.seed = Some(seed);
    }
    if let Some(users) = options.users {
        config.cohort.num_users = users;
    }
}

async fn handle_run(mut config: LoadTestConfig, schedule: Schedule, options: &RunOptions) -> Result<()> {
    apply_run_options(&mut config, options);

    let mut test = LoadTest::from_config(config).context("Invalid load test configuration")?;
    if let Some(path) = &options.forms {
        test = test.with_forms(load_forms(path)?);
    }
    test.add_sink(Box::new(TracingSink));
    if let Some(path) = &options.results {
        let sink = JsonLinesSink::create(path)
            .with_context(|| format!("Failed to open results file {:?}", path))?;
        test.add_sink(Box::new(sink));
    }

    let report = test.run(schedule).await?;

    if let Some(path) = &options.summary {
        write_summary(path, &report)?;
    }

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize run summary")?;
    println!("{}", json);
    Ok(())
}

/// Handle configuration validation
fn handle_config_validate(config_file: &PathBuf) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        return Err(anyhow::anyhow!(
            "Configuration file not found: {:?}",
            config_file
        ));
    }

    match load_config(Some(config_file), None) {
        Ok(_config) => {
            println!("✅ Configuration file is valid");
            info!("Configuration validation passed");
            Ok(())
        }
        Err(e) => {
            println!("❌ Configuration validation failed: {:#}", e);
            error!("Configuration validation failed: {:#}", e);
            Err(e)
        }
    }
}

/// Handle sample configuration output
fn handle_config_sample(output: Option<&PathBuf>, force: bool) -> Result<()> {
    let sample = LoadTestConfig::generate_sample();

    let Some(output) = output else {
        print!("{}", sample);
        return Ok(());
    };

    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        ));
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create output directory")?;
        }
    }

    fs::write(output, sample).context("Failed to write configuration file")?;

    println!("✅ Sample configuration generated at: {:?}", output);
    println!("🔧 Validate with: stampede config validate --config-file {:?}", output);
    Ok(())
}

/// Handle configuration display
fn handle_config_show(config: &LoadTestConfig, format: &str) -> Result<()> {
    let rendered = match format.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml::to_string(config).context("Failed to serialize to YAML")?,
        "json" => serde_json::to_string_pretty(config).context("Failed to serialize to JSON")?,
        _ => {
            return Err(anyhow::anyhow!(
                "Unsupported format: {}. Valid formats: yaml, json",
                format
            ))
        }
    };
    println!("{}", rendered);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run { schedule, options } => {
            let config = load_config(cli.config.as_ref(), cli.log_level.as_ref())?;
            stampede_logging::init_logging_from_config(&config.logging)
                .context("Failed to initialize logging")?;
            info!("Stampede CLI starting");
            debug!(schedule = ?schedule, "Run options: {:?}", options);

            handle_run(config, (*schedule).into(), options).await
        }
        Commands::Config { config_cmd } => {
            stampede_logging::init_simple_tracing(cli.log_level.as_deref().unwrap_or("warn"));

            match config_cmd {
                ConfigCommands::Validate { config_file } => handle_config_validate(config_file),
                ConfigCommands::Sample { output, force } => handle_config_sample(output.as_ref(), *force),
                ConfigCommands::Show { format } => {
                    let config = load_config(cli.config.as_ref(), cli.log_level.as_ref())?;
                    handle_config_show(&config, format)
                }
            }
        }
    }
}
