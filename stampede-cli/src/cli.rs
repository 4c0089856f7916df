//! CLI argument parsing definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use stampede_core::Schedule;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Synthetic load generation against an HTTP form service", long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML or JSON)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a load test
    Run {
        /// Scheduling variant
        #[arg(value_enum)]
        schedule: ScheduleArg,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScheduleArg {
    /// `num_users` in batches of `batch_size`
    Batch,
    /// Periodic load shaped by the `time_series` section
    TimeSeries,
    /// One group per level of the `sweep` section
    Sweep,
}

impl From<ScheduleArg> for Schedule {
    fn from(arg: ScheduleArg) -> Self {
        match arg {
            ScheduleArg::Batch => Schedule::Batch,
            ScheduleArg::TimeSeries => Schedule::TimeSeries,
            ScheduleArg::Sweep => Schedule::Sweep,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunOptions {
    /// Skip the network: synthetic latency and model-only outcomes
    #[arg(long)]
    pub dry_run: bool,

    /// Seed for reproducible sampling (overrides the config)
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Override the number of users in a batch run
    #[arg(long, value_name = "N")]
    pub users: Option<usize>,

    /// Write the run summary as JSON
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,

    /// Append every user result as one JSON line
    #[arg(long, value_name = "PATH")]
    pub results: Option<PathBuf>,

    /// JSON array of forms to submit instead of generated ones
    #[arg(long, value_name = "PATH")]
    pub forms: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Print or write a sample configuration
    Sample {
        /// Output file path; stdout when omitted
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration after env overrides
    Show {
        /// Output format: yaml, json
        #[arg(long, value_name = "FORMAT", default_value = "yaml")]
        format: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_options() {
        let cli = Cli::try_parse_from([
            "stampede",
            "--config",
            "load.yaml",
            "run",
            "time-series",
            "--dry-run",
            "--seed",
            "42",
            "--summary",
            "out/summary.json",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("load.yaml")));
        match cli.command {
            Commands::Run { schedule, options } => {
                assert_eq!(schedule, ScheduleArg::TimeSeries);
                assert!(options.dry_run);
                assert_eq!(options.seed, Some(42));
                assert_eq!(options.summary, Some(PathBuf::from("out/summary.json")));
                assert!(options.results.is_none());
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["stampede", "run", "batch", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_unknown_schedule_rejected() {
        assert!(Cli::try_parse_from(["stampede", "run", "ramp"]).is_err());
    }

    #[test]
    fn test_config_sample_to_stdout() {
        let cli = Cli::try_parse_from(["stampede", "config", "sample"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                config_cmd: ConfigCommands::Sample { output: None, force: false }
            }
        ));
    }

    #[test]
    fn test_schedule_conversion() {
        assert_eq!(Schedule::from(ScheduleArg::Sweep), Schedule::Sweep);
    }
}
