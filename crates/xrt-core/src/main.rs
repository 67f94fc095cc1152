//! xrt-core CLI entry point.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::json;
use tracing::error;
use xrt_common::{Error, Result, RunId, StageName};
use xrt_config::{
    list_presets, load_config_file, resolve_config, validate, ConfigError, PipelineConfig,
    PresetName, ResolvedConfig,
};
use xrt_core::exit_codes::ExitCode;
use xrt_core::logging::{init_logging, LogFormat};
use xrt_core::output::{load_duration_dir, render_json, render_pivot, render_ranked, render_run, OutputFormat};
use xrt_core::stats::{summarize_run, StageStats};
use xrt_core::{compare, discover_runs, Metric, Pipeline, RunInput};

#[derive(Parser, Debug)]
#[command(name = "xrt-core")]
#[command(about = "Per-stage timing statistics from XR runtime logs and trace exports")]
#[command(version)]
struct Cli {
    /// Config file (TOML, or JSON by extension)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Replace the configured patterns with a preset's
    #[arg(long, global = true, value_name = "NAME")]
    preset: Option<String>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t)]
    log_format: LogFormat,

    /// Stdout format
    #[arg(long, global = true, value_enum, default_value_t)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Discover runs, write every table, print the ranked comparison
    Run(RunArgs),

    /// Process a single log (and trace) without writing files
    Extract(ExtractArgs),

    /// Compare runs from previously exported duration tables
    Compare(CompareArgs),

    /// Inspect or check configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Input root (overrides config)
    #[arg(long, value_name = "DIR")]
    input: Option<PathBuf>,

    /// Output root (overrides config)
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Admission threshold (overrides config)
    #[arg(long, value_name = "N")]
    threshold: Option<usize>,

    /// Extra trace exclusion substring (repeatable)
    #[arg(long, value_name = "SUBSTR")]
    exclude: Vec<String>,

    /// Ranking metric
    #[arg(long, value_enum, default_value_t)]
    metric: Metric,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Text log to scan
    #[arg(long, value_name = "FILE")]
    log: PathBuf,

    /// Trace export of the same run
    #[arg(long, value_name = "FILE")]
    trace: Option<PathBuf>,

    /// Run id (defaults to the log file stem)
    #[arg(long, value_name = "ID")]
    run: Option<String>,

    /// Admission threshold (overrides config)
    #[arg(long, value_name = "N")]
    threshold: Option<usize>,
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Directory of `<stage>_<run>.csv` duration tables
    #[arg(long, value_name = "DIR")]
    data: PathBuf,

    /// Ranking metric
    #[arg(long, value_enum, default_value_t)]
    metric: Metric,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the resolved configuration
    Show,
    /// Print the configuration JSON Schema
    Schema,
    /// Validate a config file (defaults to the resolved one)
    Validate { path: Option<PathBuf> },
    /// List built-in presets
    Presets,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    let code = match dispatch(&cli) {
        Ok(code) => code,
        Err(err) => {
            error!(code = err.code(), error = %err, "command failed");
            eprintln!("xrt-core: {err}");
            ExitCode::for_error(&err)
        }
    };
    std::process::exit(code.as_i32());
}

fn dispatch(cli: &Cli) -> Result<ExitCode> {
    match &cli.command {
        Commands::Run(args) => cmd_run(cli, args),
        Commands::Extract(args) => cmd_extract(cli, args),
        Commands::Compare(args) => cmd_compare(cli, args),
        Commands::Config { action } => cmd_config(cli, action),
    }
}

/// Resolve the config file and apply the preset, if any.
fn load_config(cli: &Cli) -> Result<ResolvedConfig> {
    let mut resolved = resolve_config(cli.config.as_deref())?;
    if let Some(name) = &cli.preset {
        let preset: PresetName = name.parse()?;
        resolved.config.patterns = xrt_config::get_preset(preset).patterns;
    }
    Ok(resolved)
}

fn revalidate(config: &PipelineConfig) -> Result<()> {
    validate(config).map_err(ConfigError::Invalid)?;
    Ok(())
}

fn outcome_code(has_warnings: bool) -> ExitCode {
    if has_warnings {
        ExitCode::CompletedWithWarnings
    } else {
        ExitCode::Clean
    }
}

fn cmd_run(cli: &Cli, args: &RunArgs) -> Result<ExitCode> {
    let mut config = load_config(cli)?.config;
    if let Some(input) = &args.input {
        config.input_root = input.clone();
    }
    if let Some(output) = &args.output {
        config.output_root = output.clone();
    }
    if let Some(threshold) = args.threshold {
        config.admission_threshold = threshold;
    }
    config.extend_exclusions(args.exclude.iter().cloned());
    revalidate(&config)?;

    let inputs = discover_runs(&config.input_root, &config.layout)?;
    let output_root = config.output_root.clone();
    let pipeline = Pipeline::new(config)?;
    let outcome = pipeline.run_batch(&inputs, Some(&output_root))?;

    match cli.format {
        OutputFormat::Text => {
            print!("{}", render_ranked(&outcome.comparison, args.metric));
            println!(
                "\n{} run(s), {} file(s) written to {}",
                outcome.runs.len(),
                outcome.written.len(),
                output_root.display()
            );
        }
        OutputFormat::Json => {
            let value = json!({
                "summary": outcome.summary(),
                "metric": args.metric,
                "ranked": outcome.comparison.ranked(args.metric),
            });
            println!("{}", render_json(&value)?);
        }
    }
    Ok(outcome_code(outcome.has_warnings()))
}

fn run_id_for(log: &Path, explicit: Option<&str>) -> RunId {
    match explicit {
        Some(id) => RunId::from(id),
        None => log
            .file_stem()
            .and_then(|s| s.to_str())
            .map(RunId::from)
            .unwrap_or_else(RunId::unknown),
    }
}

fn cmd_extract(cli: &Cli, args: &ExtractArgs) -> Result<ExitCode> {
    let mut config = load_config(cli)?.config;
    if let Some(threshold) = args.threshold {
        config.admission_threshold = threshold;
    }
    revalidate(&config)?;

    let input = RunInput::new(
        run_id_for(&args.log, args.run.as_deref()),
        Some(args.log.clone()),
        args.trace.clone(),
    );
    let outcome = Pipeline::new(config)?.process_run(&input);

    match cli.format {
        OutputFormat::Text => {
            print!(
                "{}",
                render_run(&input.run, &outcome.stats, outcome.shares.as_deref())
            );
            for issue in &outcome.report.warnings {
                eprintln!("warning [{}]: {}", issue.code, issue.message);
            }
        }
        OutputFormat::Json => {
            let stats: Vec<&StageStats> = outcome.stats.values().collect();
            let value = json!({
                "report": outcome.report,
                "stats": stats,
                "shares": outcome.shares,
            });
            println!("{}", render_json(&value)?);
        }
    }
    Ok(outcome_code(!outcome.report.warnings.is_empty()))
}

fn cmd_compare(cli: &Cli, args: &CompareArgs) -> Result<ExitCode> {
    let series = load_duration_dir(&args.data)?;
    if series.is_empty() {
        return Err(Error::NoRuns {
            root: args.data.clone(),
        });
    }
    let per_run: BTreeMap<RunId, BTreeMap<StageName, StageStats>> = series
        .iter()
        .map(|(run, stages)| (run.clone(), summarize_run(stages.values())))
        .collect();
    let table = compare(&per_run);
    let pivot = table.pivot(args.metric);

    match cli.format {
        OutputFormat::Text => {
            print!("{}", render_ranked(&table, args.metric));
            println!();
            print!("{}", render_pivot(&pivot));
        }
        OutputFormat::Json => {
            let value = json!({
                "metric": args.metric,
                "ranked": table.ranked(args.metric),
                "pivot": pivot,
            });
            println!("{}", render_json(&value)?);
        }
    }
    Ok(ExitCode::Clean)
}

fn cmd_config(cli: &Cli, action: &ConfigCommand) -> Result<ExitCode> {
    match action {
        ConfigCommand::Show => {
            let resolved = load_config(cli)?;
            match cli.format {
                OutputFormat::Text => {
                    let text = toml::to_string_pretty(&resolved.config)
                        .map_err(|e| Error::Config(e.to_string()))?;
                    println!("# source: {}", resolved.source);
                    print!("{text}");
                }
                OutputFormat::Json => println!("{}", render_json(&resolved.config)?),
            }
        }
        ConfigCommand::Schema => {
            let schema = schemars::schema_for!(PipelineConfig);
            println!("{}", render_json(&schema)?);
        }
        ConfigCommand::Validate { path } => {
            let path = path.as_deref().or(cli.config.as_deref());
            let config = match path {
                Some(path) => load_config_file(path)?,
                None => load_config(cli)?.config,
            };
            if let Err(errors) = validate(&config) {
                for e in &errors {
                    eprintln!("invalid: {e}");
                }
                return Ok(ExitCode::ConfigError);
            }
            println!("valid");
        }
        ConfigCommand::Presets => {
            for preset in list_presets() {
                println!(
                    "{:<12} {:>2} pattern(s)  {}",
                    preset.name.as_str(),
                    preset.pattern_count,
                    preset.description
                );
            }
        }
    }
    Ok(ExitCode::Clean)
}
