use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser};
use ecg_fhir_core::{ConverterConfig, IdentifierSource, MetadataMode, RowPolicy};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "ECG_FHIR_CONFIG";

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert OpenSignals ECG recordings into FHIR Observations", long_about = None)]
struct Cli {
    /// TOML configuration file (falls back to $ECG_FHIR_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit human-readable logs instead of JSON
    #[arg(long)]
    plain_logs: bool,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Args, Debug, Default)]
struct Overrides {
    /// Recording to convert; skips directory discovery
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory searched for the first .txt recording
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Output JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Sampling rate used when header metadata is unavailable (lenient mode)
    #[arg(long)]
    sampling_rate: Option<f64>,

    /// Start time used when header metadata is unavailable, 'YYYY-MM-DD HH:MM:SS.ffffff'
    #[arg(long)]
    start_time: Option<String>,

    /// strict | lenient
    #[arg(long, value_parser = parse_metadata_mode)]
    metadata_mode: Option<MetadataMode>,

    /// position | sequence
    #[arg(long, value_parser = parse_identifier)]
    identifier: Option<IdentifierSource>,

    /// abort | skip
    #[arg(long, value_parser = parse_row_policy)]
    malformed_rows: Option<RowPolicy>,

    /// Header device key to read metadata from
    #[arg(long)]
    device: Option<String>,

    /// Zero-based column holding the signal
    #[arg(long)]
    signal_column: Option<usize>,

    /// Leave the per-record samplingRate field out
    #[arg(long)]
    omit_sampling_rate: bool,
}

impl Overrides {
    fn apply(self, config: &mut ConverterConfig) {
        if let Some(input) = self.input {
            config.input_path = Some(input);
        }
        if let Some(dir) = self.input_dir {
            config.input_dir = dir;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(rate) = self.sampling_rate {
            config.default_sampling_rate = rate;
        }
        if let Some(start) = self.start_time {
            config.fallback_start_time = start;
        }
        if let Some(mode) = self.metadata_mode {
            config.metadata_mode = mode;
        }
        if let Some(identifier) = self.identifier {
            config.identifier = identifier;
        }
        if let Some(policy) = self.malformed_rows {
            config.malformed_rows = policy;
        }
        if let Some(device) = self.device {
            config.device = Some(device);
        }
        if let Some(column) = self.signal_column {
            config.signal_column = column;
        }
        if self.omit_sampling_rate {
            config.include_sampling_rate = false;
        }
    }
}

fn parse_metadata_mode(value: &str) -> Result<MetadataMode, String> {
    MetadataMode::try_from(value)
}

fn parse_identifier(value: &str) -> Result<IdentifierSource, String> {
    IdentifierSource::try_from(value)
}

fn parse_row_policy(value: &str) -> Result<RowPolicy, String> {
    RowPolicy::try_from(value)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.plain_logs);

    if let Err(err) = run(cli) {
        error!("conversion failed: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(plain: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if plain {
        builder.init();
    } else {
        builder.json().init();
    }
}

fn run(cli: Cli) -> Result<()> {
    dotenvy::dotenv().ok();

    let config_path = cli
        .config
        .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

    let mut config = match &config_path {
        Some(path) => ConverterConfig::from_toml_file(path)
            .with_context(|| format!("failed to load configuration from '{}'", path.display()))?,
        None => ConverterConfig::default(),
    };
    cli.overrides.apply(&mut config);

    let report = ecg_fhir_core::run(&config).context("failed to convert recording")?;

    info!(
        input = %report.input.display(),
        output = %report.output.display(),
        observations = report.summary.observations,
        skipped = report.summary.short_rows + report.summary.rejected_rows,
        "conversion complete"
    );
    println!(
        "FHIR observations saved to {} ({} records)",
        report.output.display(),
        report.summary.observations
    );
    Ok(())
}
