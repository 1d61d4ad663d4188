//! Sort a vector of reals under homomorphic encryption.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use eyre::{Context, bail, eyre};
use fhe_core::{FheEngine, PlainEngine, SecurityProfile};
use fhe_sort::{
    ComparisonNetworkSorter, NetworkParams, PermutationParams, RankPermutationSorter, SortReport,
    input, permutation, report,
};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Prefix for config env variables
const CONFIG_ENV_PREFIX: &str = "FHE_SORT_";

fn install_tracing(verbose: bool) {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let fmt_layer = fmt::layer().with_target(false).with_line_number(false);
    let default_filter = if verbose { "debug" } else { "info" };
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .expect("can build env filter");

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

/// The sorting circuit to evaluate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum SortMode {
    /// Bitonic comparison network on an n-slot ciphertext.
    Network,
    /// Rank/permutation sorting on an n²-slot ciphertext.
    Permutation,
}

/// Cli arguments
#[derive(Debug, Serialize, Parser)]
#[command(about = "Sort a vector of reals under homomorphic encryption")]
struct Cli {
    /// The path to the config file
    #[arg(long)]
    #[serde(skip_serializing_if = "::std::option::Option::is_none")]
    config: Option<PathBuf>,
    /// Generate this many random values (must be a power of two)
    #[arg(long, group = "source")]
    #[serde(skip_serializing_if = "::std::option::Option::is_none")]
    random: Option<usize>,
    /// Read whitespace/comma-separated values from a file
    #[arg(long, group = "source")]
    #[serde(skip_serializing_if = "::std::option::Option::is_none")]
    file: Option<PathBuf>,
    /// An inline vector, e.g. "[1.2, 3.4, 2.1, 4.0]"
    #[arg(long, group = "source")]
    #[serde(skip_serializing_if = "::std::option::Option::is_none")]
    inline: Option<String>,
    /// The sorting circuit to evaluate
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "::std::option::Option::is_none")]
    mode: Option<SortMode>,
    /// Use reduced-security toy parameters for fast iteration
    #[arg(long)]
    #[serde(skip_serializing_if = "::std::ops::Not::not")]
    toy: bool,
    /// Enable per-layer tracing output
    #[arg(long)]
    #[serde(skip_serializing_if = "::std::ops::Not::not")]
    verbose: bool,
    /// Apply the stable tie-break offset (permutation mode)
    #[arg(long)]
    #[serde(skip_serializing_if = "::std::ops::Not::not")]
    tie_offset: bool,
    /// Override the minimum distinguishable gap δ
    #[arg(long)]
    #[serde(skip_serializing_if = "::std::option::Option::is_none")]
    delta: Option<f64>,
    /// Override the ReLU approximation degree (network mode)
    #[arg(long)]
    #[serde(skip_serializing_if = "::std::option::Option::is_none")]
    relu_degree: Option<usize>,
    /// Override the step-sigmoid approximation degree (permutation mode)
    #[arg(long)]
    #[serde(skip_serializing_if = "::std::option::Option::is_none")]
    sigmoid_degree: Option<usize>,
    /// Override the one-hot sinc approximation degree (permutation mode)
    #[arg(long)]
    #[serde(skip_serializing_if = "::std::option::Option::is_none")]
    sinc_degree: Option<usize>,
}

/// The immutable run configuration, merged from config file, environment
/// and command line.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    random: Option<usize>,
    file: Option<PathBuf>,
    inline: Option<String>,
    mode: Option<SortMode>,
    toy: bool,
    verbose: bool,
    tie_offset: bool,
    delta: Option<f64>,
    relu_degree: Option<usize>,
    sigmoid_degree: Option<usize>,
    sinc_degree: Option<usize>,
}

impl Config {
    /// Parse config from file, env, cli
    fn parse(cli: Cli) -> color_eyre::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = &cli.config {
            figment = figment.merge(Toml::file(path));
        }
        Ok(figment
            .merge(Env::prefixed(CONFIG_ENV_PREFIX))
            .merge(Serialized::defaults(cli))
            .extract()
            .context("while merging run configuration")?)
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let config = Config::parse(cli)?;
    install_tracing(config.verbose);
    run(&config)
}

fn run(config: &Config) -> color_eyre::Result<()> {
    let values = load_values(config)?;
    input::validate_length(values.len())?;
    let n = values.len();
    let delta = config.delta.unwrap_or_else(|| input::min_gap(&values));
    let mode = config
        .mode
        .ok_or_else(|| eyre!("no sorting mode chosen; pass --mode network or --mode permutation"))?;
    let profile = if config.toy {
        SecurityProfile::Toy
    } else {
        SecurityProfile::Secure128
    };

    tracing::info!(n, delta, ?mode, "sorting {n} encrypted values");

    let start = Instant::now();
    let (obtained, precision_digits) = match mode {
        SortMode::Network => run_network(config, &values, delta, profile)?,
        SortMode::Permutation => run_permutation(config, &values, delta, profile)?,
    };
    tracing::info!(elapsed = ?start.elapsed(), "sorting finished");

    let report = SortReport::evaluate(&values, &obtained, delta);
    let prec = precision_digits + 1;
    tracing::info!("expected: {:.prec$?}", report.expected);
    tracing::info!("obtained: {:.prec$?}", report.obtained);
    tracing::info!(
        corrects = report.corrects,
        total = n,
        delta,
        "positions within δ"
    );
    tracing::info!(
        infinity_norm = report.infinity_norm,
        precision_bits = report.precision_bits,
        "achieved precision"
    );
    Ok(())
}

fn load_values(config: &Config) -> color_eyre::Result<Vec<f64>> {
    if let Some(count) = config.random {
        let spacing = config.delta.unwrap_or(input::DEFAULT_DELTA);
        let mut rng = rand::thread_rng();
        Ok(input::generate_spaced(count, spacing, &mut rng))
    } else if let Some(path) = &config.file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("while reading {}", path.display()))?;
        Ok(input::parse_vector(&text)?)
    } else if let Some(text) = &config.inline {
        Ok(input::parse_vector(text)?)
    } else {
        bail!("no input given; pass --random, --file or --inline");
    }
}

fn run_network(
    config: &Config,
    values: &[f64],
    delta: f64,
    profile: SecurityProfile,
) -> color_eyre::Result<(Vec<f64>, usize)> {
    let mut params = NetworkParams::select(delta)?;
    if let Some(degree) = config.relu_degree {
        params.relu_degree = degree;
    }
    let pass_levels = params.layer_depth()?;
    let engine = PlainEngine::setup_with_bootstrap(values.len(), pass_levels, profile);

    let scaled: Vec<f64> = values.iter().map(|v| v * params.input_scale).collect();
    let input_ct = engine.encrypt(&scaled, engine.refresh_level());

    let sorter = ComparisonNetworkSorter::new(&engine, params.clone());
    let sorted = sorter.sort(&input_ct).context("while evaluating the network")?;

    let obtained = engine
        .decrypt(&sorted)
        .into_iter()
        .map(|v| v / params.input_scale)
        .collect();
    Ok((obtained, params.precision_digits))
}

fn run_permutation(
    config: &Config,
    values: &[f64],
    delta: f64,
    profile: SecurityProfile,
) -> color_eyre::Result<(Vec<f64>, usize)> {
    let n = values.len();
    let mut params = PermutationParams::select(delta, n, config.tie_offset)?;
    if let Some(degree) = config.sigmoid_degree {
        params.sigmoid_degree = degree;
    }
    if let Some(degree) = config.sinc_degree {
        params.sinc_degree = degree;
    }
    let engine = PlainEngine::setup(n * n, params.context_depth()?, profile);

    let expanded = engine.encrypt(&permutation::expanded_layout(values), 0);
    let tiled = engine.encrypt(&permutation::tiled_layout(values), 0);

    let sorter = RankPermutationSorter::new(&engine, params.clone());
    let sorted = sorter
        .sort(&expanded, &tiled)
        .context("while evaluating the permutation circuit")?;

    let obtained = report::strided(&engine.decrypt(&sorted), n);
    Ok((obtained, params.precision_digits))
}
