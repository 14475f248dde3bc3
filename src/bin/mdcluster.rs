//! CLI entry point for the `mdcluster` command-line tool.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use metadata_cluster::cli::commands::{self, LoadOptions};
use metadata_cluster::engine::ClusterConfig;
use metadata_cluster::extract::{ExtractionPolicy, DEFAULT_IDENTITY_FIELD};
use metadata_cluster::metric::DistanceMetric;
use metadata_cluster::types::ClusterError;

#[derive(Parser)]
#[command(
    name = "mdcluster",
    about = "Cluster metadata records with a pluggable distance metric"
)]
struct Cli {
    /// Output format: "text" (default) or "json"
    #[arg(long, default_value = "text")]
    format: String,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// JSON record file or directory of *.json metadata files
    input: PathBuf,
    /// Extraction policy: generic, geo, concept, measurement
    #[arg(long, default_value = "generic")]
    policy: String,
    /// Keep only records with these MIME subtypes (e.g. pdf html)
    #[arg(long, num_args = 1..)]
    accept: Vec<String>,
    /// Attribute used as the record identity
    #[arg(long, default_value = DEFAULT_IDENTITY_FIELD)]
    identity_field: String,
}

#[derive(Args)]
struct EngineArgs {
    /// Metric: euclidean, cosine, edit, jaccard (or 0-3). Defaults to the policy's metric
    #[arg(long)]
    metric: Option<String>,
    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
    /// Additional restarts per k
    #[arg(long)]
    restarts: Option<usize>,
    /// Lloyd iterations per run
    #[arg(long)]
    iterations: Option<usize>,
    /// Smallest candidate k for auto selection
    #[arg(long)]
    k_min: Option<usize>,
    /// Largest candidate k for auto selection
    #[arg(long)]
    k_max: Option<usize>,
    /// Stop a run once assignments stop changing
    #[arg(long)]
    early_stop: bool,
    /// Run restarts on one thread
    #[arg(long)]
    sequential: bool,
    /// Give up after this many milliseconds
    #[arg(long)]
    deadline_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster records and write a hierarchical JSON report
    Cluster {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        engine: EngineArgs,
        /// Fixed number of clusters (omit to choose k automatically)
        #[arg(long)]
        k: Option<usize>,
        /// Report output path
        #[arg(long, default_value = "clusters.json")]
        out: PathBuf,
        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },
    /// Show the best distortion for every candidate k and the elbow choice
    Sweep {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Print the distance between two records
    Distance {
        #[command(flatten)]
        input: InputArgs,
        /// Identity of the first record
        identity_a: String,
        /// Identity of the second record
        identity_b: String,
        /// Metric: euclidean, cosine, edit, jaccard (or 0-3)
        #[arg(long)]
        metric: Option<String>,
    },
    /// Write the default engine configuration as JSON
    InitConfig {
        /// Path of the config file to create
        path: PathBuf,
    },
}

fn load_options(args: InputArgs) -> Result<LoadOptions, ClusterError> {
    let policy = ExtractionPolicy::from_name(&args.policy)
        .ok_or_else(|| ClusterError::UnknownPolicy(args.policy.clone()))?;
    Ok(LoadOptions {
        input: args.input,
        policy,
        accept: args.accept,
        identity_field: args.identity_field,
    })
}

fn parse_metric(name: &str) -> Result<DistanceMetric, ClusterError> {
    DistanceMetric::from_name(name).ok_or_else(|| ClusterError::UnknownMetric(name.to_string()))
}

fn engine_config(
    args: EngineArgs,
    policy: &ExtractionPolicy,
    k: Option<usize>,
) -> Result<ClusterConfig, ClusterError> {
    let mut config = match &args.config {
        Some(path) => ClusterConfig::from_file(path)?,
        None => ClusterConfig::default().with_metric(policy.preferred_metric()),
    };
    if let Some(name) = &args.metric {
        config.metric = parse_metric(name)?;
    }
    if k.is_some() {
        config.k = k;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(restarts) = args.restarts {
        config.restarts = restarts;
    }
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(k_min) = args.k_min {
        config.k_min = k_min;
    }
    if let Some(k_max) = args.k_max {
        config.k_max = k_max;
    }
    if args.early_stop {
        config.early_stop = true;
    }
    if args.sequential {
        config.parallel = false;
    }
    if let Some(deadline_ms) = args.deadline_ms {
        config.deadline_ms = Some(deadline_ms);
    }
    Ok(config)
}

fn run(command: Commands, json: bool) -> Result<(), ClusterError> {
    match command {
        Commands::Cluster {
            input,
            engine,
            k,
            out,
            pretty,
        } => {
            let options = load_options(input)?;
            let config = engine_config(engine, &options.policy, k)?;
            commands::cmd_cluster(&options, config, &out, pretty, json)
        }
        Commands::Sweep { input, engine } => {
            let options = load_options(input)?;
            let config = engine_config(engine, &options.policy, None)?;
            commands::cmd_sweep(&options, config, json)
        }
        Commands::Distance {
            input,
            identity_a,
            identity_b,
            metric,
        } => {
            let options = load_options(input)?;
            let metric = match metric {
                Some(name) => parse_metric(&name)?,
                None => options.policy.preferred_metric(),
            };
            commands::cmd_distance(&options, metric, &identity_a, &identity_b, json)
        }
        Commands::InitConfig { path } => commands::cmd_init_config(&path),
    }
}

fn main() {
    let cli = Cli::parse();
    let json = cli.format == "json";

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    if let Err(e) = run(cli.command, json) {
        eprintln!("Error: {}", e);
        let code = match &e {
            ClusterError::Io(_) => 1,
            ClusterError::Json(_)
            | ClusterError::InvalidRecordFile(_)
            | ClusterError::MissingAttribute { .. }
            | ClusterError::InvalidAttribute { .. } => 2,
            ClusterError::UnknownMetric(_)
            | ClusterError::UnknownPolicy(_)
            | ClusterError::RecordNotFound(_) => 3,
            ClusterError::EmptyInput
            | ClusterError::InvalidK { .. }
            | ClusterError::KRangeTooSmall { .. }
            | ClusterError::DuplicateIdentity(_)
            | ClusterError::NonFiniteFeature { .. } => 4,
            _ => 5,
        };
        process::exit(code);
    }
}
