use anyhow::Context;
use clap::{Parser, ValueEnum};
use sensorknn_core::{EstimatorConfig, KnnEstimator, Metric, Weighting, DEFAULT_K};
use sensorknn_stream::{
    load_dataset, LineSource, Lines, ParserConfig, Pipeline, ReaderSource, TimedSource,
    VectorParser, WriterSink,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WeightingKind {
    Inverse,
    Gaussian,
    Uniform,
}

/// Estimate outcomes for streamed sensor readings with k-nearest neighbours
#[derive(Parser, Debug)]
#[command(name = "sensorknn")]
#[command(about = "Streaming kNN estimation for sensor readings", long_about = None)]
struct Args {
    /// Reference dataset (.json or .csv)
    #[arg(short, long)]
    reference: PathBuf,

    /// Read lines from this file or device instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Number of neighbours
    #[arg(short, long, default_value_t = DEFAULT_K)]
    k: usize,

    /// Readings per vector, taken from the end of each line
    #[arg(long, default_value_t = 6)]
    dimension: usize,

    /// Lines must have more fields than this
    #[arg(long, default_value_t = 3)]
    min_fields: usize,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Distance metric: euclidean, manhattan or chebyshev
    #[arg(long, default_value = "euclidean")]
    metric: Metric,

    /// Distance weighting scheme
    #[arg(long, value_enum, default_value_t = WeightingKind::Inverse)]
    weighting: WeightingKind,

    /// Offset added to distances by inverse weighting
    #[arg(long, default_value_t = sensorknn_core::weighting::DEFAULT_EPSILON)]
    epsilon: f64,

    /// Width of the gaussian kernel
    #[arg(long, default_value_t = sensorknn_core::weighting::DEFAULT_SIGMA)]
    sigma: f64,

    /// Seconds to wait for a line before logging a timeout (0 waits forever)
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Decimal places printed per estimate
    #[arg(long, default_value_t = 3)]
    precision: usize,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn estimator_config(&self) -> EstimatorConfig {
        let weighting = match self.weighting {
            WeightingKind::Inverse => Weighting::Inverse {
                epsilon: self.epsilon,
            },
            WeightingKind::Gaussian => Weighting::Gaussian { sigma: self.sigma },
            WeightingKind::Uniform => Weighting::Uniform,
        };

        EstimatorConfig {
            k: self.k,
            metric: self.metric,
            weighting,
        }
    }

    fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            delimiter: self.delimiter,
            min_fields: self.min_fields,
            dimension: self.dimension,
        }
    }
}

fn open_source(input: Option<&PathBuf>, timeout: Duration) -> anyhow::Result<Box<dyn LineSource>> {
    let reader: Box<dyn BufRead + Send> = match input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening input {:?}", path))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    if timeout.is_zero() {
        return Ok(Box::new(ReaderSource::new(reader)));
    }
    Ok(Box::new(TimedSource::spawn(reader, timeout)?))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries estimates only
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting sensorknn v{}", env!("CARGO_PKG_VERSION"));
    info!("Reference dataset: {:?}", args.reference);

    let dataset = load_dataset(&args.reference, args.dimension)
        .with_context(|| format!("loading reference dataset {:?}", args.reference))?;
    if dataset.is_empty() {
        return Err(sensorknn_core::Error::EmptyDataset)
            .with_context(|| format!("no reference items in {:?}", args.reference));
    }

    let config = args.estimator_config();
    info!(
        "k = {}, metric = {}, weighting = {}",
        config.k,
        config.metric,
        config.weighting.name()
    );
    if config.k > dataset.len() {
        warn!(
            "k = {} exceeds the {} reference items; all items will be used",
            config.k,
            dataset.len()
        );
    }

    let estimator = KnnEstimator::new(dataset, config)?;
    let parser = VectorParser::new(args.parser_config())?;
    let mut pipeline = Pipeline::new(parser, estimator)?;

    let source = open_source(args.input.as_ref(), Duration::from_secs(args.timeout_secs))?;
    match &args.input {
        Some(path) => info!("Reading lines from {:?}", path),
        None => info!("Reading lines from stdin"),
    }

    let stdout = io::stdout();
    let mut sink = WriterSink::new(stdout.lock(), args.precision);

    match pipeline.run(Lines::new(source), &mut sink) {
        Ok(stats) => {
            info!(
                "Processed {} lines: {} estimates, {} skipped",
                stats.lines, stats.estimates, stats.skipped
            );
            Ok(())
        }
        Err(e) => {
            error!("Stopping: {}", e);
            Err(e.into())
        }
    }
}
