use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use encyclodiff_core::formatters::{convert_saved_results_to_json, result_to_json};
use encyclodiff_core::{
    ComparatorConfig, ComparisonPipeline, ComparisonResult, FetchConfig, Fetcher, GrokipediaSource, PageComparator,
    PageSource, ReportWriter, SamplingConfig, TextReportFormatter, TopicRequest, TopicSampler, WikipediaSource,
    fetch_file, fetch_stdin, most_different, most_similar,
};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

mod echo;

use echo::{
    format_size, print_banner, print_comparison, print_detail, print_header, print_info, print_step, print_success,
    print_timing, print_warning,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_OUTPUT: &str = "data/processed/comparison_results.json";
const DEFAULT_REPORT_DIR: &str = "data/reports";

/// Output format for a single comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: text, json", s)),
        }
    }
}

/// Compare Grokipedia and Wikipedia pages on the same topics
#[derive(Parser, Debug)]
#[command(name = "encyclodiff")]
#[command(author = "Encyclodiff Contributors")]
#[command(version)]
#[command(about = "Compare encyclopedia pages across sources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and compare a batch of topics, then write reports
    Run(RunArgs),
    /// Compare two local HTML files without touching the network
    Compare(CompareArgs),
    /// Print or export the topic sample plan
    Plan(PlanArgs),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct SamplingArgs {
    /// Sampling configuration file (default: ./config/sampling.json)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the random seed from the configuration
    #[arg(long, value_name = "N")]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Number of topics to sample
    #[arg(short = 'n', long, default_value = "10", value_name = "N")]
    num_topics: usize,

    /// Compare these topics instead of sampling
    #[arg(short, long = "topic", value_name = "TOPIC", num_args = 1..)]
    topics: Vec<String>,

    #[command(flatten)]
    sampling: SamplingArgs,

    /// Where to save the compact JSON results
    #[arg(short, long, default_value = DEFAULT_OUTPUT, value_name = "FILE")]
    output: PathBuf,

    /// Directory for text reports and the JSON export
    #[arg(long, default_value = DEFAULT_REPORT_DIR, value_name = "DIR")]
    report_dir: PathBuf,

    /// Skip report generation
    #[arg(long)]
    no_reports: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Attempts per URL before a topic is skipped
    #[arg(long, default_value = "3", value_name = "N")]
    max_retries: u32,

    /// Minimum delay between requests in milliseconds
    #[arg(long, default_value = "2000", value_name = "MS")]
    rate_limit: u64,

    /// Time allowed for aligning long texts in milliseconds (default: 1000, 0 disables)
    #[arg(long, value_name = "MS")]
    diff_deadline: Option<u64>,
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Page A (Grokipedia) HTML file, or "-" for stdin
    #[arg(value_name = "A")]
    page_a: String,

    /// Page B (Wikipedia) HTML file
    #[arg(value_name = "B")]
    page_b: PathBuf,

    /// Topic name to use instead of the title found in page A
    #[arg(long, value_name = "TOPIC")]
    topic: Option<String>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Time allowed for aligning long texts in milliseconds (default: 1000, 0 disables)
    #[arg(long, value_name = "MS")]
    diff_deadline: Option<u64>,
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Total sample size (default: from the configuration)
    #[arg(short = 'n', long, value_name = "N")]
    num_topics: Option<usize>,

    #[command(flatten)]
    sampling: SamplingArgs,

    /// Write the plan to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}

fn comparator(diff_deadline: Option<u64>) -> PageComparator {
    let mut builder = ComparatorConfig::builder();
    match diff_deadline {
        Some(0) => builder = builder.no_diff_deadline(),
        Some(ms) => builder = builder.diff_deadline(Duration::from_millis(ms)),
        None => {}
    }
    PageComparator::with_config(builder.build())
}

fn load_sampler(args: &SamplingArgs) -> anyhow::Result<TopicSampler> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => SamplingConfig::default_path()
            .context("No sampling configuration found; pass --config or create config/sampling.json")?,
    };

    let mut config =
        SamplingConfig::load(&path).with_context(|| format!("Failed to load sampling config: {}", path.display()))?;
    if let Some(seed) = args.seed {
        config.sampling.random_seed = seed;
    }
    tracing::debug!(path = %path.display(), seed = config.sampling.random_seed, "loaded sampling config");

    Ok(TopicSampler::seeded(config))
}

fn write_output(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))
}

async fn run(args: RunArgs, verbose: bool) -> anyhow::Result<()> {
    let started = Instant::now();

    if verbose {
        print_step(1, 4, "Selecting topics");
    }

    let topics: Vec<TopicRequest> = if args.topics.is_empty() {
        let mut sampler = load_sampler(&args.sampling)?;
        sampler.all_topics_flat(Some(args.num_topics)).into_iter().map(TopicRequest::from).collect()
    } else {
        args.topics.iter().map(TopicRequest::new).collect()
    };

    if topics.is_empty() {
        bail!("No topics to compare");
    }
    print_info(&format!("Comparing {} topics", topics.len()));

    if verbose {
        print_step(2, 4, "Fetching and comparing pages");
    }

    let fetch_config = FetchConfig {
        timeout: args.timeout,
        user_agent: args.user_agent.unwrap_or_else(|| FetchConfig::default().user_agent),
        max_retries: args.max_retries,
        rate_limit_delay: Duration::from_millis(args.rate_limit),
    };
    let fetcher = Fetcher::new(fetch_config).context("Failed to build HTTP client")?;
    let pipeline = ComparisonPipeline::new(fetcher).with_comparator(comparator(args.diff_deadline));

    let bar = ProgressBar::new(topics.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("=> "),
    );

    let results = pipeline
        .run(&topics, |progress| {
            bar.set_message(progress.request.topic.clone());
            bar.inc(1);
        })
        .await;
    bar.finish_and_clear();

    if results.is_empty() {
        print_warning("No topics could be compared");
        return Ok(());
    }
    let skipped = topics.len() - results.len();
    if skipped > 0 {
        print_warning(&format!("Skipped {} topics that could not be fetched", skipped));
    }

    if verbose {
        print_header("Results");
        results.iter().for_each(print_comparison);
        eprintln!();
        print_step(3, 4, "Saving results");
    }

    let json = convert_saved_results_to_json(&results, true).context("Failed to serialize results")?;
    write_output(&args.output, &json)?;
    print_success(&format!("Saved {} results to {}", results.len(), args.output.display().bright_white()));

    if !args.no_reports {
        if verbose {
            print_step(4, 4, "Writing reports");
        }
        write_reports(&results, &args.report_dir)?;
    }

    if verbose {
        print_timing("Total", started.elapsed());
    }

    Ok(())
}

fn write_reports(results: &[ComparisonResult], dir: &Path) -> anyhow::Result<()> {
    let writer =
        ReportWriter::new(dir).with_context(|| format!("Failed to create report directory: {}", dir.display()))?;

    let summary = writer.write_summary(results).context("Failed to write summary report")?;
    print_detail("Summary", &summary.display().to_string());

    for result in [most_similar(results), most_different(results)].into_iter().flatten() {
        let path = writer.write_detailed(result).context("Failed to write detailed report")?;
        print_detail("Detailed", &path.display().to_string());
    }

    let export = writer.write_json_export(results).context("Failed to write JSON export")?;
    print_detail("Export", &export.display().to_string());

    print_success(&format!("Reports written to {}", dir.display().bright_white()));
    Ok(())
}

fn compare(args: CompareArgs, verbose: bool) -> anyhow::Result<()> {
    if verbose {
        print_step(1, 3, "Reading pages");
    }

    let html_a = if args.page_a == "-" {
        fetch_stdin().context("Failed to read from stdin")?
    } else {
        fetch_file(&args.page_a).with_context(|| format!("Failed to read file: {}", args.page_a))?
    };
    let html_b = fetch_file(&args.page_b).with_context(|| format!("Failed to read file: {}", args.page_b.display()))?;

    if verbose {
        print_detail("A", &format_size(html_a.len()));
        print_detail("B", &format_size(html_b.len()));
        print_step(2, 3, "Comparing pages");
    }

    let mut page_a = GrokipediaSource::new().parse(&html_a, &args.page_a);
    let page_b = WikipediaSource::new().parse(&html_b, &args.page_b.to_string_lossy());
    if let Some(topic) = args.topic {
        page_a.title = topic;
    }

    let result = comparator(args.diff_deadline).compare(&page_a, &page_b);

    if verbose {
        print_comparison(&result);
        print_step(3, 3, "Writing output");
    }

    let output = match args.format {
        OutputFormat::Text => TextReportFormatter::default().detailed_report(&result),
        OutputFormat::Json => result_to_json(&result, true).context("Failed to serialize comparison")?,
    };

    match args.output {
        Some(path) => {
            write_output(&path, &output)?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => println!("{}", output),
    }

    Ok(())
}

fn plan(args: PlanArgs) -> anyhow::Result<()> {
    let mut sampler = load_sampler(&args.sampling)?;

    match args.output {
        Some(path) => {
            sampler
                .export_sample_plan(&path, args.num_topics)
                .with_context(|| format!("Failed to write sample plan: {}", path.display()))?;
            print_success(&format!("Sample plan written to {}", path.display().bright_white()));
        }
        None => print!("{}", sampler.render_sample_plan(args.num_topics)),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    match cli.command {
        Command::Run(args) => run(args, cli.verbose).await,
        Command::Compare(args) => compare(args, cli.verbose),
        Command::Plan(args) => plan(args),
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "encyclodiff", &mut io::stdout());
            Ok(())
        }
    }
}
