use clap::{Parser, Subcommand, ValueEnum};
use fsd_lint::config::{Config, DEFAULT_CONFIG, DEFAULT_CONFIG_FILE};
use fsd_lint::{facts, Analyzer, AnalyzerError, Policy};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Fatal errors (bad config, bad policy, bad facts) exit with 2; lint
/// errors exit with 1.
const EXIT_FATAL: u8 = 2;

#[derive(Parser)]
#[command(
    name = "fsd-lint",
    version,
    about = "Layer and slice boundary linter for Feature-Sliced Design codebases"
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check import facts against the layer policy.
    Check {
        /// JSON file with the extracted import facts.
        facts: PathBuf,

        /// Only run a specific rule (e.g. "public-api" or "FSD002").
        #[arg(long)]
        rule: Option<String>,

        /// Config file path.
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Worker threads (0 = one per CPU). Overrides the config.
        #[arg(long)]
        jobs: Option<usize>,
    },

    /// List all available rules.
    ListRules,

    /// Print the effective layer policy in rank order.
    ListLayers {
        /// Config file path.
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },

    /// Generate a default fsd-lint.toml.
    Init,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Command::Check {
            facts,
            rule,
            config,
            format,
            jobs,
        } => run_check(&facts, &config, rule.as_deref(), format, jobs),
        Command::ListRules => {
            run_list_rules();
            ExitCode::SUCCESS
        }
        Command::ListLayers { config } => run_list_layers(&config),
        Command::Init => run_init(),
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Only the default config file may be absent; an explicit `--config` must exist.
fn load_config(config_path: &Path) -> Result<Config, AnalyzerError> {
    if config_path.exists() || config_path != Path::new(DEFAULT_CONFIG_FILE) {
        Ok(Config::from_file(config_path)?)
    } else {
        tracing::debug!(path = %config_path.display(), "No config file, using defaults");
        Ok(Config::default())
    }
}

fn run_check(
    facts_path: &Path,
    config_path: &Path,
    rule_filter: Option<&str>,
    format: Format,
    jobs: Option<usize>,
) -> ExitCode {
    let result = load_config(config_path).and_then(|config| {
        let mut analyzer = Analyzer::from_config(&config)?.with_rule_filter(rule_filter)?;
        if let Some(jobs) = jobs {
            analyzer = analyzer.with_jobs(jobs);
        }
        let facts = facts::load(facts_path)?;
        analyzer.analyze(&facts)
    });

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error[{}]: {e}", e.code());
            return ExitCode::from(EXIT_FATAL);
        }
    };

    match format {
        Format::Text => report.print_report(),
        Format::Json => match report.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to serialize report: {e}");
                return ExitCode::from(EXIT_FATAL);
            }
        },
    }

    if report.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run_list_rules() {
    eprintln!("Available rules:\n");
    for (name, id, desc) in fsd_lint::rules::ALL_RULES {
        eprintln!("  {name} ({id})");
        eprintln!("    {desc}\n");
    }
}

fn run_list_layers(config_path: &Path) -> ExitCode {
    let policy = match load_config(config_path).and_then(|c| c.policy().map_err(AnalyzerError::from)) {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("error[{}]: {e}", e.code());
            return ExitCode::from(EXIT_FATAL);
        }
    };
    print_layers(&policy);
    ExitCode::SUCCESS
}

fn print_layers(policy: &Policy) {
    for layer in policy.ordered_layers() {
        let kind = if layer.sliced { "sliced" } else { "unsliced" };
        println!(
            "{:>2}  {:<10} {:<9} {}",
            layer.rank,
            layer.name,
            kind,
            policy.public_roots(&layer.name).join(", ")
        );
    }
}

fn run_init() -> ExitCode {
    let path = PathBuf::from(DEFAULT_CONFIG_FILE);
    if path.exists() {
        eprintln!("{DEFAULT_CONFIG_FILE} already exists");
        return ExitCode::FAILURE;
    }

    match std::fs::write(&path, DEFAULT_CONFIG) {
        Ok(()) => {
            eprintln!("Created {DEFAULT_CONFIG_FILE}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to write {DEFAULT_CONFIG_FILE}: {e}");
            ExitCode::FAILURE
        }
    }
}
