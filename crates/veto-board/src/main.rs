// Veto board entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Load config (copying defaults on first run)
// 3. Initialize tracing (log to file, stdout is for the report)
// 4. Load the map/mode catalog and the series snapshot (or generate one)
// 5. Fold the action log and print the availability report

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use veto_board::config::{self, LoggingConfig};
use veto_board::report::Report;
use veto_core::layout::Catalog;
use veto_core::generate;
use veto_core::series::{self, SeriesFormat};

#[derive(Parser)]
#[command(
    name = "veto-board",
    about = "Show which map/mode combos are still open in a veto draft",
    version
)]
struct Cli {
    /// Series snapshot (JSON body of the series endpoint)
    #[arg(long, required_unless_present = "random", conflicts_with = "random")]
    series: Option<PathBuf>,

    /// Generate a random series of this format (Bo3, Bo5, Bo7) instead of
    /// loading one; requires --catalog
    #[arg(long, value_parser = parse_format, requires = "catalog")]
    random: Option<SeriesFormat>,

    /// Games to pick in a generated series
    #[arg(long, default_value_t = 4)]
    picks: usize,

    /// Seed for the generator (default: random)
    #[arg(long)]
    seed: Option<u64>,

    /// Map/mode catalog (maps, modes and grouped combos)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Base directory holding config/ and defaults/ (default: current directory)
    #[arg(long, env = "VETO_BOARD_ROOT")]
    root: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long, short = 'j')]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    // 1. Parse arguments
    let cli = Cli::parse();
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("failed to resolve current directory")?,
    };

    // 2. Load config
    let config = config::load_config(&root).context("failed to load configuration")?;

    // 3. Initialize tracing
    init_tracing(&root, &config.logging)?;
    info!(
        "Config loaded: slayer_mode_id={}, root={}",
        config.classifier.slayer_mode_id,
        root.display()
    );

    // 4. Load inputs
    let catalog = match &cli.catalog {
        Some(path) => series::load_catalog(path).context("failed to load catalog")?,
        None => {
            warn!("No catalog given; candidate lists will be empty");
            Catalog::default()
        }
    };

    let snapshot = match (&cli.series, cli.random) {
        (Some(path), _) => series::load_snapshot(path).context("failed to load series snapshot")?,
        (None, Some(format)) => {
            let mut rng = match cli.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            generate::random_series(format, &catalog, &config.classifier(), cli.picks, &mut rng)
        }
        (None, None) => bail!("either --series or --random is required"),
    };
    info!(
        "Loaded series {:?} with {} actions",
        snapshot.id,
        snapshot.actions.len()
    );

    // 5. Build and print the report
    let report = Report::build(&snapshot, &catalog, &config.classifier(), &config.report);
    if cli.json {
        let text = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{text}");
    } else {
        print!("{report}");
    }

    Ok(())
}

fn parse_format(raw: &str) -> Result<SeriesFormat, String> {
    SeriesFormat::parse(raw)
        .ok_or_else(|| format!("unknown series format `{raw}` (expected Bo3, Bo5 or Bo7)"))
}

/// Initialize tracing to log to a file under the configured log directory.
fn init_tracing(root: &Path, logging: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = root.join(&logging.dir);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let log_file = std::fs::File::create(log_dir.join("veto-board.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter)),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
