use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use mashup::{
    CancelToken, Catalog, FfmpegRenderer, PlanExecutor, PlanGenerator, PlanName, Project, Settings,
};
use rand::{SeedableRng as _, rngs::StdRng};
use tracing_subscriber::EnvFilter;

const INTERRUPT_NOTE: &str = "\
The CLI installs no signal handler and never cancels a run itself. Interrupting it kills the
running tool and may leave a partial file under render/; delete that file before running
`execute` again, since existing outputs are treated as finished.";

// Cancellation is a library facility (`CancelToken`). The tokens created below are never
// fired, so an interrupt terminates the process instead of unwinding the run.
#[derive(Parser, Debug)]
#[command(name = "mashup", version, about = "Randomized video compilations", after_help = INTERRUPT_NOTE)]
struct Cli {
    /// Catalog root directory.
    #[arg(long, global = true, default_value = mashup::foundation::settings::DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,

    /// Digest naming the catalog bucket layout.
    #[arg(long, global = true, default_value = mashup::foundation::settings::DEFAULT_CATALOG_ALGORITHM)]
    catalog_algorithm: String,

    /// Directory holding `blend.py` and the blend templates (defaults to the executable's).
    #[arg(long, global = true)]
    tool_dir: Option<PathBuf>,

    /// Raise log verbosity (`-v` info, `-vv` debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register sources from JSON source streams, m3u playlists or media files.
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Generate a random plan graph for each project and publish its root.
    Generate {
        /// Seed for a reproducible graph.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(required = true)]
        projects: Vec<PathBuf>,
    },
    /// Render the published root plan (or a named plan) of each project.
    Execute {
        #[arg(long)]
        plan: Option<String>,
        #[arg(required = true)]
        projects: Vec<PathBuf>,
    },
    /// Render a JSON stream of standalone render jobs.
    RenderStream { file: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = settings(&cli)?;
    match cli.cmd {
        Command::Ingest { paths } => cmd_ingest(&settings, &paths),
        Command::Generate { seed, projects } => cmd_generate(&settings, seed, &projects),
        Command::Execute { plan, projects } => cmd_execute(&settings, plan.as_deref(), &projects),
        Command::RenderStream { file } => cmd_render_stream(&settings, &file),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn settings(cli: &Cli) -> anyhow::Result<Settings> {
    let tool_dir = match &cli.tool_dir {
        Some(dir) => dir.clone(),
        None => Settings::executable_dir()?,
    };
    let mut settings = Settings::default()
        .with_catalog(&cli.catalog, cli.catalog_algorithm.clone())
        .with_tool_dir(tool_dir);
    if let Ok(level) = std::env::var("LOGLEVEL") {
        settings = settings.with_tool_loglevel(level);
    }
    Ok(settings)
}

fn cmd_ingest(settings: &Settings, paths: &[PathBuf]) -> anyhow::Result<()> {
    let catalog = Catalog::open(settings)
        .with_context(|| format!("open catalog '{}'", settings.catalog_path.display()))?;
    let report = mashup::ingest_paths(&catalog, paths);
    eprintln!("ingested {} sources ({} skipped)", report.created, report.skipped);
    Ok(())
}

fn cmd_generate(settings: &Settings, seed: Option<u64>, projects: &[PathBuf]) -> anyhow::Result<()> {
    let catalog = Catalog::open(settings)
        .with_context(|| format!("open catalog '{}'", settings.catalog_path.display()))?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    for path in projects {
        let project =
            Project::open(path).with_context(|| format!("open project '{}'", path.display()))?;
        let report = PlanGenerator::from_project(&project, &catalog, &mut rng)
            .and_then(|mut generator| generator.generate())
            .with_context(|| format!("generate plans for '{}'", path.display()))?;
        eprintln!(
            "{}: root {} ({} plans, {})",
            path.display(),
            report.root,
            report.plans,
            report.total
        );
    }
    Ok(())
}

fn cmd_execute(settings: &Settings, plan: Option<&str>, projects: &[PathBuf]) -> anyhow::Result<()> {
    let catalog = Catalog::open(settings)
        .with_context(|| format!("open catalog '{}'", settings.catalog_path.display()))?;
    let plan = plan.map(PlanName::parse).transpose()?;
    let mut renderer = FfmpegRenderer::new(settings);
    let cancel = CancelToken::new();

    for path in projects {
        let project =
            Project::open(path).with_context(|| format!("open project '{}'", path.display()))?;
        let mut executor = PlanExecutor::new(&project, &catalog, &mut renderer, cancel.clone());
        let result = match &plan {
            Some(name) => executor.execute_by_name(name).map(|()| executor.stats()),
            None => executor.execute_root(),
        };
        let stats = result.with_context(|| format!("execute '{}'", path.display()))?;
        eprintln!(
            "{}: {} rendered, {} already present",
            path.display(),
            stats.rendered,
            stats.skipped
        );
    }
    Ok(())
}

fn cmd_render_stream(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    let mut renderer = FfmpegRenderer::new(settings);
    let report = mashup::render_stream_file(file, &mut renderer, &CancelToken::new())
        .with_context(|| format!("render stream '{}'", file.display()))?;
    eprintln!(
        "{} rendered, {} skipped, {} failed",
        report.rendered, report.skipped, report.failed
    );
    Ok(())
}
