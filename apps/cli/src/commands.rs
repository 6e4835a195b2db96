//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use oaspages_cache::FsCache;
use oaspages_core::{
    BuildContext, BuildUtils, PostBuildSummary, PreBuildOutcome, ProgressReporter, ShellRunner,
    on_post_build, on_pre_build, on_success,
};
use oaspages_shared::{AppConfig, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// oaspages: render OpenAPI reference pages during a static-site build.
#[derive(Parser)]
#[command(
    name = "oaspages",
    version,
    about = "Install redoc, render OpenAPI pages from a site bundle, and cache the tool between builds.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to oaspages.toml in the working directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Build working directory (defaults to the current directory).
    #[arg(long, global = true)]
    pub workdir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Restore redoc from the tool cache, or install and cache it.
    PreBuild,

    /// Render every OpenAPI page listed in the build bundle.
    PostBuild {
        /// Public URL of the deployed site.
        #[arg(long, env = "DEPLOY_PRIME_URL", default_value = "")]
        site_url: String,
    },

    /// Save the tool cache if the build left it empty.
    OnSuccess,

    /// Tool cache maintenance.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Cache subcommands.
#[derive(Subcommand)]
pub(crate) enum CacheAction {
    /// List cached entries.
    List,
    /// Remove a cached entry.
    Remove {
        /// Cache key (e.g. `redoc`).
        key: String,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "oaspages=info",
        1 => "oaspages=debug",
        _ => "oaspages=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let workdir = resolve_workdir(cli.workdir.as_deref())?;
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::PreBuild => cmd_pre_build(workdir, config_path).await,
        Command::PostBuild { site_url } => cmd_post_build(workdir, config_path, &site_url).await,
        Command::OnSuccess => cmd_on_success(workdir, config_path).await,
        Command::Cache { action } => match action {
            CacheAction::List => cmd_cache_list(workdir, config_path).await,
            CacheAction::Remove { key } => cmd_cache_remove(workdir, config_path, &key).await,
        },
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(&workdir),
            ConfigAction::Show => cmd_config_show(&workdir, config_path),
        },
    }
}

fn resolve_workdir(workdir: Option<&Path>) -> Result<PathBuf> {
    let cwd =
        std::env::current_dir().map_err(|e| eyre!("cannot determine working directory: {e}"))?;
    Ok(match workdir {
        Some(dir) => cwd.join(dir),
        None => cwd,
    })
}

fn resolve_config(workdir: &Path, config_path: Option<&Path>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config(workdir)?,
    };
    Ok(config)
}

async fn open_cache(workdir: &Path, config: &AppConfig) -> Result<FsCache> {
    let root = config.cache.resolve_dir()?;
    Ok(FsCache::open(&root, workdir).await?)
}

/// Context, runner, and cache for one hook invocation.
struct Host {
    ctx: BuildContext,
    runner: ShellRunner,
    cache: FsCache,
}

impl Host {
    async fn open(workdir: PathBuf, config_path: Option<&Path>) -> Result<Self> {
        let config = resolve_config(&workdir, config_path)?;
        let cache = open_cache(&workdir, &config).await?;
        let runner = ShellRunner::new(&workdir);
        Ok(Self {
            ctx: BuildContext::new(workdir, config),
            runner,
            cache,
        })
    }

    fn utils(&self) -> BuildUtils<'_> {
        BuildUtils {
            run: &self.runner,
            cache: &self.cache,
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle hooks
// ---------------------------------------------------------------------------

async fn cmd_pre_build(workdir: PathBuf, config_path: Option<&Path>) -> Result<()> {
    let host = Host::open(workdir, config_path).await?;
    info!(workdir = %host.ctx.workdir.display(), "running pre-build hook");

    let outcome = on_pre_build(&host.ctx, host.utils()).await?;
    match outcome {
        PreBuildOutcome::Restored => println!("redoc restored from cache"),
        PreBuildOutcome::Installed => println!(
            "redoc {} installed at {}",
            host.ctx.config.redoc.version,
            host.ctx.install_dir().display()
        ),
    }
    Ok(())
}

async fn cmd_post_build(workdir: PathBuf, config_path: Option<&Path>, site_url: &str) -> Result<()> {
    let host = Host::open(workdir, config_path).await?;
    info!(workdir = %host.ctx.workdir.display(), site_url, "running post-build hook");

    let reporter = CliProgress::new();
    let summary = on_post_build(&host.ctx, site_url, host.utils(), &reporter).await?;

    println!();
    println!("  OpenAPI pages:  {}", summary.pages_total);
    println!("  Rendered:       {}", summary.pages_rendered);
    println!("  Skipped:        {}", summary.skipped.len());
    for slug in &summary.skipped {
        println!("    - {slug}");
    }
    println!("  Time:           {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_on_success(workdir: PathBuf, config_path: Option<&Path>) -> Result<()> {
    let host = Host::open(workdir, config_path).await?;
    if on_success(&host.ctx, host.utils()).await? {
        println!("tool cache saved");
    } else {
        println!("tool cache unchanged");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
///
/// The spinner is cleared while an external command runs, so redoc's own
/// output gets the terminal to itself, and redrawn once the command exits.
struct CliProgress {
    spinner: Mutex<ProgressBar>,
}

impl CliProgress {
    fn new() -> Self {
        Self {
            spinner: Mutex::new(new_spinner()),
        }
    }

    fn bar(&self) -> MutexGuard<'_, ProgressBar> {
        self.spinner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn new_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(
            style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
    }
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.bar().set_message(name.to_string());
    }

    fn page_started(&self, slug: &str, current: usize, total: usize) {
        self.bar()
            .set_message(format!("Rendering [{current}/{total}] {slug}"));
    }

    fn command_started(&self, _command: &str) {
        self.bar().finish_and_clear();
    }

    fn command_finished(&self) {
        let mut bar = self.bar();
        let message = bar.message();
        *bar = new_spinner();
        bar.set_message(message);
    }

    fn done(&self, _summary: &PostBuildSummary) {
        self.bar().finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        let bar = self.bar();
        if !bar.is_finished() {
            bar.finish_and_clear();
        }
    }
}

// ---------------------------------------------------------------------------
// Cache and config maintenance
// ---------------------------------------------------------------------------

async fn cmd_cache_list(workdir: PathBuf, config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(&workdir, config_path)?;
    let cache = open_cache(&workdir, &config).await?;
    let entries = cache.list().await?;

    if entries.is_empty() {
        println!("no cached entries in {}", cache.root().display());
        return Ok(());
    }

    for entry in entries {
        let digest = entry.digest.get(..12).unwrap_or(entry.digest.as_str());
        println!(
            "{:<16} {:>6} files {:>12} bytes  {}  {digest}",
            entry.key,
            entry.file_count,
            entry.size_bytes,
            entry.cached_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );
    }
    Ok(())
}

async fn cmd_cache_remove(workdir: PathBuf, config_path: Option<&Path>, key: &str) -> Result<()> {
    let config = resolve_config(&workdir, config_path)?;
    let cache = open_cache(&workdir, &config).await?;

    if cache.remove(key).await? {
        println!("removed '{key}' from the tool cache");
    } else {
        println!("'{key}' is not cached");
    }
    Ok(())
}

fn cmd_config_init(workdir: &Path) -> Result<()> {
    let path = init_config(workdir)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(workdir: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(workdir, config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
