//! ReviewFilter - filter automated review comments on pull-request pages
//!
//! Main entry point for the ReviewFilter CLI.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reviewfilter_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use reviewfilter_core::{FileStorage, FilterAction, FilterConfiguration};
use reviewfilter_page_cdp::CdpPageContext;
use reviewfilter_protocols::{DomNode, PageContext, Severity, TabId};
use reviewfilter_runtime::{FilterController, SnapshotPage, StatusMessage};

/// Tab id used for offline runs against a saved snapshot.
const SNAPSHOT_TAB: &str = "snapshot";

/// ReviewFilter CLI.
#[derive(Parser)]
#[command(name = "reviewfilter")]
#[command(about = "Filter automated code-review comments by severity and author")]
#[command(version)]
struct Cli {
    /// Configuration file path (default: ~/.reviewfilter/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Target tab id, as listed by `reviewfilter tabs`
    #[arg(short, long, global = true, env = "REVIEWFILTER_TAB")]
    tab: Option<String>,

    /// Run against a saved `DOM.getDocument` snapshot instead of a live browser
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List open browser tabs
    Tabs,
    /// Count the review bot's comments per severity
    Scan,
    /// Show the filter configuration and what it would hide
    Show {
        /// Print verdicts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reapply the current filters to the page
    Apply,
    /// Show or hide one severity
    Severity {
        #[arg(ignore_case = true)]
        label: SeverityArg,
        state: Toggle,
    },
    /// Show or hide everything, including unlabelled comments
    ShowAll { state: Toggle },
    /// Manage custom bot rules
    Bot {
        #[command(subcommand)]
        action: BotCommands,
    },
    /// Save the current filters as the default for new tabs
    SaveDefault,
    /// Forget the tab's filter session
    Close,
}

#[derive(Subcommand)]
enum BotCommands {
    /// Add or update a bot rule (hidden unless --show)
    Add {
        name: String,
        #[arg(long)]
        show: bool,
    },
    /// Remove a bot rule
    Remove { name: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum SeverityArg {
    Critical,
    Major,
    Minor,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Critical => Severity::Critical,
            SeverityArg::Major => Severity::Major,
            SeverityArg::Minor => Severity::Minor,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn is_on(self) -> bool {
        matches!(self, Toggle::On)
    }
}

/// Initialize tracing: console on stderr, plus daily files in `<data dir>/logs`.
fn init_tracing(logging: &LoggingConfig, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let file_layer = if logging.file {
        let log_dir = data_dir.join("logs");
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("reviewfilter")
            .filename_suffix("log")
            .max_log_files(14)
            .build(&log_dir)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // Keep the writer alive for the program duration.
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .init();

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => ConfigLoader::load(path)?,
        None => ConfigLoader::load_or_default(&ConfigLoader::default_path())?,
    };
    ConfigValidator::validate(&config).into_result()?;
    Ok(config)
}

fn load_snapshot(path: &Path, tab_id: &TabId) -> Result<SnapshotPage, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let raw: serde_json::Value = serde_json::from_str(&content)?;
    // Accept both a bare root node and a full `DOM.getDocument` result.
    let root = raw.get("root").unwrap_or(&raw);
    let document = DomNode::from_value(root)?;
    Ok(SnapshotPage::with_document(tab_id.clone(), document))
}

fn print_config(config: &FilterConfiguration) {
    for severity in Severity::ALL {
        println!(
            "{:<9} {}",
            severity.label(),
            if config.severity_visible(severity) { "shown" } else { "hidden" }
        );
    }
    println!("Show all  {}", if config.show_all() { "on" } else { "off" });
    for (bot, show) in config.custom_bots() {
        println!("Bot       {} ({})", bot, if *show { "shown" } else { "hidden" });
    }
}

fn report(status: StatusMessage) -> ExitCode {
    if status.is_error() {
        eprintln!("{}", status);
        ExitCode::FAILURE
    } else {
        println!("{}", status);
        ExitCode::SUCCESS
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let data_dir = config.storage.resolved_dir();
    init_tracing(&config.logging, &data_dir)?;
    debug!("Using data directory {:?}", data_dir);

    let timeout = Duration::from_secs(config.browser.request_timeout_secs);

    if let Commands::Tabs = cli.command {
        let cdp = CdpPageContext::connect(&config.browser.endpoint, timeout).await?;
        for tab in cdp.list_tabs().await? {
            println!("{}\t{}\t{}", tab.id, tab.title, tab.url);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let (tab_id, page): (TabId, Arc<dyn PageContext>) = match &cli.snapshot {
        Some(path) => {
            let tab_id = TabId::new(cli.tab.as_deref().unwrap_or(SNAPSHOT_TAB));
            let page = load_snapshot(path, &tab_id)?;
            (tab_id, Arc::new(page) as Arc<dyn PageContext>)
        }
        None => {
            let tab = cli
                .tab
                .as_deref()
                .ok_or("missing --tab; run `reviewfilter tabs` to list tab ids")?;
            let page = CdpPageContext::connect(&config.browser.endpoint, timeout).await?;
            (TabId::new(tab), Arc::new(page) as Arc<dyn PageContext>)
        }
    };

    let storage = Arc::new(FileStorage::new(data_dir).await?);
    let mut controller = FilterController::open(storage, page, tab_id).await;
    info!("Filtering tab {}", controller.tab_id());

    let code = match cli.command {
        Commands::Tabs => ExitCode::SUCCESS,
        Commands::Scan => {
            let counts = controller.scan().await?;
            for (severity, count) in counts {
                println!("{:<9} {}", severity.label(), count);
            }
            ExitCode::SUCCESS
        }
        Commands::Show { json } => {
            let preview = controller.preview().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            } else {
                print_config(&controller.config());
                let summary = preview.summary;
                println!(
                    "Would hide {} of {} threads and {} of {} entries",
                    summary.hidden_threads, summary.threads, summary.hidden_entries, summary.entries
                );
            }
            ExitCode::SUCCESS
        }
        Commands::Apply => {
            let report = controller.refresh().await?;
            println!(
                "Hidden {} of {} threads, {} of {} entries",
                report.summary.hidden_threads,
                report.summary.threads,
                report.summary.hidden_entries,
                report.summary.entries
            );
            ExitCode::SUCCESS
        }
        Commands::Severity { label, state } => {
            let severity = Severity::from(label);
            report(controller.set_severity_visibility(severity.label(), state.is_on()).await)
        }
        Commands::ShowAll { state } => {
            report(controller.dispatch(FilterAction::set_show_all(state.is_on())).await)
        }
        Commands::Bot { action } => {
            let action = match action {
                BotCommands::Add { name, show } => FilterAction::set_custom_bot(name, show),
                BotCommands::Remove { name } => FilterAction::remove_custom_bot(name),
            };
            report(controller.dispatch(action).await)
        }
        Commands::SaveDefault => report(controller.save_as_default().await),
        Commands::Close => {
            controller.close().await;
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}
