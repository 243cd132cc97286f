//! command-library - search the command catalog from a terminal.
//!
//! ```bash
//! command-library search "dockr" -c Docker
//! command-library layout --width 1200 --height 900
//! command-library categories
//! command-library listen < events.jsonl
//! ```

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use command_library::catalog::{
    category_counts, default_corpus, filter_by_categories, load_catalog_file, toggle_category,
    Corpus,
};
use command_library::config::{load_config, Config};
use command_library::debounce::DebouncedSender;
use command_library::error::{severity_of, ErrorSeverity, ResultExt};
use command_library::grid::layout;
use command_library::logging;
use command_library::search::{mark, rank, FieldKey, RankOptions};
use command_library::session::{SearchSession, SessionEvent, Viewport};
use command_library::stdin_events::{start_stdin_listener, HostEvent};

#[derive(Debug, Parser)]
#[command(
    name = "command-library",
    version,
    about = "Fuzzy search over a catalog of terminal commands"
)]
struct Cli {
    /// Catalog JSON file (default: built-in catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Config file (default: ~/.command-library/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rank catalog records against a query
    Search(SearchArgs),
    /// Show grid geometry for a viewport
    Layout(LayoutArgs),
    /// List category chips with record counts
    Categories,
    /// Drive a search session from JSONL events on stdin
    Listen,
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Query text; typos are tolerated
    query: String,

    /// Restrict to records tagged with any of these categories
    #[arg(short = 'c', long = "category")]
    categories: Vec<String>,

    /// Maximum results (default: search.topK from config)
    #[arg(long)]
    top_k: Option<usize>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct LayoutArgs {
    /// Viewport width in pixels
    #[arg(long, allow_negative_numbers = true)]
    width: f64,

    /// Window height, to report the grid viewport height
    #[arg(long)]
    height: Option<f64>,

    /// Item count (default: catalog size)
    #[arg(long)]
    items: Option<usize>,
}

fn main() -> Result<()> {
    let _guard = logging::init();
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = &result {
        match severity_of(e) {
            ErrorSeverity::Warning => warn!(error = %format!("{:#}", e), "Check the input file"),
            ErrorSeverity::Error => logging::log_error("COMMAND", &format!("{:#}", e), None),
        }
    }
    result
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref());
    config.validate().context("Invalid configuration")?;
    let corpus = load_corpus(cli.catalog.as_ref())?;
    info!(records = corpus.len(), command = ?cli.command, "Starting");

    match cli.command {
        Commands::Search(args) => search(&corpus, &config, args),
        Commands::Layout(args) => show_layout(&corpus, &config, args),
        Commands::Categories => list_categories(&corpus, &config),
        Commands::Listen => listen(corpus, &config),
    }
}

fn load_corpus(path: Option<&PathBuf>) -> Result<Corpus> {
    match path {
        Some(path) => load_catalog_file(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display())),
        None => default_corpus().context("Built-in catalog is malformed"),
    }
}

fn search(corpus: &Corpus, config: &Config, args: SearchArgs) -> Result<()> {
    let options = RankOptions::new(
        config.search.keys.clone(),
        config.search.match_options(),
        args.top_k.unwrap_or(config.search.top_k),
    )
    .context("Invalid search options")?;

    let selected: BTreeSet<String> = args.categories.into_iter().collect();
    let candidates = filter_by_categories(corpus.records(), &selected);
    let results = rank(&candidates, &args.query, &options);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.json {
        serde_json::to_writer_pretty(&mut out, &results)?;
        writeln!(out)?;
        return Ok(());
    }

    for result in &results {
        let record = &result.record;
        writeln!(
            out,
            "{:.3}  {:<10} {}",
            result.score,
            record.kind().label(),
            mark(&record.name, result.spans(FieldKey::Name), "[", "]")
        )?;
        writeln!(
            out,
            "       {}",
            mark(&record.description, result.spans(FieldKey::Description), "[", "]")
        )?;
        let tags: Vec<String> = record
            .tags
            .iter()
            .enumerate()
            .map(|(i, tag)| mark(tag, result.spans(FieldKey::Tag(i)), "[", "]"))
            .collect();
        writeln!(out, "       tags: {}", tags.join(", "))?;
    }
    writeln!(out, "Showing {} of {} commands", results.len(), corpus.len())?;
    Ok(())
}

fn show_layout(corpus: &Corpus, config: &Config, args: LayoutArgs) -> Result<()> {
    let table = config.breakpoint_table()?;
    let items = args.items.unwrap_or(corpus.len());
    let geometry = layout(args.width, items, &table);

    let mut report = serde_json::to_value(geometry)?;
    report["contentHeight"] = geometry.content_height().into();
    if let Some(height) = args.height {
        report["viewportHeight"] = geometry
            .viewport_height(height, config.grid.reserved_height)
            .into();
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn list_categories(corpus: &Corpus, config: &Config) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (category, count) in category_counts(corpus.records(), &config.categories) {
        writeln!(out, "{:<16} {}", category, count)?;
    }
    Ok(())
}

// ============================================
// LISTEN
// ============================================

/// Query text goes through the debouncer; every other event applies
/// immediately. Each applied update prints one JSON status line.
fn listen(corpus: Corpus, config: &Config) -> Result<()> {
    let session = Arc::new(Mutex::new(
        SearchSession::from_config(corpus, config).context("Failed to start session")?,
    ));
    let (debouncer, settled) = DebouncedSender::spawn(config.debounce_window());

    let applier = {
        let session = Arc::clone(&session);
        std::thread::spawn(move || {
            while let Ok(query) = settled.recv_blocking() {
                let mut session = session.lock();
                if session.apply(SessionEvent::QueryChanged(query)) {
                    emit_status(&session);
                }
            }
        })
    };

    let events = start_stdin_listener();
    while let Ok(event) = events.recv_blocking() {
        let event = match event {
            HostEvent::SetQuery { text, request_id } => {
                debug!(request_id = ?request_id, "Query observed");
                if !debouncer.observe(text) {
                    warn!("Debounce worker stopped, dropping query");
                }
                continue;
            }
            HostEvent::ToggleCategory { category } => {
                let next = toggle_category(session.lock().categories(), &category);
                SessionEvent::CategoriesChanged(next)
            }
            HostEvent::SetCategories { categories } => {
                SessionEvent::CategoriesChanged(categories.into_iter().collect())
            }
            HostEvent::Resize { width, height } => {
                SessionEvent::ViewportResized(Viewport::new(width, height))
            }
            HostEvent::Scroll { offset } => SessionEvent::Scrolled(offset),
        };

        let mut session = session.lock();
        if session.apply(event) {
            emit_status(&session);
        }
    }

    // Lets the last pending query settle, then closes `settled`
    drop(debouncer);
    if applier.join().is_err() {
        warn!("Query applier thread panicked");
    }
    info!("Input closed, listen finished");
    Ok(())
}

fn emit_status(session: &SearchSession) {
    let Some(line) = serde_json::to_string(&session.status()).log_err() else {
        return;
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", line)
        .and_then(|_| out.flush())
        .warn_on_err();
}
