//! `sommelier` command-line front end.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use sommelier::{
    config::{Overrides, Settings},
    persist::{journal::Journal, sqlite::SqliteBackend},
    runtime::handle::{JournalHandle, RuntimeConfig, RuntimeError, spawn_journal},
    synth::{RequestKind, client::WineSynthesizer, image::encode_data_url},
    types::{SortBy, WineStyle},
    wine::{WineNote, WinePatch},
};

/// Command-line arguments for sommelier
#[derive(Parser, Debug)]
#[command(name = "sommelier")]
#[command(about = "Wine tasting journal with AI label identification")]
#[command(version)]
struct Args {
    /// Config file (defaults to <config dir>/sommelier/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Journal database path
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// AI service key
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Model name
    #[arg(long, global = true)]
    model: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Identify a wine from a label photo and add it
    Photo {
        /// Image file
        path: PathBuf,
    },
    /// Research a wine by name and add it
    Search {
        /// Free-text description, e.g. "Ridge Monte Bello 2019"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// List the collection
    List {
        /// recent, rating, vintage or region
        #[arg(long, default_value = "recent")]
        sort: SortBy,
    },
    /// Show one record in full
    Show {
        /// Record id
        id: String,
    },
    /// Edit a record
    Edit {
        /// Record id
        id: String,
        #[command(flatten)]
        fields: EditFields,
    },
    /// Delete a record
    Delete {
        /// Record id
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Write the stored collection as JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct EditFields {
    /// Rating, 1 to 5
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    rating: Option<u8>,
    /// Personal notes
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    winery: Option<String>,
    #[arg(long)]
    varietal: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    vintage: Option<String>,
    /// Red, White, Rosé, Sparkling, Sweet or Fortified
    #[arg(long)]
    style: Option<WineStyle>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    body: Option<u8>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    acidity: Option<u8>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    tannin: Option<u8>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    sweetness: Option<u8>,
}

impl From<EditFields> for WinePatch {
    fn from(f: EditFields) -> Self {
        WinePatch {
            name: f.name,
            winery: f.winery,
            varietal: f.varietal,
            region: f.region,
            vintage: f.vintage,
            style: f.style,
            user_notes: f.notes,
            rating: f.rating,
            body: f.body,
            acidity: f.acidity,
            tannin: f.tannin,
            sweetness: f.sweetness,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "sommelier=debug" } else { "sommelier=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let overrides = Overrides {
        api_key: args.api_key.clone(),
        model: args.model.clone(),
        database: args.database.clone(),
    };
    let settings = Settings::load(&overrides, args.config.as_deref()).context("Failed to load settings")?;

    if let Some(parent) = settings.database.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    info!("Database: {}", settings.database.display());

    let backend = SqliteBackend::open(&settings.database).context("Failed to open journal database")?;
    let journal = Journal::open(Box::new(backend)).context("Failed to load journal")?;
    let synth = WineSynthesizer::from_settings(&settings).context("Failed to build AI client")?;
    let handle = spawn_journal(journal, synth, RuntimeConfig::default());

    let outcome = run(&handle, args.command).await;
    handle.shutdown().await.context("Journal shutdown failed")?;
    outcome
}

async fn run(handle: &JournalHandle, command: Command) -> Result<()> {
    match command {
        Command::Photo { path } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            debug!(bytes = bytes.len(), "label photo read");
            let outcome = match encode_data_url(&bytes) {
                Ok(data_url) => handle.add_from_image(data_url).await,
                Err(e) => Err(e.into()),
            };
            let note = report(outcome, RequestKind::Image)?;
            print_note(&note);
        }
        Command::Search { query } => {
            let note = report(handle.add_from_query(&query.join(" ")).await, RequestKind::Research)?;
            print_note(&note);
            if let Some(sources) = note.search_sources.as_deref().filter(|s| !s.is_empty()) {
                println!("Sources:");
                for source in sources.iter().take(3) {
                    println!("  {} <{}>", source.title, source.uri);
                }
            }
        }
        Command::List { sort } => {
            let notes = handle.sorted(sort).await?;
            if notes.is_empty() {
                println!("Your cellar is empty. Add a wine with `sommelier photo` or `sommelier search`.");
            }
            for n in notes {
                println!(
                    "{:<20} {} {} - {} ({}, {}) [{}]",
                    n.id,
                    stars(n.rating),
                    n.name,
                    n.winery,
                    n.vintage,
                    n.region,
                    n.style
                );
            }
        }
        Command::Show { id } => match handle.get(id.as_str()).await? {
            Some(note) => {
                print_note(&note);
                if let Some(sources) = note.search_sources.as_deref().filter(|s| !s.is_empty()) {
                    println!("Sources:");
                    for source in sources {
                        println!("  {} <{}>", source.title, source.uri);
                    }
                }
            }
            None => anyhow::bail!("No wine with id {id}"),
        },
        Command::Edit { id, fields } => {
            let patch = WinePatch::from(fields);
            if patch.is_empty() {
                anyhow::bail!("Nothing to change; pass at least one field flag");
            }
            match handle.update(id.as_str(), patch).await? {
                Some(note) => print_note(&note),
                None => anyhow::bail!("No wine with id {id}"),
            }
        }
        Command::Delete { id, yes } => {
            let Some(note) = handle.get(id.as_str()).await? else {
                anyhow::bail!("No wine with id {id}");
            };
            let prompt = format!("Delete {} ({})?", note.name, note.vintage);
            if !yes && !confirm(&prompt, &mut io::stdin().lock(), &mut io::stdout())? {
                println!("Kept.");
                return Ok(());
            }
            if handle.remove(id.as_str()).await? {
                println!("Deleted {}.", note.name);
            }
        }
        Command::Export { output } => {
            let json = handle.export_json().await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
    }
    Ok(())
}

/// Swaps synthesis failures for the user-facing notice.
fn report(outcome: Result<WineNote, RuntimeError>, kind: RequestKind) -> Result<WineNote> {
    match outcome {
        Ok(note) => Ok(note),
        Err(RuntimeError::Synthesis(e)) => {
            debug!(error = %e, "synthesis failed");
            Err(anyhow::anyhow!(e.user_message(kind)))
        }
        Err(e) => Err(e.into()),
    }
}

fn print_note(n: &WineNote) {
    println!("{} ({})", n.name, n.vintage);
    println!("  id:        {}", n.id);
    println!("  winery:    {}", n.winery);
    println!("  varietal:  {}", n.varietal);
    println!("  region:    {}", n.region);
    println!("  style:     {}", n.style);
    println!("  rating:    {}", stars(n.rating));
    let c = n.characteristics;
    println!(
        "  profile:   body {} / acidity {} / tannin {} / sweetness {}",
        c.body, c.acidity, c.tannin, c.sweetness
    );
    println!("  notes:     {}", n.tasting_notes);
    if !n.user_notes.is_empty() {
        println!("  yours:     {}", n.user_notes);
    }
}

fn stars(rating: Option<u8>) -> String {
    let r = usize::from(rating.unwrap_or(0).min(5));
    format!("{}{}", "*".repeat(r), ".".repeat(5 - r))
}

fn confirm(prompt: &str, input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    write!(out, "{prompt} [y/N] ")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
