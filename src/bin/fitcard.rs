use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use fitcard::source::{ActivityKind, ENDPOINT_DETAILS, ENDPOINT_WORKOUT};
use fitcard::telemetry::extract::{extract_endurance, extract_strength};
use fitcard::{CardOptions, DirRecordStore, HttpTileSource, RecordStore, TileSource};

#[derive(Parser, Debug)]
#[command(name = "fitcard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an activity record to a PNG card.
    Render(RenderArgs),
    /// Print a summary of an activity record as JSON.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Record store directory (one <id>.json per record).
    #[arg(long)]
    store: PathBuf,

    /// Record id to render.
    #[arg(long)]
    record: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Basemap tile server base URL ({base}/{z}/{x}/{y}). Without it the
    /// map panel renders the route on a flat background.
    #[arg(long)]
    tiles: Option<String>,

    /// Card title. Defaults to the workout title or "Activity".
    #[arg(long)]
    title: Option<String>,

    /// Second header line, e.g. the activity date.
    #[arg(long)]
    subtitle: Option<String>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Record store directory.
    #[arg(long)]
    store: PathBuf,

    /// Record id to inspect.
    #[arg(long)]
    record: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let store = DirRecordStore::new(&args.store);
    let record = store.load(&args.record)?;

    let tile_source = args.tiles.map(HttpTileSource::new);
    let options = CardOptions {
        title: args.title,
        subtitle: args.subtitle,
    };
    let png = fitcard::render_card(
        &record,
        tile_source.as_ref().map(|s| s as &dyn TileSource),
        &options,
    )?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let store = DirRecordStore::new(&args.store);
    let record = store.load(&args.record)?;

    let summary = match record.kind() {
        ActivityKind::Endurance => {
            let details = record
                .payload(ENDPOINT_DETAILS)
                .context("record has no details payload")?;
            let t = extract_endurance(details);
            serde_json::json!({
                "kind": "endurance",
                "samples": t.samples.len(),
                "gpsPoints": t.gps.len(),
                "durationSec": t.duration_sec(),
                "distanceM": t.distance_m(),
            })
        }
        ActivityKind::Strength => {
            let payload = record
                .payload(ENDPOINT_WORKOUT)
                .context("record has no workout payload")?;
            let w = extract_strength(payload);
            serde_json::json!({
                "kind": "strength",
                "title": w.title,
                "sets": w.sets.len(),
                "workingSets": w.working_set_count(),
                "totalVolumeKg": w.total_volume_kg(),
                "enriched": record.enrichment.is_some(),
            })
        }
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
