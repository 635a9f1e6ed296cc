//! Drop Trace entry point
//!
//! Reads a match's telemetry, draws the tracked players' routes onto the
//! map and prints a JSON summary per player.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use drop_trace::renderer::Image;
use drop_trace::{
    Canvas, MapAssets, MatchInfo, MatchRenderer, PlayerSummary, RenderSettings, classify,
    decode_events,
};

#[derive(Debug, Parser)]
#[command(version, about = "Draw match routes from telemetry", long_about = None)]
struct Args {
    /// Telemetry file (JSON array of events)
    #[arg(short, long)]
    telemetry: PathBuf,

    /// Player to track, repeat for a squad. The first one is the primary player.
    #[arg(short, long = "player", required = true)]
    players: Vec<String>,

    /// Map name (e.g. Erangel, Baltic_Main); defaults to the one in the telemetry
    #[arg(short, long)]
    map: Option<String>,

    /// Game mode to report
    #[arg(long, default_value = "")]
    game_mode: String,

    /// Raw RGBA8 map image, sized by --width and --height
    #[arg(long, requires = "width")]
    background: Option<PathBuf>,

    /// Map width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Map height in pixels; defaults to the width
    #[arg(long)]
    height: Option<u32>,

    /// Render settings (JSON)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Output image (binary PPM)
    #[arg(short, long, default_value = "match.ppm")]
    out: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading settings {}", path.display()))?;
            RenderSettings::from_json(&json)?
        }
        None => RenderSettings::default(),
    };

    let json = fs::read_to_string(&args.telemetry)
        .with_context(|| format!("reading telemetry {}", args.telemetry.display()))?;
    let events = decode_events(&json)?;
    log::info!("Loaded {} events from {}", events.len(), args.telemetry.display());

    let info = MatchInfo {
        map_name: args.map.clone(),
        game_mode: args.game_mode.clone(),
    };
    let aggregate = classify(&events, &args.players, &info)?;

    // Summaries don't need the map, so they go out even if drawing fails
    let summaries = PlayerSummary::for_match(&aggregate);
    println!("{}", serde_json::to_string_pretty(&summaries)?);

    let mut assets = MapAssets::new();
    if let Some(width) = args.width {
        let height = args.height.unwrap_or(width);
        let image = match &args.background {
            Some(path) => {
                let bytes =
                    fs::read(path).with_context(|| format!("reading map {}", path.display()))?;
                Image::from_rgba(&path.display().to_string(), width, height, &bytes)?
            }
            None => Image::solid(width, height, settings.blank_map_color),
        };
        assets = assets.with_map(aggregate.map()?, image);
    }

    let renderer = MatchRenderer::new(settings, assets);
    match renderer.draw(&aggregate)? {
        Some(canvas) => {
            write_ppm(&args.out, &canvas)?;
            log::info!("Wrote {}", args.out.display());
        }
        None => log::warn!("No tracked player has position data, no image written"),
    }

    Ok(())
}

/// Binary PPM (P6); alpha is dropped
fn write_ppm(path: &Path, canvas: &Canvas) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write!(out, "P6\n{} {}\n255\n", canvas.width(), canvas.height())?;
    for px in canvas.as_bytes().chunks_exact(4) {
        out.write_all(&px[..3])?;
    }
    out.flush()?;
    Ok(())
}
