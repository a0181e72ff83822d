use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use image::RgbaImage;
use mapedit_assets::{DirResolver, ResourceResolver};
use mapedit_author::{Editor, FrameReport};
use mapedit_common::{ChunkPreference, Dimensions, EngineConfig, MapConfig};
use mapedit_input::{KeyBindings, Keys, RawInputEvent};
use mapedit_tools::{EditorInspector, FrameTimer};
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mapedit-cli", about = "Headless host for the map editor engine")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Show the chunk size chosen for a surface
    ChunkSize {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        /// Prefer many small chunks over few large ones
        #[arg(long)]
        small: bool,
    },
    /// Load a map, run scripted frames and write the last one as PNG
    Render(RenderArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Asset root the resolver serves images and metadata from
    #[arg(long)]
    assets: PathBuf,
    /// Map configuration JSON
    #[arg(long)]
    map: PathBuf,
    /// Key bindings JSON; WASD and arrows when omitted
    #[arg(long)]
    bindings: Option<PathBuf>,
    /// Engine configuration JSON; defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "60")]
    frames: u32,
    /// Simulated milliseconds per frame
    #[arg(long, default_value = "16")]
    tick_ms: f64,
    /// Directions held for the whole run, e.g. `up,left`
    #[arg(long, value_delimiter = ',')]
    keys: Vec<String>,
    #[arg(long, default_value = "800")]
    width: u32,
    #[arg(long, default_value = "600")]
    height: u32,
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("mapedit-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", mapedit_common::crate_info());
            println!("kernel: {}", mapedit_kernel::crate_info());
            println!("input: {}", mapedit_input::crate_info());
            println!("assets: {}", mapedit_assets::crate_info());
            println!("stream: {}", mapedit_stream::crate_info());
            println!("render: {}", mapedit_render::crate_info());
            println!("author: {}", mapedit_author::crate_info());
            println!("tools: {}", mapedit_tools::crate_info());
        }
        Commands::ChunkSize {
            width,
            height,
            small,
        } => {
            let preference = if small {
                ChunkPreference::Small
            } else {
                ChunkPreference::Big
            };
            let surface = Dimensions::new(width, height);
            let size = mapedit_stream::calculate_chunk_size(surface, preference)?;
            println!(
                "{width}x{height} ({preference:?}): chunks of {}x{}, grid {}x{}",
                size.width,
                size.height,
                width.div_ceil(size.width),
                height.div_ceil(size.height)
            );
        }
        Commands::Render(args) => render(args)?,
    }

    Ok(())
}

fn render(args: RenderArgs) -> anyhow::Result<()> {
    let map: MapConfig = read_json(&args.map)?;
    let bindings: KeyBindings = match &args.bindings {
        Some(path) => read_json(path)?,
        None => KeyBindings::default(),
    };
    let config: EngineConfig = match &args.config {
        Some(path) => read_json(path)?,
        None => EngineConfig::default(),
    };
    let held = held_keys(&bindings, &args.keys)?;

    let resolver: Rc<dyn ResourceResolver> = Rc::new(DirResolver::new(&args.assets));
    let viewport = Dimensions::new(args.width, args.height);
    let mut editor = pollster::block_on(Editor::create(map, bindings, resolver, viewport, config))
        .context("failed to create editor")?;
    for key in held {
        editor.handle_input(RawInputEvent::KeyDown(key));
    }
    editor.start()?;

    let mut frame = RgbaImage::new(args.width, args.height);
    let mut timer = FrameTimer::new(120);
    let mut last = FrameReport::default();
    for index in 0..args.frames {
        let now = f64::from(index) * args.tick_ms;
        let started = Instant::now();
        last = editor.update(now, &mut frame);
        timer.record(started.elapsed());
    }
    tracing::info!(frames = args.frames, out = %args.out.display(), "rendering done");

    frame
        .save(&args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    println!("{}", EditorInspector::summary(&editor));
    println!(
        "Last frame: dt={:.1}ms chunks_drawn={}",
        last.delta_time, last.chunks_drawn
    );
    println!("Timing: {}", timer.stats());
    Ok(())
}

/// First bound key for each named direction.
fn held_keys(bindings: &KeyBindings, directions: &[String]) -> anyhow::Result<Vec<String>> {
    let b = &bindings.direction_bindings;
    directions
        .iter()
        .map(|direction| {
            let keys: &Keys = match direction.trim() {
                "up" => &b.up,
                "down" => &b.down,
                "left" => &b.left,
                "right" => &b.right,
                other => bail!("unknown direction `{other}`"),
            };
            keys.primary()
                .map(str::to_owned)
                .with_context(|| format!("no key bound to `{direction}`"))
        })
        .collect()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}
