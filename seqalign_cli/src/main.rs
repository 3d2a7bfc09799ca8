mod format;
mod interactive;

use clap::{Parser, Subcommand};
use seqalign_common::{ensure_config, load_config_from, AppConfig, Rgb};
use seqalign_core::{
    mismatch_positions, ClipboardSink, ComparisonRenderer, FontMetrics, InputStage,
    MemoryClipboard, RenderedView, RendererOptions, Slot, SurfaceSize, SystemClipboard,
};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "seqalign")]
#[command(author = "SeqAlign Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Position-by-position comparison of two amino-acid sequences", long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two sequences and print the colorized alignment
    Compare {
        /// First sequence (lowercase and foreign characters are normalized)
        first: String,

        /// Second sequence; must have the same length after normalization
        second: String,

        /// Characters per line (defaults to the terminal width)
        #[arg(short, long)]
        width: Option<usize>,

        /// Disable ANSI colors in output
        #[arg(long)]
        no_color: bool,

        /// Output results as JSON
        #[arg(long, conflicts_with = "html")]
        json: bool,

        /// Output a standalone HTML page
        #[arg(long)]
        html: bool,

        /// Width of the HTML container in pixels, used to compute line length
        #[arg(long, requires = "html")]
        width_px: Option<f32>,

        /// Font size in pixels for HTML output
        #[arg(long, requires = "html")]
        font_size: Option<f32>,

        /// Omit the color legend
        #[arg(long)]
        no_legend: bool,
    },

    /// Interactive terminal session with copy-on-select
    Interactive,
}

fn main() {
    let cli = Cli::parse();

    // Full-screen mode owns the terminal, so only warnings are logged there
    let default_level = match cli.command {
        Commands::Interactive => "warn",
        Commands::Compare { .. } => "info",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level))
        )
        .init();

    let config = match resolve_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Compare {
            first,
            second,
            width,
            no_color,
            json,
            html,
            width_px,
            font_size,
            no_legend,
        } => {
            let request = CompareRequest {
                first,
                second,
                width,
                no_color,
                json,
                html,
                width_px,
                font_size,
                no_legend,
            };
            if let Err(e) = run_compare(request, &config) {
                error!("Comparison failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Interactive => {
            let options = RendererOptions::from_config(&config)
                .with_metrics(FontMetrics::terminal_cell());
            if let Err(e) = interactive::run(options, Box::new(system_clipboard)) {
                error!("Interactive session failed: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

fn resolve_config(path: Option<&PathBuf>) -> Result<AppConfig, seqalign_common::SeqAlignError> {
    let loaded = match path {
        Some(path) => load_config_from(path)?,
        None => ensure_config(false)?,
    };
    if loaded.exists {
        info!("Using configuration: {}", loaded.path.display());
    }
    Ok(loaded.config)
}

fn system_clipboard() -> Box<dyn ClipboardSink> {
    Box::new(SystemClipboard::new())
}

struct CompareRequest {
    first: String,
    second: String,
    width: Option<usize>,
    no_color: bool,
    json: bool,
    html: bool,
    width_px: Option<f32>,
    font_size: Option<f32>,
    no_legend: bool,
}

fn run_compare(request: CompareRequest, config: &AppConfig) -> anyhow::Result<()> {
    let mut stage = InputStage::default();
    stage.edit(Slot::First, &request.first);
    stage.edit(Slot::Second, &request.second);
    let pair = stage.submit()?;

    info!("Comparing {} positions", pair.len());

    let mut font = FontMetrics::from_config(&config.font);
    if let Some(size) = request.font_size {
        font.size = size;
    }
    // HTML output wraps by pixel width unless a character width is forced
    let metrics = if request.html && request.width.is_none() {
        font.clone()
    } else {
        FontMetrics::terminal_cell()
    };
    let options = RendererOptions::from_config(config).with_metrics(metrics);

    // Nothing is copied in one-shot mode
    let mut renderer = ComparisonRenderer::new(pair, options, Box::new(MemoryClipboard::new()));
    if let Some(size) = measure_surface(&request, renderer.pair().len()) {
        renderer.on_resize(size);
    }

    let view = renderer.render();
    let summary = renderer.summary();

    if request.json {
        let report = build_json_report(&renderer, &view);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if request.html {
        print!("{}", format::render_html(&view, &font, &summary));
        return Ok(());
    }

    let use_color = !request.no_color && std::io::stdout().is_terminal();
    print!("{}", format::render_text(&view, renderer.pair().len(), use_color));
    println!();
    if !request.no_legend {
        print!("{}", format::render_legend(use_color));
        println!();
    }
    print!("{}", format::render_summary(&summary));

    Ok(())
}

/// Surface to wrap against: explicit width first, then the HTML container
/// width, then the terminal. `None` leaves the configured default in place.
fn measure_surface(request: &CompareRequest, length: usize) -> Option<SurfaceSize> {
    if let Some(width) = request.width {
        return Some(SurfaceSize::new(width.max(1) as f32, 0.0));
    }

    if request.html {
        return request.width_px.map(|px| SurfaceSize::new(px, 0.0));
    }

    if request.json || !std::io::stdout().is_terminal() {
        return None;
    }

    let (columns, rows) = crossterm::terminal::size().ok()?;
    Some(terminal_surface(columns, rows, length))
}

/// Terminal area left for residues once the position gutter is drawn. At
/// least one column remains so narrow terminals wrap every character.
fn terminal_surface(columns: u16, rows: u16, length: usize) -> SurfaceSize {
    let gutter = format::gutter_width(length) as u16 + 1;
    SurfaceSize::from_cells(columns.saturating_sub(gutter).max(1), rows)
}

#[derive(Serialize)]
struct JsonReport {
    first: String,
    second: String,
    chunk_width: usize,
    summary: seqalign_core::ComparisonSummary,
    mismatches: Vec<usize>,
    chunks: Vec<JsonChunk>,
}

#[derive(Serialize)]
struct JsonChunk {
    offset: usize,
    first: String,
    second: String,
    first_colors: Vec<Option<String>>,
    second_colors: Vec<Option<String>>,
}

fn hex_colors(cells: &[seqalign_core::StyledCell]) -> Vec<Option<String>> {
    cells
        .iter()
        .map(|cell| cell.highlight.background().as_ref().map(Rgb::to_hex))
        .collect()
}

fn build_json_report(renderer: &ComparisonRenderer, view: &RenderedView) -> JsonReport {
    let positions = renderer.positions();

    let chunks = view
        .chunks
        .iter()
        .map(|chunk| JsonChunk {
            offset: chunk.offset,
            first: chunk.first.iter().map(|cell| cell.ch).collect(),
            second: chunk.second.iter().map(|cell| cell.ch).collect(),
            first_colors: hex_colors(&chunk.first),
            second_colors: hex_colors(&chunk.second),
        })
        .collect();

    JsonReport {
        first: renderer.pair().first().to_string(),
        second: renderer.pair().second().to_string(),
        chunk_width: view.chunk_width,
        summary: renderer.summary(),
        mismatches: mismatch_positions(&positions),
        chunks,
    }
}
