#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line driver for the Range Overlay engine.
//!
//! The binary stands in for the host game loop: it reproduces a scenario
//! inside the farm registry, ticks the recompute cadence, runs the coverage
//! pass, publishes the shared overlay, and renders the published tiles as an
//! ASCII grid for inspection.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use range_overlay_core::Event;
use range_overlay_rendering::{
    render_frame, HighlightInstance, OverlayPresentation, OverlayRenderer, RecomputeCadence,
    SharedTileOverlay, DEFAULT_TILE_LENGTH, HIGHLIGHT_TINT,
};
use range_overlay_system_coverage::Coverage;
use range_overlay_world::{apply, query, World};

mod scenario;

use scenario::Scenario;

/// Replays a coverage scenario and prints the resulting overlay.
#[derive(Debug, Parser)]
#[command(name = "range-overlay")]
struct Args {
    /// Encoded scenario transfer string (`range:v1:<WxH>:<payload>`).
    #[arg(long, conflicts_with = "scenario_file")]
    scenario: Option<String>,
    /// Path to a TOML scenario file.
    #[arg(long)]
    scenario_file: Option<PathBuf>,
    /// Number of driver ticks to simulate.
    #[arg(long, default_value_t = 8)]
    ticks: u64,
    /// Print the scenario's transfer string instead of running the driver.
    #[arg(long)]
    emit_transfer: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let scenario = load_scenario(&args)?;

    if args.emit_transfer {
        println!("{}", scenario.encode());
        return Ok(());
    }

    let mut world = World::new();
    let mut events = Vec::new();
    for command in scenario.commands() {
        apply(&mut world, command, &mut events);
    }
    report_rejections(&events);

    let overlay = SharedTileOverlay::new();
    let presentation = OverlayPresentation::new(DEFAULT_TILE_LENGTH, HIGHLIGHT_TINT)?;
    let mut coverage = Coverage::new();
    let mut cadence = RecomputeCadence::default();
    let mut staged = Vec::new();
    let mut renderer = AsciiRenderer::new(
        scenario.columns,
        scenario.rows,
        presentation.tile_length(),
    );

    let mut frames_drawn = 0u64;
    for _ in 0..args.ticks {
        if cadence.advance() {
            let context = query::render_context(&world);
            let objects = query::object_view(&world);
            let huts = query::hut_view(&world);
            coverage.handle(&context, &objects, &huts, &mut staged);
            overlay.publish(&mut staged);
        }

        if render_frame(&overlay, &presentation, &mut renderer)? {
            frames_drawn += 1;
        }
    }

    println!("{}", renderer.render_grid());
    let published = overlay.snapshot();
    let mut distinct = published.clone();
    distinct.sort_unstable();
    distinct.dedup();
    println!(
        "highlighted tiles: {} ({} distinct), frames drawn: {frames_drawn}/{}",
        published.len(),
        distinct.len(),
        args.ticks,
    );

    Ok(())
}

fn load_scenario(args: &Args) -> Result<Scenario> {
    if let Some(encoded) = &args.scenario {
        return Ok(Scenario::decode(encoded)?);
    }
    if let Some(path) = &args.scenario_file {
        return Scenario::from_toml_path(path);
    }
    Ok(Scenario::demo())
}

fn report_rejections(events: &[Event]) {
    for event in events {
        match event {
            Event::ObjectPlacementRejected { tile, reason } => {
                eprintln!(
                    "warning: object placement at ({}, {}) rejected: {reason:?}",
                    tile.x(),
                    tile.y()
                );
            }
            Event::HutPlacementRejected { anchor, reason } => {
                eprintln!(
                    "warning: hut placement at ({}, {}) rejected: {reason:?}",
                    anchor.x(),
                    anchor.y()
                );
            }
            Event::ObjectRemovalRejected { object, reason } => {
                eprintln!("warning: update of object {} rejected: {reason:?}", object.get());
            }
            _ => {}
        }
    }
}

/// Renderer that rasterises highlight instances into a character grid.
struct AsciiRenderer {
    columns: u32,
    rows: u32,
    tile_length: f32,
    counts: Vec<u32>,
    out_of_view: u32,
}

impl AsciiRenderer {
    fn new(columns: u32, rows: u32, tile_length: f32) -> Self {
        Self {
            columns,
            rows,
            tile_length,
            counts: vec![0; columns as usize * rows as usize],
            out_of_view: 0,
        }
    }

    fn render_grid(&self) -> String {
        let mut grid = String::new();
        for row in 0..self.rows {
            for column in 0..self.columns {
                let count = self.counts[(row * self.columns + column) as usize];
                grid.push(match count {
                    0 => '.',
                    1..=9 => char::from(b'0' + count as u8),
                    _ => '+',
                });
            }
            grid.push('\n');
        }
        if self.out_of_view > 0 {
            grid.push_str(&format!("(+{} tiles outside the view)\n", self.out_of_view));
        }
        grid
    }
}

impl OverlayRenderer for AsciiRenderer {
    fn draw(&mut self, instances: &[HighlightInstance]) -> Result<()> {
        self.counts.fill(0);
        self.out_of_view = 0;

        for instance in instances {
            let column = (instance.position.x / self.tile_length).floor() as i64;
            let row = (instance.position.y / self.tile_length).floor() as i64;
            if column < 0 || row < 0 || column >= i64::from(self.columns) || row >= i64::from(self.rows)
            {
                self.out_of_view += 1;
                continue;
            }
            self.counts[(row as u32 * self.columns + column as u32) as usize] += 1;
        }

        Ok(())
    }
}
