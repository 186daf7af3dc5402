//! Command-line tool for running the tool-path planning core over a JSON
//! layer description and emitting G-code.

mod gcode;
mod layer;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use gcode::{NoBoundary, SequentialOrder, TextGCodeWriter};
use layer::PlanDocument;
use toolpath_geometry::IdentityCleaner;
use toolpath_planner::Planner;

/// Plan one or more layers of polygons into G-code.
#[derive(Parser, Debug)]
#[clap(version, about = "Plan tool paths from a JSON layer description and emit G-code")]
struct Cli {
  /// Input JSON layer description
  #[arg(short, long)]
  input: PathBuf,

  /// Output G-code file path
  #[arg(short, long)]
  output: PathBuf,

  /// Route travel moves around the outer perimeter instead of straight-line
  #[arg(long)]
  avoid_crossing_perimeter: bool,
}

fn main() -> Result<()> {
  env_logger::init();
  let cli = Cli::parse();

  let content = fs::read_to_string(&cli.input)
    .with_context(|| format!("failed to read input file: {}", cli.input.display()))?;
  let document: PlanDocument =
    serde_json::from_str(&content).with_context(|| "failed to parse layer description JSON")?;

  info!("planning {} layer(s) from {}", document.layers.len(), cli.input.display());

  let mut gcode = String::new();
  for (index, layer) in document.layers.iter().enumerate() {
    let writer = TextGCodeWriter::new(layer.z_um);
    let mut planner = Planner::new(
      writer,
      document.travel_speed,
      document.retraction_minimum_distance_um,
      document.perimeter_start_end_overlap,
      document.merge_overlapping_lines,
    )
    .with_context(|| format!("invalid planner configuration for layer {index}"))?;

    if cli.avoid_crossing_perimeter {
      planner.set_outer_perimeters_to_avoid_crossing(Some(Box::new(NoBoundary)));
    }

    let optimizer = SequentialOrder;
    let mut run_start = 0;
    while run_start < layer.paths.len() {
      let config = layer.paths[run_start].config();
      let mut run_end = run_start + 1;
      while run_end < layer.paths.len() && layer.paths[run_end].config() == config {
        run_end += 1;
      }
      let polygons: Vec<_> = layer.paths[run_start..run_end].iter().map(|path| path.polygon()).collect();
      planner.queue_polygons_by_optimizer(&polygons, &config, &optimizer);
      run_start = run_end;
    }

    planner.force_minimum_layer_time(document.minimum_layer_time_s, document.minimum_layer_time_speed);
    planner.write_queued_gcode(
      layer.layer_thickness_um,
      document.fan_percent,
      document.bridge_fan_percent,
      &IdentityCleaner,
    );

    gcode.push_str(&planner.into_writer().into_gcode());
  }

  fs::write(&cli.output, gcode)
    .with_context(|| format!("failed to write output file: {}", cli.output.display()))?;
  info!("wrote G-code to {}", cli.output.display());

  Ok(())
}
