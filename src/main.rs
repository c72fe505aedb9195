mod app;
mod headless;
mod layout;
mod paper;
mod presentation;
mod source;
mod util;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::headless::{HeadlessOptions, render_scene, scene_json};
use crate::layout::{LayoutConfig, Viewport};
use crate::source::PayloadSource;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Analysis payload to load; `-` reads standard input.
    payload: String,

    /// Paper title or file name to focus on.
    #[arg(long, default_value = "")]
    query: String,

    /// Lay out without a window and print the scene as JSON.
    #[arg(long)]
    headless: bool,

    /// Print the repaired, validated graph as JSON and exit.
    #[arg(long, conflicts_with = "headless")]
    sanitize_only: bool,

    #[arg(long, default_value_t = 1200.0)]
    width: f32,

    #[arg(long, default_value_t = 800.0)]
    height: f32,

    #[arg(long, default_value_t = 600)]
    max_ticks: usize,

    #[arg(long, default_value_t = LayoutConfig::DEFAULT_LINK_DISTANCE)]
    link_distance: f32,

    #[arg(long, default_value_t = LayoutConfig::DEFAULT_CHARGE_STRENGTH, allow_negative_numbers = true)]
    charge: f32,
}

impl Args {
    fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            link_distance: self.link_distance,
            charge_strength: self.charge,
            ..LayoutConfig::default()
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let source = PayloadSource::from_arg(&args.payload)?;
    let layout_config = args.layout_config();

    if args.sanitize_only {
        let graph = source.load_graph()?;
        println!("{}", graph.to_payload().context("failed to serialize graph")?);
        return Ok(());
    }

    if args.headless {
        let graph = source.load_graph()?;
        let options = HeadlessOptions {
            viewport: Viewport::new(args.width, args.height),
            max_ticks: args.max_ticks,
        };
        let report = render_scene(&graph, &args.query, layout_config, options);
        println!("{}", scene_json(&report)?);
        return Ok(());
    }

    info!(source = %source.describe(), "starting viewer");
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width + 620.0, args.height + 60.0]),
        ..Default::default()
    };

    let query = args.query.clone();
    eframe::run_native(
        "paper-lineage",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::PaperLineageApp::new(
                cc,
                source,
                layout_config,
                query,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
