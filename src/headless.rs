use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::layout::{LayoutConfig, LayoutEngine, Viewport};
use crate::paper::{Focus, PaperGraph, RelationKind, resolve_focus};
use crate::presentation::{EdgeCurve, palette, style_graph};

#[derive(Clone, Copy, Debug)]
pub struct HeadlessOptions {
    pub viewport: Viewport,
    pub max_ticks: usize,
}

#[derive(Debug, Serialize)]
pub struct SceneReport {
    pub viewport: [f32; 2],
    pub ticks: usize,
    pub settled: bool,
    pub focus: Focus,
    pub axis: Vec<AxisTick>,
    pub nodes: Vec<SceneNode>,
    pub links: Vec<SceneLink>,
}

#[derive(Debug, Serialize)]
pub struct AxisTick {
    pub year: i32,
    pub x: f32,
}

#[derive(Debug, Serialize)]
pub struct SceneNode {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub badge: String,
    pub label: String,
    pub color: String,
    /// Absent when the layout never ran.
    pub position: Option<[f32; 2]>,
}

#[derive(Debug, Serialize)]
pub struct SceneLink {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub color: String,
    pub dashed: bool,
    pub label: String,
    /// Start, control point, end of the quadratic edge path.
    pub curve: Option<[[f32; 2]; 3]>,
}

/// Runs the whole pipeline without a window: focus, a layout run to rest
/// (or `max_ticks`), and styling.
pub fn render_scene(
    graph: &PaperGraph,
    query: &str,
    config: LayoutConfig,
    options: HeadlessOptions,
) -> SceneReport {
    let focus = resolve_focus(graph, query);
    let style = style_graph(graph, &focus);

    let mut engine = LayoutEngine::new(config);
    engine.restart(graph, options.viewport);
    let ticks = engine.run_until_settled(options.max_ticks);
    let settled = engine.simulation().is_some_and(|run| !run.is_active());
    info!(ticks, settled, "headless layout finished");

    let axis = engine
        .simulation()
        .map(|run| {
            let scale = run.scale();
            scale
                .ticks(12)
                .into_iter()
                .map(|year| AxisTick {
                    year,
                    x: scale.x_for_year(year),
                })
                .collect()
        })
        .unwrap_or_default();

    let positions = engine.positions();
    let nodes = graph
        .nodes
        .iter()
        .zip(&style.nodes)
        .map(|(paper, node)| SceneNode {
            id: paper.id.clone(),
            title: paper.title.clone(),
            year: paper.year,
            badge: node.badge.clone(),
            label: node.label.clone(),
            color: palette::to_hex(node.fill),
            position: positions.get(&paper.id).map(|at| [at.x, at.y]),
        })
        .collect();

    let links = style
        .links
        .iter()
        .map(|link| {
            let curve = EdgeCurve::for_relation(&link.source, &link.target, |id| {
                positions.get(id).map(|at| at.to_pos2())
            });
            SceneLink {
                source: link.source.clone(),
                target: link.target.clone(),
                kind: link.kind,
                color: palette::to_hex(link.color),
                dashed: link.dashed,
                label: link.label.clone(),
                curve: curve.map(|curve| {
                    [curve.start, curve.control, curve.end].map(|point| [point.x, point.y])
                }),
            }
        })
        .collect();

    SceneReport {
        viewport: [options.viewport.width, options.viewport.height],
        ticks,
        settled,
        focus,
        axis,
        nodes,
        links,
    }
}

pub fn scene_json(report: &SceneReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize scene report")
}
