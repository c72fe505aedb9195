use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::paper::PaperGraph;
use crate::util::stable_pair;

use super::forces::{ChargeParams, apply_axis_pull, apply_charge, apply_collisions, apply_links};
use super::scale::YearScale;
use super::{LayoutConfig, Viewport};

pub(super) struct SimNode {
    pub(super) id: String,
    pub(super) position: Vec2,
    pub(super) velocity: Vec2,
    pub(super) pinned: Option<Vec2>,
    pub(super) target_x: f32,
    pub(super) radius: f32,
}

pub(super) struct SimLink {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) strength: f32,
    /// Share of the correction applied to the target end.
    pub(super) bias: f32,
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    radii: Vec<f32>,
    deltas: Vec<Vec2>,
}

/// One layout run over engine-owned copies of the graph's papers and
/// relations. Nothing here aliases the caller's graph.
pub struct Simulation {
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    index_by_id: HashMap<String, usize>,
    scale: YearScale,
    viewport: Viewport,
    config: LayoutConfig,
    alpha: f32,
    alpha_target: f32,
    dragging: Option<usize>,
    ticks: usize,
    scratch: Scratch,
}

impl Simulation {
    pub(super) fn new(graph: &PaperGraph, viewport: Viewport, config: LayoutConfig) -> Self {
        let (min_year, max_year) = graph.year_span().unwrap_or((0, 0));
        let scale = YearScale::new(min_year, max_year, viewport, config.axis_margin);
        let center_y = viewport.height * 0.5;

        let mut index_by_id = HashMap::with_capacity(graph.nodes.len());
        let nodes = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, paper)| {
                index_by_id.insert(paper.id.clone(), index);
                let target_x = scale.x_for_year(paper.year);
                let (jx, jy) = stable_pair(&paper.id);
                SimNode {
                    id: paper.id.clone(),
                    position: vec2(
                        target_x + jx * config.node_radius,
                        center_y + jy * viewport.height * 0.15,
                    ),
                    velocity: Vec2::ZERO,
                    pinned: None,
                    target_x,
                    radius: config.node_radius,
                }
            })
            .collect::<Vec<_>>();

        let endpoints = graph
            .links
            .iter()
            .filter_map(|relation| {
                let source = *index_by_id.get(&relation.source)?;
                let target = *index_by_id.get(&relation.target)?;
                Some((source, target))
            })
            .collect::<Vec<_>>();

        let mut degree = vec![0usize; nodes.len()];
        for &(source, target) in &endpoints {
            degree[source] += 1;
            degree[target] += 1;
        }
        let links = endpoints
            .into_iter()
            .map(|(source, target)| {
                let (source_degree, target_degree) = (degree[source] as f32, degree[target] as f32);
                SimLink {
                    source,
                    target,
                    strength: 1.0 / source_degree.min(target_degree).max(1.0),
                    bias: source_degree / (source_degree + target_degree),
                }
            })
            .collect();

        Self {
            nodes,
            links,
            index_by_id,
            scale,
            viewport,
            config,
            alpha: 1.0,
            alpha_target: 0.0,
            dragging: None,
            ticks: 0,
            scratch: Scratch::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.alpha >= self.config.alpha_min || self.alpha_target > 0.0
    }

    /// Advances one bounded step. Returns `false` once the run has cooled.
    pub fn step(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        let alpha = self.alpha;
        let config = self.config;

        apply_links(&mut self.nodes, &self.links, config.link_distance, alpha);
        apply_charge(
            &mut self.nodes,
            &mut self.scratch.positions,
            ChargeParams {
                strength: config.charge_strength * alpha,
                theta: config.barnes_hut_theta,
            },
        );
        apply_collisions(
            &mut self.nodes,
            &mut self.scratch.positions,
            &mut self.scratch.radii,
            &mut self.scratch.deltas,
            config.collision_padding,
            config.collision_strength,
        );
        apply_axis_pull(
            &mut self.nodes,
            self.viewport.height * 0.5,
            config.year_strength,
            config.center_strength,
            alpha,
        );

        let retain = 1.0 - config.velocity_decay;
        for node in &mut self.nodes {
            if let Some(pin) = node.pinned {
                node.position = pin;
                node.velocity = Vec2::ZERO;
            } else {
                node.velocity *= retain;
                node.position += node.velocity;
            }
        }

        self.ticks += 1;
        if !self.is_active() {
            debug!(ticks = self.ticks, "temporal layout settled");
        }
        true
    }

    /// Pins the node where it currently is and keeps the run warm while the
    /// pointer holds it.
    pub fn begin_drag(&mut self, id: &str) -> bool {
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };

        if let Some(previous) = self.dragging
            && previous != index
        {
            self.nodes[previous].pinned = None;
        }

        let node = &mut self.nodes[index];
        node.pinned = Some(node.position);
        self.dragging = Some(index);
        self.alpha_target = self.config.drag_alpha_target;
        true
    }

    pub fn drag_to(&mut self, id: &str, position: Vec2) -> bool {
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };
        if self.dragging != Some(index) || !position.is_finite() {
            return false;
        }

        self.nodes[index].pinned = Some(position);
        true
    }

    pub fn end_drag(&mut self, id: &str) -> bool {
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };
        if self.dragging != Some(index) {
            return false;
        }

        self.nodes[index].pinned = None;
        self.dragging = None;
        self.alpha_target = 0.0;
        true
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.map(|index| self.nodes[index].id.as_str())
    }

    pub fn is_pinned(&self, id: &str) -> bool {
        self.index_by_id
            .get(id)
            .is_some_and(|&index| self.nodes[index].pinned.is_some())
    }

    pub fn position(&self, id: &str) -> Option<Vec2> {
        let &index = self.index_by_id.get(id)?;
        let node = &self.nodes[index];
        Some(node.pinned.unwrap_or(node.position))
    }

    pub fn positions(&self) -> HashMap<String, Vec2> {
        self.nodes
            .iter()
            .map(|node| (node.id.clone(), node.pinned.unwrap_or(node.position)))
            .collect()
    }

    pub fn scale(&self) -> &YearScale {
        &self.scale
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }
}
