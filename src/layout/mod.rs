mod forces;
mod quadtree;
mod scale;
mod simulation;

use std::collections::HashMap;

use eframe::egui::Vec2;
use tracing::{debug, info};

use crate::paper::PaperGraph;

pub use simulation::Simulation;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A surface that has not reported a positive, finite size yet.
    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn differs_from(&self, other: Self) -> bool {
        (self.width - other.width).abs() > 0.5 || (self.height - other.height).abs() > 0.5
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LayoutConfig {
    pub link_distance: f32,
    pub charge_strength: f32,
    pub barnes_hut_theta: f32,
    pub node_radius: f32,
    pub collision_padding: f32,
    pub collision_strength: f32,
    pub year_strength: f32,
    pub center_strength: f32,
    pub axis_margin: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub velocity_decay: f32,
    pub drag_alpha_target: f32,
}

impl LayoutConfig {
    pub const DEFAULT_LINK_DISTANCE: f32 = 140.0;
    pub const DEFAULT_CHARGE_STRENGTH: f32 = -420.0;
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let alpha_min = 0.001;
        Self {
            link_distance: Self::DEFAULT_LINK_DISTANCE,
            charge_strength: Self::DEFAULT_CHARGE_STRENGTH,
            barnes_hut_theta: 0.9,
            node_radius: 20.0,
            collision_padding: 10.0,
            collision_strength: 0.7,
            year_strength: 0.8,
            center_strength: 0.06,
            axis_margin: 70.0,
            alpha_min,
            // Cools from 1.0 to `alpha_min` in roughly 300 steps.
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
        }
    }
}

/// Owns at most one running simulation. Restarting always halts the
/// previous run first, so two passes never share the render target.
#[derive(Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
    simulation: Option<Simulation>,
    runs: u64,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            simulation: None,
            runs: 0,
        }
    }

    /// Starts a fresh run for `graph`. An empty graph or an unmeasured
    /// viewport leaves the engine idle; that is expected, not an error.
    pub fn restart(&mut self, graph: &PaperGraph, viewport: Viewport) -> bool {
        self.halt();

        if graph.is_empty() || !viewport.is_measured() {
            debug!(
                nodes = graph.node_count(),
                width = viewport.width,
                height = viewport.height,
                "layout not started; waiting for data or a measured surface"
            );
            return false;
        }

        self.runs += 1;
        info!(
            run = self.runs,
            nodes = graph.node_count(),
            links = graph.links.len(),
            width = viewport.width,
            height = viewport.height,
            "starting temporal layout"
        );
        self.simulation = Some(Simulation::new(graph, viewport, self.config));
        true
    }

    pub fn halt(&mut self) {
        if let Some(simulation) = self.simulation.take() {
            debug!(ticks = simulation.ticks(), "halted temporal layout");
        }
    }

    pub fn tick(&mut self) -> bool {
        self.simulation.as_mut().is_some_and(Simulation::step)
    }

    /// Steps until the run cools or `max_ticks` is reached; returns the
    /// number of steps taken.
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.tick() {
            ticks += 1;
        }
        ticks
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.simulation.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.simulation.as_ref().is_some_and(Simulation::is_active)
    }

    pub fn position(&self, id: &str) -> Option<Vec2> {
        self.simulation.as_ref()?.position(id)
    }

    pub fn positions(&self) -> HashMap<String, Vec2> {
        self.simulation
            .as_ref()
            .map(Simulation::positions)
            .unwrap_or_default()
    }

    pub fn is_pinned(&self, id: &str) -> bool {
        self.simulation
            .as_ref()
            .is_some_and(|simulation| simulation.is_pinned(id))
    }

    pub fn begin_drag(&mut self, id: &str) -> bool {
        self.simulation
            .as_mut()
            .is_some_and(|simulation| simulation.begin_drag(id))
    }

    pub fn drag_to(&mut self, id: &str, position: Vec2) -> bool {
        self.simulation
            .as_mut()
            .is_some_and(|simulation| simulation.drag_to(id, position))
    }

    pub fn end_drag(&mut self, id: &str) -> bool {
        self.simulation
            .as_mut()
            .is_some_and(|simulation| simulation.end_drag(id))
    }
}
