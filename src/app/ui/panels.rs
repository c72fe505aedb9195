use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::layout::{LayoutConfig, LayoutEngine};
use crate::paper::{PaperGraph, PaperRecord};

use super::super::{ViewEvent, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(graph: PaperGraph, query: String, layout_config: LayoutConfig) -> Self {
        Self {
            graph,
            query,
            engine: LayoutEngine::new(layout_config),
            layout_config,
            laid_out_for: None,
            selected: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source_label: &str,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("paper-lineage");
                    ui.separator();
                    ui.label(format!("source: {source_label}"));
                    ui.label(format!("papers: {}", self.graph.node_count()));
                    ui.label(format!("relations: {}", self.graph.links.len()));
                    let reload_button =
                        ui.add_enabled(!is_reloading, egui::Button::new("Reload"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if is_reloading {
                        ui.spinner();
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(status) = self.layout_status_text() {
                            ui.label(status);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        let event = egui::CentralPanel::default()
            .show(ctx, |ui| self.draw_graph(ui))
            .inner;
        if let Some(event) = event {
            self.apply_event(event);
        }
    }

    pub(in crate::app) fn apply_event(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::NodeSelected(paper) => self.set_selected(Some(paper)),
        }
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<PaperRecord>) {
        self.selected = selected;
    }

    /// Throws the current run away; the next frame lays out from scratch.
    pub(in crate::app) fn rerun_layout(&mut self) {
        self.engine = LayoutEngine::new(self.layout_config);
        self.laid_out_for = None;
    }

    fn layout_status_text(&self) -> Option<String> {
        let simulation = self.engine.simulation()?;
        Some(if simulation.is_active() {
            format!("layout: step {} (alpha {:.3})", simulation.ticks(), simulation.alpha())
        } else {
            format!("layout: settled after {} steps", simulation.ticks())
        })
    }
}
