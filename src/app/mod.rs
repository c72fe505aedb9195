use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use tracing::{info, warn};

use crate::layout::{LayoutConfig, LayoutEngine, Viewport};
use crate::paper::{PaperGraph, PaperRecord, RequestLedger, RequestTicket};
use crate::source::PayloadSource;

mod graph;
mod render_utils;
mod ui;

pub struct PaperLineageApp {
    source: Arc<PayloadSource>,
    layout_config: LayoutConfig,
    initial_query: String,
    ledger: RequestLedger,
    loads_tx: Sender<LoadOutcome>,
    loads_rx: Receiver<LoadOutcome>,
    reloading: bool,
    state: AppState,
}

struct LoadOutcome {
    ticket: RequestTicket,
    result: Result<PaperGraph, String>,
}

enum AppState {
    Loading,
    Ready(Box<ViewModel>),
    Error(String),
}

/// Emitted by the graph view; the app decides where it goes.
pub(in crate::app) enum ViewEvent {
    NodeSelected(PaperRecord),
}

struct ViewModel {
    graph: PaperGraph,
    query: String,
    engine: LayoutEngine,
    layout_config: LayoutConfig,
    laid_out_for: Option<Viewport>,
    selected: Option<PaperRecord>,
    pan: Vec2,
    zoom: f32,
}

impl PaperLineageApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: PayloadSource,
        layout_config: LayoutConfig,
        initial_query: String,
    ) -> Self {
        let (loads_tx, loads_rx) = mpsc::channel();
        let mut app = Self {
            source: Arc::new(source),
            layout_config,
            initial_query,
            ledger: RequestLedger::default(),
            loads_tx,
            loads_rx,
            reloading: false,
            state: AppState::Loading,
        };
        app.spawn_load();
        app
    }

    /// Starts a background load. Any load still in flight becomes stale and
    /// its result is dropped when it arrives.
    fn spawn_load(&mut self) {
        let ticket = self.ledger.issue();
        let source = Arc::clone(&self.source);
        let tx = self.loads_tx.clone();
        info!(source = %source.describe(), "loading analysis payload");

        thread::spawn(move || {
            let result = source.load_graph().map_err(|error| format!("{error:#}"));
            let _ = tx.send(LoadOutcome { ticket, result });
        });

        self.reloading = matches!(self.state, AppState::Ready(_));
        if !self.reloading {
            self.state = AppState::Loading;
        }
    }

    fn poll_loads(&mut self) -> Option<AppState> {
        loop {
            match self.loads_rx.try_recv() {
                Ok(outcome) => {
                    if !self.ledger.accept(outcome.ticket) {
                        continue;
                    }

                    self.reloading = false;
                    return Some(match outcome.result {
                        Ok(graph) => {
                            info!(nodes = graph.node_count(), links = graph.links.len(), "graph ready");
                            let query = match &self.state {
                                AppState::Ready(model) => model.query.clone(),
                                _ => self.initial_query.clone(),
                            };
                            AppState::Ready(Box::new(ViewModel::new(
                                graph,
                                query,
                                self.layout_config,
                            )))
                        }
                        Err(error) => {
                            warn!(%error, "analysis payload could not be loaded");
                            AppState::Error(error)
                        }
                    });
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    return Some(AppState::Error(
                        "Background load worker disconnected".to_owned(),
                    ));
                }
            }
        }
    }
}

impl eframe::App for PaperLineageApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if let Some(next_state) = self.poll_loads() {
            self.state = next_state;
        }

        let mut reload_requested = false;
        let source_label = self.source.describe();
        match &mut self.state {
            AppState::Loading => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading analysis result...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the paper graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        reload_requested = true;
                    }
                });
            }
            AppState::Ready(model) => {
                model.show(ctx, &source_label, &mut reload_requested, self.reloading);
                if self.reloading {
                    ctx.request_repaint();
                }
            }
        }

        if reload_requested {
            self.spawn_load();
        }
    }
}
