use eframe::egui::{self, PointerButton, Pos2, Rect, Ui};
use tracing::debug;

use crate::layout::Simulation;

use super::super::render_utils::screen_to_world;
use super::super::{ViewEvent, ViewModel};

/// On-screen disc of a laid-out paper.
pub(in crate::app) struct ScreenNode<'a> {
    pub(in crate::app) id: &'a str,
    pub(in crate::app) center: Pos2,
    pub(in crate::app) radius: f32,
}

/// Index of the disc under `pointer`, preferring the closest center when
/// discs overlap.
pub(in crate::app) fn node_at(nodes: &[ScreenNode<'_>], pointer: Pos2) -> Option<usize> {
    nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let distance = node.center.distance(pointer);
            (distance <= node.radius).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.2, 5.0);
        self.pan = pointer - rect.min - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Primary-button drags move a single paper: pinned while held, free
    /// again on release.
    pub(in crate::app) fn handle_node_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        nodes: &[ScreenNode<'_>],
    ) {
        if response.drag_started_by(PointerButton::Primary)
            && let Some(origin) = ui.input(|input| input.pointer.press_origin())
            && let Some(index) = node_at(nodes, origin)
        {
            let id = nodes[index].id;
            if self.engine.begin_drag(id) {
                debug!(id, "dragging paper");
            }
        }

        let Some(id) = self
            .engine
            .simulation()
            .and_then(Simulation::dragging)
            .map(str::to_owned)
        else {
            return;
        };

        if response.dragged_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let world = screen_to_world(rect, self.pan, self.zoom, pointer);
            self.engine.drag_to(&id, world);
        }

        if response.drag_stopped() {
            self.engine.end_drag(&id);
        }
    }

    pub(in crate::app) fn handle_node_click(
        &self,
        response: &egui::Response,
        hovered: Option<&str>,
    ) -> Option<ViewEvent> {
        if !response.clicked_by(PointerButton::Primary) {
            return None;
        }

        let paper = self.graph.paper(hovered?)?;
        Some(ViewEvent::NodeSelected(paper.clone()))
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn closest_overlapping_disc_wins() {
        let nodes = [
            ScreenNode {
                id: "a",
                center: pos2(0.0, 0.0),
                radius: 20.0,
            },
            ScreenNode {
                id: "b",
                center: pos2(15.0, 0.0),
                radius: 20.0,
            },
        ];

        assert_eq!(node_at(&nodes, pos2(12.0, 0.0)), Some(1));
        assert_eq!(node_at(&nodes, pos2(-5.0, 0.0)), Some(0));
        assert_eq!(node_at(&nodes, pos2(100.0, 100.0)), None);
    }
}
