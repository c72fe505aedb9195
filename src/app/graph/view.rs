use std::collections::HashMap;

use eframe::egui::{
    Align2, Color32, CursorIcon, FontId, Painter, Pos2, Rect, Sense, Shape, Stroke, Ui, vec2,
};

use crate::layout::{Simulation, Viewport};
use crate::paper::resolve_focus;
use crate::presentation::{EdgeCurve, GraphStyle, NodeRole, style_graph};

use super::super::render_utils::{
    badge_text_color, blend_color, circle_visible, curve_visible, draw_background, world_to_screen,
};
use super::super::{ViewEvent, ViewModel};
use super::interaction::{ScreenNode, node_at};

const CURVE_SEGMENTS: usize = 24;
const AXIS_TICK_SPACING: f32 = 72.0;

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) -> Option<ViewEvent> {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);
        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let viewport = Viewport::new(rect.width(), rect.height());
        if self
            .laid_out_for
            .is_none_or(|previous| previous.differs_from(viewport))
        {
            self.engine.restart(&self.graph, viewport);
            self.laid_out_for = Some(viewport);
        }

        if self.engine.tick() || self.engine.is_active() {
            ui.ctx().request_repaint();
        }

        let Some(simulation) = self.engine.simulation() else {
            if self.graph.is_empty() {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    "The analysis returned no papers.",
                    FontId::proportional(16.0),
                    Color32::from_gray(180),
                );
            }
            return None;
        };

        let focus = resolve_focus(&self.graph, &self.query);
        let style = style_graph(&self.graph, &focus);
        let zoom_sqrt = self.zoom.sqrt();
        let node_radius = (self.layout_config.node_radius * zoom_sqrt).clamp(8.0, 48.0);

        self.draw_year_axis(&painter, rect, simulation);

        let screen_nodes = style
            .nodes
            .iter()
            .filter_map(|node| {
                let world = self.engine.position(&node.id)?;
                Some(ScreenNode {
                    id: node.id.as_str(),
                    center: world_to_screen(rect, self.pan, self.zoom, world),
                    radius: node_radius,
                })
            })
            .collect::<Vec<_>>();
        let screen_by_id = screen_nodes
            .iter()
            .map(|node| (node.id, node.center))
            .collect::<HashMap<_, _>>();

        draw_links(&painter, rect, &style, &screen_by_id, node_radius, zoom_sqrt, self.zoom);

        let pointer = ui.input(|input| input.pointer.hover_pos());
        let hovered = pointer
            .filter(|pointer| rect.contains(*pointer))
            .and_then(|pointer| node_at(&screen_nodes, pointer));
        let hovered_id = hovered.map(|index| screen_nodes[index].id);

        for screen_node in &screen_nodes {
            if !circle_visible(rect, screen_node.center, screen_node.radius) {
                continue;
            }
            let Some(node_style) = style.node(screen_node.id) else {
                continue;
            };

            let is_hovered = hovered_id == Some(screen_node.id);
            let is_pinned = self.engine.is_pinned(screen_node.id);
            let is_selected = self
                .selected
                .as_ref()
                .is_some_and(|paper| paper.id == screen_node.id);

            let fill = if is_hovered || is_pinned {
                blend_color(node_style.fill, Color32::WHITE, 0.25)
            } else {
                node_style.fill
            };
            painter.circle_filled(screen_node.center, screen_node.radius, fill);

            let ring = if is_selected {
                Stroke::new(2.6, Color32::WHITE)
            } else if node_style.role == NodeRole::Core {
                Stroke::new(2.0, blend_color(fill, Color32::WHITE, 0.6))
            } else {
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
            };
            painter.circle_stroke(screen_node.center, screen_node.radius, ring);

            painter.text(
                screen_node.center,
                Align2::CENTER_CENTER,
                &node_style.badge,
                FontId::monospace((11.0 * zoom_sqrt).clamp(9.0, 18.0)),
                badge_text_color(fill),
            );
            painter.text(
                screen_node.center + vec2(0.0, screen_node.radius + 4.0),
                Align2::CENTER_TOP,
                &node_style.label,
                FontId::proportional(12.0),
                Color32::from_gray(226),
            );
        }

        let dragging = self
            .engine
            .simulation()
            .and_then(Simulation::dragging)
            .is_some();
        if dragging {
            ui.output_mut(|output| output.cursor_icon = CursorIcon::Grabbing);
        } else if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = CursorIcon::Grab);
        }

        if let Some(id) = hovered_id
            && let Some(paper) = self.graph.paper(id)
        {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  {}  |  {}", paper.title, paper.year, paper.category_label()),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        self.handle_node_drag(ui, rect, &response, &screen_nodes);
        self.handle_node_click(&response, hovered_id)
    }

    fn draw_year_axis(&self, painter: &Painter, rect: Rect, simulation: &Simulation) {
        let scale = simulation.scale();
        let max_ticks = ((rect.width() * self.zoom) / AXIS_TICK_SPACING).floor().max(1.0) as usize;
        let tick_stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(100, 116, 139, 70));
        let baseline = rect.bottom() - 22.0;

        painter.line_segment(
            [Pos2::new(rect.left(), baseline), Pos2::new(rect.right(), baseline)],
            Stroke::new(1.0, Color32::from_rgb(71, 85, 105)),
        );
        for year in scale.ticks(max_ticks) {
            let x = world_to_screen(rect, self.pan, self.zoom, vec2(scale.x_for_year(year), 0.0)).x;
            if x < rect.left() || x > rect.right() {
                continue;
            }

            painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, baseline)], tick_stroke);
            painter.text(
                Pos2::new(x, baseline + 4.0),
                Align2::CENTER_TOP,
                year.to_string(),
                FontId::proportional(11.0),
                Color32::from_gray(170),
            );
        }
    }
}

fn draw_links(
    painter: &Painter,
    rect: Rect,
    style: &GraphStyle,
    screen_by_id: &HashMap<&str, Pos2>,
    node_radius: f32,
    zoom_sqrt: f32,
    zoom: f32,
) {
    let width = (1.6 * zoom_sqrt).clamp(1.0, 3.2);
    let arrow_size = (8.0 * zoom_sqrt).clamp(5.0, 14.0);

    for link in &style.links {
        if link.source == link.target {
            continue;
        }
        let Some(curve) = EdgeCurve::for_relation(&link.source, &link.target, |id| {
            screen_by_id.get(id).copied()
        }) else {
            continue;
        };
        if !curve_visible(rect, &curve, arrow_size) {
            continue;
        }

        let stroke = Stroke::new(width, link.color);
        let points = curve.sample(CURVE_SEGMENTS);
        if link.dashed {
            painter.extend(Shape::dashed_line(&points, stroke, 7.0, 5.0));
        } else {
            painter.add(Shape::line(points, stroke));
        }

        if let Some(head) = curve.arrowhead(arrow_size, node_radius + 1.0) {
            painter.add(Shape::convex_polygon(head.to_vec(), link.color, Stroke::NONE));
        }

        if zoom > 0.6 && !link.label.is_empty() {
            painter.text(
                curve.midpoint(),
                Align2::CENTER_CENTER,
                &link.label,
                FontId::proportional(10.0),
                blend_color(link.color, Color32::WHITE, 0.55),
            );
        }
    }
}
