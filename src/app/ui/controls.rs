use eframe::egui::{self, Color32, RichText, Sense, Ui, vec2};

use crate::paper::{FocusReason, RelationKind, resolve_focus};
use crate::presentation::{palette, style_graph};

use super::super::ViewModel;

fn swatch(ui: &mut Ui, color: Color32, dashed: bool, label: &str) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(vec2(22.0, 12.0), Sense::hover());
        let painter = ui.painter_at(rect);
        if dashed {
            let points = [rect.left_center(), rect.right_center()];
            painter.extend(egui::Shape::dashed_line(
                &points,
                egui::Stroke::new(2.0, color),
                4.0,
                3.0,
            ));
        } else {
            painter.circle_filled(rect.center(), 5.0, color);
        }
        ui.label(label);
    });
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Focus");
        ui.add_space(4.0);

        ui.label("Paper title or file name");
        let query_response = ui.add(
            egui::TextEdit::singleline(&mut self.query)
                .hint_text("e.g. attention is all you need")
                .desired_width(f32::INFINITY),
        );
        if query_response.changed() {
            ui.ctx().request_repaint();
        }

        let focus = resolve_focus(&self.graph, &self.query);
        match (&focus.core, focus.reason) {
            (Some(core), Some(reason)) => {
                let title = self
                    .graph
                    .paper(core)
                    .map(|paper| paper.title.as_str())
                    .unwrap_or(core.as_str());
                let how = match reason {
                    FocusReason::TitleMatch => "title match",
                    FocusReason::FileReference => "file reference, first paper",
                    FocusReason::FirstPaper => "no title match, first paper",
                };
                ui.label(RichText::new(title).strong());
                ui.small(format!("{how}; {} related", focus.neighbors.len()));
            }
            _ => {
                ui.small("No focused paper; colored by category.");
            }
        }

        ui.separator();
        ui.label(RichText::new("Relations").strong());
        for kind in RelationKind::ALL {
            swatch(
                ui,
                palette::relation_color(kind),
                kind == RelationKind::Inspiration,
                kind.label(),
            );
        }

        if focus.core.is_some() {
            ui.add_space(4.0);
            swatch(ui, palette::CORE, false, "Focused paper");
            swatch(ui, palette::MUTED, false, "Unrelated");
        } else {
            let style = style_graph(&self.graph, &focus);
            if !style.categories.is_empty() {
                ui.separator();
                ui.label(RichText::new("Categories").strong());
                for (name, color) in &style.categories {
                    swatch(ui, *color, false, name);
                }
            }
        }

        ui.separator();
        ui.label(RichText::new("Layout").strong());
        let mut changed = false;
        changed |= ui
            .add(
                egui::Slider::new(&mut self.layout_config.link_distance, 40.0..=400.0)
                    .text("link distance"),
            )
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut self.layout_config.charge_strength, -1500.0..=-20.0)
                    .text("repulsion"),
            )
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut self.layout_config.year_strength, 0.05..=1.0)
                    .text("year pull"),
            )
            .changed();
        let rerun = ui.button("Re-run layout").clicked();
        if changed || rerun {
            self.rerun_layout();
        }
        ui.small("Drag a paper to pin it; right-drag to pan; scroll to zoom.");
    }
}
