use eframe::egui::{self, RichText, Ui};

use crate::paper::PaperRecord;
use crate::presentation::palette;

use super::super::ViewModel;

fn labelled_block(ui: &mut Ui, heading: &str, body: &str) {
    if body.trim().is_empty() {
        return;
    }

    ui.add_space(4.0);
    ui.label(RichText::new(heading).strong());
    ui.label(body);
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Paper Details");
        ui.add_space(6.0);

        let Some(paper) = self.selected.clone() else {
            ui.label("Click a paper in the graph to see its record.");
            return;
        };

        egui::ScrollArea::vertical()
            .id_salt("paper_details_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(RichText::new(&paper.title).strong().size(16.0));
                ui.small(format!("{}  ·  {}", paper.year, paper.category_label()));
                if !paper.authors.is_empty() {
                    ui.label(paper.authors.join(", "));
                }
                if let Some(url) = &paper.url {
                    ui.hyperlink(url);
                }

                labelled_block(ui, "Summary", &paper.summary);
                labelled_block(ui, "Novelty", &paper.novelty);
                for (heading, value) in optional_sections(&paper) {
                    labelled_block(ui, heading, value);
                }

                ui.separator();
                ui.label(RichText::new("Relations").strong());
                self.draw_relations(ui, &paper.id);
            });
    }

    fn draw_relations(&mut self, ui: &mut Ui, paper_id: &str) {
        let mut next = None;
        let mut any = false;

        for relation in &self.graph.links {
            let Some(other_id) = relation.other_end(paper_id) else {
                continue;
            };
            let Some(other) = self.graph.paper(other_id) else {
                continue;
            };
            any = true;

            let arrow = if relation.source == paper_id { "→" } else { "←" };
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(relation.kind.label())
                        .color(palette::relation_color(relation.kind)),
                );
                ui.label(arrow);
                let link = ui
                    .link(other.title.as_str())
                    .on_hover_text(relation.description.as_str());
                if link.clicked() {
                    next = Some(other.clone());
                }
            });
        }

        if !any {
            ui.label("No relations recorded for this paper.");
        }
        if next.is_some() {
            self.set_selected(next);
        }
    }
}

fn optional_sections(paper: &PaperRecord) -> Vec<(&'static str, &str)> {
    [
        ("Evolution", paper.evolution_summary.as_deref()),
        ("Comparison", paper.comparison.as_deref()),
        ("Methodology", paper.methodology.as_deref()),
        ("Dataset", paper.dataset.as_deref()),
        ("Benchmark", paper.benchmark.as_deref()),
    ]
    .into_iter()
    .filter_map(|(heading, value)| Some((heading, value?)))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_present_sections_are_listed() {
        let mut paper = PaperRecord::new("a", "A", 2020);
        paper.dataset = Some("ImageNet".to_owned());
        paper.comparison = Some("beats prior work".to_owned());

        let headings = optional_sections(&paper)
            .into_iter()
            .map(|(heading, _)| heading)
            .collect::<Vec<_>>();
        assert_eq!(headings, ["Comparison", "Dataset"]);
    }
}
