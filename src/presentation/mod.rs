mod curve;
pub mod palette;

use std::collections::HashMap;

use eframe::egui::Color32;

use crate::paper::{Focus, PaperGraph, PaperRecord, Relation, RelationKind};
use crate::util::truncate_label;

pub use curve::EdgeCurve;

pub const NODE_LABEL_CHARS: usize = 24;
pub const EDGE_LABEL_CHARS: usize = 18;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeRole {
    Core,
    Neighbor(RelationKind),
    Background,
    Category,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
    pub id: String,
    pub fill: Color32,
    pub role: NodeRole,
    pub label: String,
    pub badge: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkStyle {
    pub source: String,
    pub target: String,
    pub kind: RelationKind,
    pub color: Color32,
    pub dashed: bool,
    pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphStyle {
    pub nodes: Vec<NodeStyle>,
    pub links: Vec<LinkStyle>,
    /// Category swatches in first-seen order. Empty while a core is focused.
    pub categories: Vec<(String, Color32)>,
}

impl GraphStyle {
    pub fn node(&self, id: &str) -> Option<&NodeStyle> {
        self.nodes.iter().find(|style| style.id == id)
    }
}

pub fn year_badge(year: i32) -> String {
    format!("{:02}", year.rem_euclid(100))
}

pub fn link_style(relation: &Relation) -> LinkStyle {
    LinkStyle {
        source: relation.source.clone(),
        target: relation.target.clone(),
        kind: relation.kind,
        color: palette::relation_color(relation.kind),
        dashed: relation.kind == RelationKind::Inspiration,
        label: truncate_label(&relation.description, EDGE_LABEL_CHARS),
    }
}

/// Visual attributes for every paper and relation. Pure; call again on any
/// change to the graph or the focus.
pub fn style_graph(graph: &PaperGraph, focus: &Focus) -> GraphStyle {
    let links = graph.links.iter().map(link_style).collect();

    if focus.core.is_some() {
        let nodes = graph
            .nodes
            .iter()
            .map(|paper| {
                let role = if focus.is_core(&paper.id) {
                    NodeRole::Core
                } else if let Some(kind) = focus.neighbor_kind(&paper.id) {
                    NodeRole::Neighbor(kind)
                } else {
                    NodeRole::Background
                };
                let fill = match role {
                    NodeRole::Core => palette::CORE,
                    NodeRole::Neighbor(kind) => palette::relation_color(kind),
                    NodeRole::Background | NodeRole::Category => palette::MUTED,
                };
                node_style(paper, role, fill)
            })
            .collect();

        return GraphStyle {
            nodes,
            links,
            categories: Vec::new(),
        };
    }

    let mut slots = HashMap::new();
    let mut categories = Vec::new();
    let nodes = graph
        .nodes
        .iter()
        .map(|paper| {
            let category = paper.category_label();
            let fill = *slots.entry(category.to_owned()).or_insert_with(|| {
                let color = palette::categorical(categories.len());
                categories.push((category.to_owned(), color));
                color
            });
            node_style(paper, NodeRole::Category, fill)
        })
        .collect();

    GraphStyle {
        nodes,
        links,
        categories,
    }
}

fn node_style(paper: &PaperRecord, role: NodeRole, fill: Color32) -> NodeStyle {
    NodeStyle {
        id: paper.id.clone(),
        fill,
        role,
        label: truncate_label(&paper.title, NODE_LABEL_CHARS),
        badge: year_badge(paper.year),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paper::resolve_focus;

    fn graph() -> PaperGraph {
        let mut vision = PaperRecord::new("a", "Deep Residual Learning for Image Recognition", 2015);
        vision.category = Some("Vision".to_owned());
        let mut language = PaperRecord::new("b", "Attention Is All You Need", 2017);
        language.category = Some("NLP".to_owned());
        let mut vision_again = PaperRecord::new("c", "Vision Transformer", 2020);
        vision_again.category = Some("Vision".to_owned());
        let loose = PaperRecord::new("d", "Uncategorized", 2001);

        let mut inspiration = Relation::new("a", "c", RelationKind::Inspiration);
        inspiration.description = "residual connections carried over".to_owned();
        PaperGraph {
            nodes: vec![vision, language, vision_again, loose],
            links: vec![
                Relation::new("b", "c", RelationKind::Inheritance),
                inspiration,
            ],
        }
    }

    #[test]
    fn unfocused_nodes_share_color_by_category() {
        let style = style_graph(&graph(), &Focus::default());
        let fill = |id: &str| style.node(id).expect("styled").fill;

        assert_eq!(fill("a"), fill("c"));
        assert_ne!(fill("a"), fill("b"));
        assert_eq!(fill("d"), palette::categorical(2));
        let names = style
            .categories
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Vision", "NLP", "Other"]);
    }

    #[test]
    fn focused_core_and_neighbors_use_fixed_colors() {
        let graph = graph();
        let style = style_graph(&graph, &resolve_focus(&graph, "vision transformer"));
        let node = |id: &str| style.node(id).expect("styled");

        assert_eq!(node("c").role, NodeRole::Core);
        assert_eq!(node("c").fill, palette::CORE);
        assert_eq!(node("b").fill, palette::INHERITANCE);
        assert_eq!(node("a").fill, palette::INSPIRATION);
        assert_eq!(node("d").role, NodeRole::Background);
        assert_eq!(node("d").fill, palette::MUTED);
        assert!(style.categories.is_empty());
    }

    #[test]
    fn link_styling_ignores_focus() {
        let graph = graph();
        let unfocused = style_graph(&graph, &Focus::default());
        let focused = style_graph(&graph, &resolve_focus(&graph, "attention"));

        assert_eq!(unfocused.links, focused.links);
        assert!(!unfocused.links[0].dashed);
        assert!(unfocused.links[1].dashed);
        assert_eq!(unfocused.links[1].color, palette::INSPIRATION);
    }

    #[test]
    fn labels_are_truncated() {
        let style = style_graph(&graph(), &Focus::default());
        let label = &style.node("a").expect("styled").label;

        assert!(label.chars().count() <= NODE_LABEL_CHARS);
        assert_eq!(label, "Deep Residual Learning…");
        assert_eq!(style.node("b").expect("styled").label, "Attention Is All You Ne…");
        assert_eq!(style.links[1].label.chars().count(), EDGE_LABEL_CHARS);
    }

    #[test]
    fn every_node_carries_a_two_digit_badge() {
        let style = style_graph(&graph(), &Focus::default());
        let badges = style
            .nodes
            .iter()
            .map(|node| node.badge.as_str())
            .collect::<Vec<_>>();
        assert_eq!(badges, ["15", "17", "20", "01"]);
        assert_eq!(year_badge(-44), "56");
    }
}
