use eframe::egui::Color32;

use crate::paper::RelationKind;

pub const CORE: Color32 = Color32::from_rgb(245, 158, 11);
pub const MUTED: Color32 = Color32::from_rgb(71, 85, 105);

pub const INHERITANCE: Color32 = Color32::from_rgb(59, 130, 246);
pub const CONFLICT: Color32 = Color32::from_rgb(239, 68, 68);
pub const INSPIRATION: Color32 = Color32::from_rgb(16, 185, 129);
pub const CITATION: Color32 = Color32::from_rgb(148, 163, 184);

/// Tableau 10, used for category clusters when nothing is focused.
const CATEGORICAL: [Color32; 10] = [
    Color32::from_rgb(78, 121, 167),
    Color32::from_rgb(242, 142, 44),
    Color32::from_rgb(225, 87, 89),
    Color32::from_rgb(118, 183, 178),
    Color32::from_rgb(89, 161, 79),
    Color32::from_rgb(237, 201, 73),
    Color32::from_rgb(175, 122, 161),
    Color32::from_rgb(255, 157, 167),
    Color32::from_rgb(156, 117, 95),
    Color32::from_rgb(186, 176, 171),
];

pub fn relation_color(kind: RelationKind) -> Color32 {
    match kind {
        RelationKind::Inheritance => INHERITANCE,
        RelationKind::Conflict => CONFLICT,
        RelationKind::Inspiration => INSPIRATION,
        RelationKind::Citation => CITATION,
    }
}

pub fn categorical(slot: usize) -> Color32 {
    CATEGORICAL[slot % CATEGORICAL.len()]
}

pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_relation_kind_has_a_distinct_color() {
        let colors = RelationKind::ALL
            .map(relation_color)
            .into_iter()
            .collect::<std::collections::HashSet<_>>();
        assert_eq!(colors.len(), RelationKind::ALL.len());
        assert!(!colors.contains(&MUTED));
        assert!(!colors.contains(&CORE));
    }

    #[test]
    fn categorical_slots_wrap() {
        assert_eq!(categorical(0), categorical(10));
        assert_ne!(categorical(0), categorical(1));
    }

    #[test]
    fn hex_is_lowercase_rgb() {
        assert_eq!(to_hex(CORE), "#f59e0b");
    }
}
