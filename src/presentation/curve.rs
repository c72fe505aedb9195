use eframe::egui::{Pos2, Vec2, vec2};

/// Control offset per unit of chord length. Matches the midpoint of a
/// circular arc whose radius equals the chord: `2 * (1 - sqrt(3) / 2)`.
const BOW: f32 = 0.267_949;

/// Quadratic edge path that bows to the left of its direction of travel,
/// so `a -> b` and `b -> a` never draw on top of each other.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeCurve {
    pub start: Pos2,
    pub control: Pos2,
    pub end: Pos2,
}

impl EdgeCurve {
    pub fn between(start: Pos2, end: Pos2) -> Self {
        let chord = end - start;
        let length = chord.length();
        let control = if length > f32::EPSILON {
            let normal = vec2(-chord.y, chord.x) / length;
            start + chord * 0.5 + normal * (length * BOW)
        } else {
            start
        };

        Self {
            start,
            control,
            end,
        }
    }

    /// Curve between two laid-out papers. `None` until both ends have a
    /// position.
    pub fn for_relation(
        source: &str,
        target: &str,
        position: impl Fn(&str) -> Option<Pos2>,
    ) -> Option<Self> {
        Some(Self::between(position(source)?, position(target)?))
    }

    pub fn point_at(&self, t: f32) -> Pos2 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let start = self.start.to_vec2();
        let control = self.control.to_vec2();
        let end = self.end.to_vec2();
        (start * (u * u) + control * (2.0 * u * t) + end * (t * t)).to_pos2()
    }

    pub fn tangent_at(&self, t: f32) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        (self.control - self.start) * (2.0 * (1.0 - t)) + (self.end - self.control) * (2.0 * t)
    }

    pub fn sample(&self, segments: usize) -> Vec<Pos2> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|step| self.point_at(step as f32 / segments as f32))
            .collect()
    }

    /// Where a label sits: the apex of the bow.
    pub fn midpoint(&self) -> Pos2 {
        self.point_at(0.5)
    }

    /// Arrowhead triangle whose tip stops `inset` short of the target, so it
    /// lands on the node's rim rather than its center.
    pub fn arrowhead(&self, size: f32, inset: f32) -> Option<[Pos2; 3]> {
        let direction = self.tangent_at(1.0);
        let length = direction.length();
        if length <= f32::EPSILON {
            return None;
        }

        let direction = direction / length;
        let normal = vec2(-direction.y, direction.x);
        let tip = self.end - direction * inset;
        let base = tip - direction * size;
        Some([tip, base + normal * (size * 0.5), base - normal * (size * 0.5)])
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn bow_grows_with_distance() {
        let near = EdgeCurve::between(pos2(0.0, 0.0), pos2(100.0, 0.0));
        let far = EdgeCurve::between(pos2(0.0, 0.0), pos2(300.0, 0.0));

        let near_bow = (near.midpoint().y - 0.0).abs();
        let far_bow = (far.midpoint().y - 0.0).abs();
        assert!((far_bow / near_bow - 3.0).abs() < 1e-3);
    }

    #[test]
    fn apex_matches_an_arc_with_chord_radius() {
        let curve = EdgeCurve::between(pos2(0.0, 0.0), pos2(200.0, 0.0));
        let sagitta = 200.0 * (1.0 - 3.0_f32.sqrt() / 2.0);
        assert!((curve.midpoint().y - sagitta).abs() < 0.01);
        assert!((curve.midpoint().x - 100.0).abs() < 1e-3);
    }

    #[test]
    fn opposite_directions_bow_to_opposite_sides() {
        let forward = EdgeCurve::between(pos2(0.0, 0.0), pos2(100.0, 0.0));
        let backward = EdgeCurve::between(pos2(100.0, 0.0), pos2(0.0, 0.0));
        assert!(forward.control.y * backward.control.y < 0.0);
    }

    #[test]
    fn samples_start_and_end_on_the_endpoints() {
        let curve = EdgeCurve::between(pos2(10.0, 20.0), pos2(110.0, 60.0));
        let points = curve.sample(12);
        assert_eq!(points.len(), 13);
        assert_eq!(points.first(), Some(&curve.start));
        assert!((points[12] - curve.end).length() < 1e-3);
    }

    #[test]
    fn missing_endpoint_yields_no_curve() {
        let position = |id: &str| (id == "a").then_some(pos2(0.0, 0.0));
        assert!(EdgeCurve::for_relation("a", "b", position).is_none());
        assert!(EdgeCurve::for_relation("a", "a", position).is_some());
    }

    #[test]
    fn arrowhead_stops_at_the_rim() {
        let curve = EdgeCurve::between(pos2(0.0, 0.0), pos2(100.0, 0.0));
        let [tip, ..] = curve.arrowhead(8.0, 20.0).expect("non-degenerate");
        assert!(((tip - curve.end).length() - 20.0).abs() < 1e-3);

        let degenerate = EdgeCurve::between(pos2(5.0, 5.0), pos2(5.0, 5.0));
        assert!(degenerate.arrowhead(8.0, 20.0).is_none());
    }
}
