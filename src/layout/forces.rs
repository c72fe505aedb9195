use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;
use super::simulation::{SimLink, SimNode};

const MIN_DISTANCE_SQ: f32 = 1.0;

/// Deterministic unit offset for coincident points.
fn jiggle(first: usize, second: usize) -> Vec2 {
    let angle = ((first as f32) * 0.618_034 + (second as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

/// Springs each link toward `distance`. The lighter-connected endpoint moves
/// more, which keeps hubs from being dragged around by their leaves.
pub(super) fn apply_links(nodes: &mut [SimNode], links: &[SimLink], distance: f32, alpha: f32) {
    for link in links {
        let (source, target) = (link.source, link.target);
        if source == target || source >= nodes.len() || target >= nodes.len() {
            continue;
        }

        let mut delta = (nodes[target].position + nodes[target].velocity)
            - (nodes[source].position + nodes[source].velocity);
        if delta.length_sq() < 1e-6 {
            delta = jiggle(source, target) * 1e-3;
        }

        let length = delta.length();
        let stretch = (length - distance) / length * alpha * link.strength;
        let correction = delta * stretch;
        nodes[target].velocity -= correction * link.bias;
        nodes[source].velocity += correction * (1.0 - link.bias);
    }
}

pub(super) struct ChargeParams {
    /// Already scaled by alpha; negative values repel.
    pub(super) strength: f32,
    pub(super) theta: f32,
}

fn charge_between(point: Vec2, other: Vec2, strength: f32, pair: (usize, usize)) -> Vec2 {
    let mut offset = other - point;
    if offset.length_sq() < 1e-6 {
        offset = jiggle(pair.0, pair.1) * 1e-3;
    }
    offset * (strength / offset.length_sq().max(MIN_DISTANCE_SQ))
}

fn accumulate_charge(
    cell: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: &ChargeParams,
    delta: &mut Vec2,
) {
    if cell.mass <= 0.0 {
        return;
    }

    let point = positions[index];
    if cell.is_leaf() {
        for &other in &cell.indices {
            if other != index {
                *delta += charge_between(point, positions[other], params.strength, (index, other));
            }
        }
        return;
    }

    let offset = cell.center_of_mass - point;
    let distance_sq = offset.length_sq().max(MIN_DISTANCE_SQ);
    let far_enough = !cell.bounds.contains(point)
        && cell.bounds.side_length() / distance_sq.sqrt() < params.theta;
    if far_enough {
        *delta += offset * (params.strength * cell.mass / distance_sq);
        return;
    }

    for child in cell.children() {
        accumulate_charge(child, index, positions, params, delta);
    }
}

/// Many-body repulsion, approximated with the Barnes–Hut quadtree.
pub(super) fn apply_charge(nodes: &mut [SimNode], positions: &mut Vec<Vec2>, params: ChargeParams) {
    if nodes.len() < 2 || params.strength == 0.0 {
        return;
    }

    positions.clear();
    positions.extend(nodes.iter().map(|node| node.position));
    let Some(tree) = QuadNode::build(positions) else {
        return;
    };

    for (index, node) in nodes.iter_mut().enumerate() {
        let mut delta = Vec2::ZERO;
        accumulate_charge(&tree, index, positions, &params, &mut delta);
        node.velocity += delta;
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) padding: f32,
    pub(super) strength: f32,
    pub(super) max_distance_sq: f32,
}

fn push_apart(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    let min_distance = radii[from] + radii[to] + params.padding;
    let offset = positions[from] - positions[to];
    let distance_sq = offset.length_sq();
    if distance_sq >= min_distance * min_distance {
        return;
    }

    let distance = distance_sq.sqrt();
    let direction = if distance > 1e-4 {
        offset / distance
    } else {
        jiggle(from, to)
    };
    let push = (min_distance - distance) * 0.5 * params.strength;
    deltas[from] += direction * push;
    deltas[to] -= direction * push;
}

fn accumulate_collisions(
    cell_a: &QuadNode,
    cell_b: &QuadNode,
    same_cell: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    if cell_a.bounds.gap_sq(cell_b.bounds) > params.max_distance_sq {
        return;
    }

    if cell_a.is_leaf() && cell_b.is_leaf() {
        if same_cell {
            for (offset, &from) in cell_a.indices.iter().enumerate() {
                for &to in &cell_a.indices[offset + 1..] {
                    push_apart(from, to, positions, radii, params, deltas);
                }
            }
        } else {
            for &from in &cell_a.indices {
                for &to in &cell_b.indices {
                    push_apart(from, to, positions, radii, params, deltas);
                }
            }
        }
        return;
    }

    if same_cell {
        let children = cell_a.children().collect::<Vec<_>>();
        for (offset, first) in children.iter().enumerate() {
            accumulate_collisions(first, first, true, positions, radii, params, deltas);
            for second in &children[offset + 1..] {
                accumulate_collisions(first, second, false, positions, radii, params, deltas);
            }
        }
        return;
    }

    let split_a = !cell_a.is_leaf()
        && (cell_b.is_leaf() || cell_a.bounds.half_extent >= cell_b.bounds.half_extent);
    if split_a {
        for child in cell_a.children() {
            accumulate_collisions(child, cell_b, false, positions, radii, params, deltas);
        }
    } else {
        for child in cell_b.children() {
            accumulate_collisions(cell_a, child, false, positions, radii, params, deltas);
        }
    }
}

/// Separates overlapping nodes, judged on where they are about to move.
pub(super) fn apply_collisions(
    nodes: &mut [SimNode],
    positions: &mut Vec<Vec2>,
    radii: &mut Vec<f32>,
    deltas: &mut Vec<Vec2>,
    padding: f32,
    strength: f32,
) {
    if nodes.len() < 2 || strength <= 0.0 {
        return;
    }

    positions.clear();
    positions.extend(nodes.iter().map(|node| node.position + node.velocity));
    radii.clear();
    radii.extend(nodes.iter().map(|node| node.radius));
    deltas.clear();
    deltas.resize(nodes.len(), Vec2::ZERO);

    let Some(tree) = QuadNode::build(positions) else {
        return;
    };
    let max_radius = radii.iter().copied().fold(0.0_f32, f32::max);
    let reach = max_radius * 2.0 + padding;
    let params = CollisionParams {
        padding,
        strength,
        max_distance_sq: reach * reach,
    };
    accumulate_collisions(&tree, &tree, true, positions, radii, params, deltas);

    for (node, delta) in nodes.iter_mut().zip(deltas.iter()) {
        node.velocity += *delta;
    }
}

/// Pulls x toward each node's year coordinate and y toward the midline.
pub(super) fn apply_axis_pull(
    nodes: &mut [SimNode],
    center_y: f32,
    year_strength: f32,
    center_strength: f32,
    alpha: f32,
) {
    for node in nodes {
        node.velocity.x += (node.target_x - node.position.x) * year_strength * alpha;
        node.velocity.y += (center_y - node.position.y) * center_strength * alpha;
    }
}
